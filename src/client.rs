use crate::apikey::ApiKey;
use crate::error::{InsightlyError, Result};
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;

/// Default API host
pub const DEFAULT_HOST: &str = "api.insight.ly";

/// Default API version path segment
pub const DEFAULT_VERSION: &str = "v2.2";

/// Create the default HTTP client for REST API requests
/// with optimized settings for connection pooling and timeouts
pub fn create_rest_client() -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(300)) // 5 minutes
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Create the HTTP client for upload requests with longer timeout
pub fn create_upload_client() -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(3600)) // 1 hour
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Configuration for the Insightly client.
///
/// Immutable once handed to [`crate::InsightlyClient`]; every request reads
/// the credential from here.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL scheme (http or https)
    pub scheme: String,
    /// API host, optionally with a port
    pub host: String,
    /// API version path segment
    pub version: String,
    /// API key for Basic authentication
    pub api_key: ApiKey,
    /// Raise request logging from `debug` to `info`
    pub debug: bool,
}

impl Config {
    /// Create a new configuration for the public API with the given key
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Config {
            scheme: "https".to_string(),
            host: DEFAULT_HOST.to_string(),
            version: DEFAULT_VERSION.to_string(),
            api_key: api_key.into(),
            debug: false,
        }
    }

    /// Build a configuration from `INSIGHTLY_API_KEY`, `INSIGHTLY_HOST`
    /// and `INSIGHTLY_SCHEME`
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("INSIGHTLY_API_KEY")
            .map_err(|_| InsightlyError::Config("INSIGHTLY_API_KEY is not set".to_string()))?;
        let api_key = ApiKey::new(key);
        if api_key.is_empty() {
            return Err(InsightlyError::Config(
                "INSIGHTLY_API_KEY is empty".to_string(),
            ));
        }

        let mut config = Config::new(api_key);
        if let Ok(host) = std::env::var("INSIGHTLY_HOST") {
            config.host = host;
        }
        if let Ok(scheme) = std::env::var("INSIGHTLY_SCHEME") {
            config.scheme = scheme;
        }
        Ok(config)
    }

    /// Set scheme and host
    pub fn with_host(mut self, scheme: impl Into<String>, host: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self.host = host.into();
        self
    }

    /// Set the API version segment
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Log every request and response at `info` instead of `debug`
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Get the absolute URL for an API path such as `/Contacts/12`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url(),
            self.version,
            path.trim_start_matches('/')
        )
    }
}
