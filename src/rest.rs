use crate::client::Config;
use crate::error::{InsightlyError, Result};
use crate::request::{Method, OutboundRequest, RequestBuilder};
use crate::response::HttpResponse;
use crate::transport::{HttpTransport, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the Insightly REST API.
///
/// Immutable after construction. Each call builds and owns its own request,
/// so a client can be shared between threads.
#[derive(Clone)]
pub struct InsightlyClient {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl InsightlyClient {
    /// Create a client using the reqwest transport
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }

    /// Create a client with a default configuration for the given API key
    pub fn with_api_key(api_key: &str) -> Result<Self> {
        Self::new(Config::new(api_key))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport<T: Transport + 'static>(config: Config, transport: T) -> Self {
        InsightlyClient {
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build and execute a request, failing on non-success statuses
    pub fn send(&self, builder: RequestBuilder) -> Result<HttpResponse> {
        let request = builder.build(&self.config);
        self.execute(&request)
    }

    /// Execute a request and decode the JSON response
    pub fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        self.send(builder)?.json()
    }

    /// Execute an already built request.
    ///
    /// Request and response events are logged at `debug`, or at `info` when
    /// `Config::debug` is set. Non-success responses are always `info`.
    pub fn execute(&self, request: &OutboundRequest) -> Result<HttpResponse> {
        if self.config.debug {
            info!(method = %request.method, url = %request.url, query = ?request.query, "Sending request");
        } else {
            debug!(method = %request.method, url = %request.url, query = ?request.query, "Sending request");
        }

        let start = std::time::Instant::now();
        let response = self.transport.execute(request)?;
        let elapsed = start.elapsed();

        if !response.is_success() {
            info!(status = response.status, ?elapsed, url = %request.url, "Non-success response");
        } else if self.config.debug {
            info!(status = response.status, ?elapsed, "Response received");
        } else {
            debug!(status = response.status, ?elapsed, "Response received");
        }

        response.error_for_status()
    }

    /// GET a path and decode the JSON response
    pub fn get_json<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T> {
        self.send_json(RequestBuilder::with_method(Method::Get, path))
    }

    /// GET a path and return the raw body
    pub fn get_bytes(&self, path: impl Into<String>) -> Result<Vec<u8>> {
        let response = self.send(RequestBuilder::with_method(Method::Get, path))?;
        Ok(response.into_bytes())
    }

    /// Send a JSON body with the given method and decode the JSON response
    pub fn send_body<B, T>(&self, method: Method, path: impl Into<String>, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(RequestBuilder::with_method(method, path).json(body)?)
    }

    /// DELETE a path, ignoring the response body
    pub fn delete_path(&self, path: impl Into<String>) -> Result<()> {
        self.send(RequestBuilder::with_method(Method::Delete, path))?;
        Ok(())
    }

    /// The user owning the API key
    pub fn me<T: DeserializeOwned>(&self) -> Result<T> {
        self.get_json("/Users/Me")
    }

    /// Tags in use for a record type such as `Contacts`
    pub fn tags<T: DeserializeOwned>(&self, record_type: &str) -> Result<Vec<T>> {
        self.get_json(format!("/Tags/{}", urlencoding::encode(record_type)))
    }

    /// Members of a team
    pub fn members_of_team<T: DeserializeOwned>(&self, team_id: i64) -> Result<Vec<T>> {
        self.get_json(format!("/TeamMembers/teamid/{}", team_id))
    }

    /// Download the content of a file attachment
    pub fn file_attachment(&self, id: i64) -> Result<Vec<u8>> {
        self.get_bytes(format!("/FileAttachments/{}", id))
    }

    /// Download a file attachment and write it to `dest`
    pub fn save_file_attachment(&self, id: i64, dest: impl AsRef<Path>) -> Result<u64> {
        let dest = dest.as_ref();
        let data = self.file_attachment(id)?;
        std::fs::write(dest, &data).map_err(|e| InsightlyError::file(dest, e))?;
        Ok(data.len() as u64)
    }
}

impl std::fmt::Debug for InsightlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightlyClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
