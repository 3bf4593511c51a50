use base64::{engine::general_purpose::STANDARD, Engine};

/// ApiKey holds the opaque Insightly API key used for HTTP Basic authentication.
///
/// The key is sent as the user name with an empty password, so the header
/// value is `Basic base64("<key>:")`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    key: String,
}

impl ApiKey {
    /// Create a new ApiKey from the raw key string
    pub fn new(key: impl Into<String>) -> Self {
        ApiKey { key: key.into() }
    }

    /// Check whether the key is empty
    pub fn is_empty(&self) -> bool {
        self.key.trim().is_empty()
    }

    /// Build the value of the `Authorization` header
    pub fn authorization(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:", self.key));
        format!("Basic {}", encoded)
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        ApiKey::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        ApiKey::new(key)
    }
}

// Implement Debug manually to avoid exposing the key
impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey").field("key", &"<redacted>").finish()
    }
}
