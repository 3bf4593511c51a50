//! Outbound request construction.

use crate::client::Config;
use crate::error::{InsightlyError, Result};
use crate::odata::{ListOptions, QueryOptions};
use crate::upload::MultipartPayload;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// HTTP method supported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for Method {
    type Err = InsightlyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(InsightlyError::Config(format!(
                "Unsupported HTTP method: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// JSON-encoded record
    Json(String),
    /// Encoded multipart form
    Multipart(MultipartPayload),
    /// Raw bytes with their content type
    Bytes { content_type: String, data: Vec<u8> },
}

impl RequestBody {
    pub fn content_type(&self) -> String {
        match self {
            RequestBody::Json(_) => "application/json".to_string(),
            RequestBody::Multipart(payload) => payload.content_type(),
            RequestBody::Bytes { content_type, .. } => content_type.clone(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RequestBody::Json(json) => json.as_bytes(),
            RequestBody::Multipart(payload) => payload.body(),
            RequestBody::Bytes { data, .. } => data,
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// A fully formed request, built once and executed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    /// Absolute URL without the query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl OutboundRequest {
    /// Final URL with the query string appended
    pub fn full_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Query values for `key`, in order
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Builder for a single API request
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl RequestBuilder {
    /// Create a new request builder; fails on methods the API does not use
    pub fn new(method: &str, path: impl Into<String>) -> Result<Self> {
        Ok(Self::with_method(method.parse()?, path))
    }

    pub fn with_method(method: Method, path: impl Into<String>) -> Self {
        RequestBuilder {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append OData parameters
    pub fn odata(mut self, options: &QueryOptions) -> Self {
        self.query.extend(options.to_params());
        self
    }

    /// Append OData parameters then resource parameters
    pub fn list_options(mut self, options: &ListOptions) -> Self {
        self.query.extend(options.to_params());
        self
    }

    /// Set JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let encoded = serde_json::to_string(body).map_err(InsightlyError::Encode)?;
        self.body = Some(RequestBody::Json(encoded));
        Ok(self)
    }

    /// Set multipart body.
    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = Some(RequestBody::Multipart(payload));
        self
    }

    /// Set raw bytes body.
    pub fn bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes {
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Resolve against the client configuration, adding auth and content headers
    pub fn build(self, config: &Config) -> OutboundRequest {
        let mut headers = vec![
            ("Authorization".to_string(), config.api_key.authorization()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if let Some(ref body) = self.body {
            headers.push(("Content-Type".to_string(), body.content_type()));
        }
        headers.extend(self.headers);

        OutboundRequest {
            method: self.method,
            url: config.endpoint(&self.path),
            headers,
            query: self.query,
            body: self.body,
        }
    }
}
