//! HTTP transport seam.
//!
//! The client builds [`OutboundRequest`] values and hands them to a
//! [`Transport`]. [`HttpTransport`] performs real I/O with reqwest; tests can
//! plug in an in-process fake.

use crate::client::{create_rest_client, create_upload_client};
use crate::error::Result;
use crate::request::OutboundRequest;
use crate::response::HttpResponse;
use reqwest::blocking::Client;

/// Executes one outbound request and returns the raw response.
///
/// Implementations must not interpret the status code.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &OutboundRequest) -> Result<HttpResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    upload_client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Ok(HttpTransport {
            client: create_rest_client()?,
            upload_client: create_upload_client()?,
        })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &OutboundRequest) -> Result<HttpResponse> {
        let url = request.full_url()?;

        // Multipart uploads get the long-timeout client
        let client = match request.body {
            Some(ref body) if body.is_multipart() => &self.upload_client,
            _ => &self.client,
        };

        let mut builder = client.request(request.method.to_reqwest(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.as_bytes().to_vec());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
