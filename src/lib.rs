//! # insightly - Rust client for the Insightly CRM REST API
//!
//! A blocking client for the Insightly v2.2 API: contacts, organisations,
//! opportunities, projects, tasks, teams and the rest of the CRM records.
//!
//! ## Features
//!
//! - One generated set of operations per resource (list, get, save, delete,
//!   sample, related records, comments, tags, images, file attachments)
//! - OData `$top`/`$skip`/`$orderby`/`$filter` translation, with a structured
//!   filter builder next to the raw-string form
//! - `multipart/form-data` encoding for file attachment uploads
//! - Typed errors separating transport, HTTP status and decode failures
//! - Pluggable transport for testing without a network
//!
//! ## Basic Usage
//!
//! ```no_run
//! use insightly::{Config, InsightlyClient, ListOptions};
//! use serde_json::Value;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InsightlyClient::new(Config::new("my-api-key"))?;
//!
//!     // Ten most recent contacts tagged "vip"
//!     let contacts: Vec<Value> = client.contacts().list(
//!         &ListOptions::new()
//!             .top(10)
//!             .orderby("DATE_CREATED_UTC desc")
//!             .tag("vip"),
//!     )?;
//!
//!     for contact in &contacts {
//!         println!("{} {}", contact["FIRST_NAME"], contact["LAST_NAME"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Creating and updating records
//!
//! `save` creates a record when its identifier field is missing or not
//! positive, and updates it otherwise:
//!
//! ```no_run
//! use insightly::{json, Config, InsightlyClient};
//!
//! let client = InsightlyClient::new(Config::new("my-api-key"))?;
//! let created: serde_json::Value = client
//!     .contacts()
//!     .save(&json!({"FIRST_NAME": "Brian", "LAST_NAME": "McConnell"}))?;
//!
//! let mut updated = created.clone();
//! updated["BACKGROUND"] = json!("Met at the conference");
//! client.contacts().save(&updated)?;
//! # Ok::<(), insightly::InsightlyError>(())
//! ```
//!
//! ## File attachments
//!
//! ```no_run
//! use insightly::{Config, InsightlyClient};
//!
//! let client = InsightlyClient::new(Config::new("my-api-key"))?;
//! let attachment: serde_json::Value =
//!     client.contacts().attach_file(42, "/tmp/photo.png", Some("headshot.png"))?;
//! # Ok::<(), insightly::InsightlyError>(())
//! ```

pub mod apikey;
pub mod client;
pub mod error;
pub mod odata;
pub mod request;
pub mod resources;
pub mod response;
pub mod rest;
pub mod transport;
pub mod upload;

// Re-export main types for convenience
pub use apikey::ApiKey;
pub use client::Config;
pub use error::{InsightlyError, Result};
pub use odata::{Filter, FilterClause, FilterOp, FilterValue, ListOptions, QueryOptions};
pub use request::{Method, OutboundRequest, RequestBody, RequestBuilder};
pub use resources::{Op, Resource, ResourceHandle, SubResource};
pub use response::HttpResponse;
pub use rest::InsightlyClient;
pub use transport::{HttpTransport, Transport};
pub use upload::{encode_multipart, MultipartPayload, UploadFields};

// Re-export serde_json for convenience
pub use serde_json::json;
