//! Resource table and per-resource operations.
//!
//! Every resource is declared once in the `resources!` table below, which
//! generates the [`Resource`] enum, its metadata and one accessor per
//! resource on [`InsightlyClient`] (e.g. `client.contacts()`).

use crate::error::{InsightlyError, Result};
use crate::odata::{ListOptions, QueryOptions};
use crate::request::{Method, RequestBuilder};
use crate::rest::InsightlyClient;
use crate::upload::{encode_multipart, UploadFields};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Operation on a resource collection or record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Get,
    Save,
    Delete,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::List => "list",
            Op::Get => "get",
            Op::Save => "save",
            Op::Delete => "delete",
        }
    }
}

/// Collection nested under a record, e.g. `/Contacts/1/Emails`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubResource {
    Emails,
    Notes,
    Tasks,
    Events,
    Comments,
    StateHistory,
    FileAttachments,
    Image,
    Tags,
}

impl SubResource {
    pub fn path(&self) -> &'static str {
        match self {
            SubResource::Emails => "Emails",
            SubResource::Notes => "Notes",
            SubResource::Tasks => "Tasks",
            SubResource::Events => "Events",
            SubResource::Comments => "Comments",
            SubResource::StateHistory => "StateHistory",
            SubResource::FileAttachments => "FileAttachments",
            SubResource::Image => "Image",
            SubResource::Tags => "Tags",
        }
    }
}

impl fmt::Display for SubResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Whether a record counts as existing: its id field holds a positive integer
pub fn is_existing_record(record: &Value, id_field: &str) -> bool {
    record
        .get(id_field)
        .and_then(Value::as_i64)
        .map_or(false, |id| id > 0)
}

macro_rules! resources {
    ($(
        $variant:ident => $accessor:ident {
            path: $path:literal,
            id: $id:expr,
            ops: [$($op:ident),*],
            params: [$($param:literal),*],
            subs: [$($sub:ident),*] $(,)?
        }
    ),* $(,)?) => {
        /// API resource collections
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Resource {
            $($variant,)*
        }

        impl Resource {
            /// Every declared resource
            pub const ALL: &'static [Resource] = &[$(Resource::$variant,)*];

            /// Collection path segment
            pub fn path(&self) -> &'static str {
                match self {
                    $(Resource::$variant => $path,)*
                }
            }

            /// Name of the identifier field in records, if records are addressable
            pub fn id_field(&self) -> Option<&'static str> {
                match self {
                    $(Resource::$variant => $id,)*
                }
            }

            pub fn supports(&self, op: Op) -> bool {
                match self {
                    $(Resource::$variant => [$(Op::$op),*].contains(&op),)*
                }
            }

            /// Resource-specific list parameters accepted next to the OData ones
            pub fn list_params(&self) -> &'static [&'static str] {
                match self {
                    $(Resource::$variant => &[$($param),*],)*
                }
            }

            pub fn sub_resources(&self) -> &'static [SubResource] {
                match self {
                    $(Resource::$variant => &[$(SubResource::$sub),*],)*
                }
            }
        }

        impl InsightlyClient {
            $(
                #[doc = concat!("Operations on `/", $path, "`")]
                pub fn $accessor(&self) -> ResourceHandle<'_> {
                    self.resource(Resource::$variant)
                }
            )*
        }
    };
}

resources! {
    Comments => comments {
        path: "Comments", id: Some("COMMENT_ID"),
        ops: [Get, Save, Delete], params: [], subs: [FileAttachments],
    },
    Contacts => contacts {
        path: "Contacts", id: Some("CONTACT_ID"),
        ops: [List, Get, Save, Delete], params: ["email", "tag", "ids"],
        subs: [Emails, Notes, Tasks, Events, FileAttachments, Image, Tags],
    },
    Countries => countries {
        path: "Countries", id: None, ops: [List], params: [], subs: [],
    },
    Currencies => currencies {
        path: "Currencies", id: None, ops: [List], params: [], subs: [],
    },
    CustomFields => custom_fields {
        path: "CustomFields", id: Some("CUSTOM_FIELD_ID"),
        ops: [List, Get], params: [], subs: [],
    },
    Emails => emails {
        path: "Emails", id: Some("EMAIL_ID"),
        ops: [List, Get, Delete], params: ["tag", "ids"],
        subs: [Comments, FileAttachments, Tags],
    },
    Events => events {
        path: "Events", id: Some("EVENT_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [],
    },
    FileCategories => file_categories {
        path: "FileCategories", id: Some("CATEGORY_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [],
    },
    Notes => notes {
        path: "Notes", id: Some("NOTE_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [Comments, FileAttachments],
    },
    Opportunities => opportunities {
        path: "Opportunities", id: Some("OPPORTUNITY_ID"),
        ops: [List, Get, Save, Delete], params: ["tag", "ids"],
        subs: [Emails, Notes, Tasks, StateHistory, FileAttachments, Image, Tags],
    },
    OpportunityCategories => opportunity_categories {
        path: "OpportunityCategories", id: Some("CATEGORY_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [],
    },
    OpportunityStateReasons => opportunity_state_reasons {
        path: "OpportunityStateReasons", id: None, ops: [List], params: [], subs: [],
    },
    Organisations => organisations {
        path: "Organisations", id: Some("ORGANISATION_ID"),
        ops: [List, Get, Save, Delete], params: ["email_domain", "tag", "ids"],
        subs: [Emails, Notes, Tasks, FileAttachments, Image, Tags],
    },
    Pipelines => pipelines {
        path: "Pipelines", id: Some("PIPELINE_ID"), ops: [List, Get], params: [], subs: [],
    },
    PipelineStages => pipeline_stages {
        path: "PipelineStages", id: Some("STAGE_ID"), ops: [List, Get], params: [], subs: [],
    },
    ProjectCategories => project_categories {
        path: "ProjectCategories", id: Some("CATEGORY_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [],
    },
    Projects => projects {
        path: "Projects", id: Some("PROJECT_ID"),
        ops: [List, Get, Save, Delete], params: ["tag", "ids"],
        subs: [Emails, Notes, Tasks, FileAttachments, Image, Tags],
    },
    Relationships => relationships {
        path: "Relationships", id: None, ops: [List], params: [], subs: [],
    },
    TaskCategories => task_categories {
        path: "TaskCategories", id: Some("CATEGORY_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [],
    },
    Tasks => tasks {
        path: "Tasks", id: Some("TASK_ID"),
        ops: [List, Get, Save, Delete], params: ["ids"], subs: [Comments],
    },
    TeamMembers => team_members {
        path: "TeamMembers", id: Some("MEMBER_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [],
    },
    Teams => teams {
        path: "Teams", id: Some("TEAM_ID"),
        ops: [List, Get, Save, Delete], params: [], subs: [],
    },
    Users => users {
        path: "Users", id: Some("USER_ID"), ops: [List, Get], params: [], subs: [],
    },
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl InsightlyClient {
    /// Handle for operations on one resource
    pub fn resource(&self, resource: Resource) -> ResourceHandle<'_> {
        ResourceHandle {
            client: self,
            resource,
        }
    }
}

/// Operations on a single resource, checked against the resource table
/// before any request is sent.
#[derive(Debug, Clone, Copy)]
pub struct ResourceHandle<'a> {
    client: &'a InsightlyClient,
    resource: Resource,
}

impl<'a> ResourceHandle<'a> {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    fn require(&self, op: Op) -> Result<()> {
        if self.resource.supports(op) {
            Ok(())
        } else {
            Err(InsightlyError::Config(format!(
                "{} does not support {}",
                self.resource,
                op.as_str()
            )))
        }
    }

    fn require_sub(&self, sub: SubResource) -> Result<()> {
        if self.resource.sub_resources().contains(&sub) {
            Ok(())
        } else {
            Err(InsightlyError::Config(format!(
                "{} has no {} sub-resource",
                self.resource, sub
            )))
        }
    }

    fn collection_path(&self) -> String {
        format!("/{}", self.resource.path())
    }

    fn record_path(&self, id: i64) -> String {
        format!("/{}/{}", self.resource.path(), id)
    }

    fn sub_path(&self, id: i64, sub: SubResource) -> String {
        format!("/{}/{}/{}", self.resource.path(), id, sub.path())
    }

    /// List records, with OData options and resource-specific parameters
    pub fn list<T: DeserializeOwned>(&self, options: &ListOptions) -> Result<Vec<T>> {
        self.require(Op::List)?;

        let allowed = self.resource.list_params();
        if let Some((name, _)) = options
            .params
            .iter()
            .find(|(name, _)| !allowed.contains(&name.as_str()))
        {
            return Err(InsightlyError::Config(format!(
                "{} does not accept the '{}' parameter",
                self.resource, name
            )));
        }

        let builder =
            RequestBuilder::with_method(Method::Get, self.collection_path()).list_options(options);
        self.client.send_json(builder)
    }

    /// List with OData options only
    pub fn query<T: DeserializeOwned>(&self, options: &QueryOptions) -> Result<Vec<T>> {
        self.list(&ListOptions::from(options.clone()))
    }

    pub fn get<T: DeserializeOwned>(&self, id: i64) -> Result<T> {
        self.require(Op::Get)?;
        self.client.get_json(self.record_path(id))
    }

    /// Create or update a record.
    ///
    /// A record whose id field holds a positive integer is updated with PUT,
    /// anything else is created with POST.
    pub fn save<T>(&self, record: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        self.require(Op::Save)?;
        let id_field = self.resource.id_field().ok_or_else(|| {
            InsightlyError::Config(format!("{} has no identifier field", self.resource))
        })?;

        let value = serde_json::to_value(record).map_err(InsightlyError::Encode)?;
        let method = if is_existing_record(&value, id_field) {
            Method::Put
        } else {
            Method::Post
        };
        debug!(resource = %self.resource, %method, "Saving record");

        self.client
            .send_body(method, self.collection_path(), &value)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.require(Op::Delete)?;
        self.client.delete_path(self.record_path(id))
    }

    /// One existing record, for discovering the record shape
    pub fn sample<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let mut records: Vec<T> = self.list(&ListOptions::new().top(1))?;
        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records.swap_remove(0)))
        }
    }

    /// Records nested under `id`, e.g. the emails of a contact
    pub fn related<T: DeserializeOwned>(&self, id: i64, sub: SubResource) -> Result<Vec<T>> {
        self.require_sub(sub)?;
        if sub == SubResource::Image {
            return Err(InsightlyError::Config(
                "Image is binary, use image() instead".to_string(),
            ));
        }
        self.client.get_json(self.sub_path(id, sub))
    }

    /// Add a comment to a record and return the created comment
    pub fn add_comment<C, T>(&self, id: i64, comment: &C) -> Result<T>
    where
        C: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.require_sub(SubResource::Comments)?;
        self.client
            .send_body(Method::Post, self.sub_path(id, SubResource::Comments), comment)
    }

    /// Tag a record
    pub fn add_tag<T: DeserializeOwned>(&self, id: i64, tag: &str) -> Result<T> {
        self.require_sub(SubResource::Tags)?;
        let body = serde_json::json!({ "TAG_NAME": tag });
        self.client
            .send_body(Method::Post, self.sub_path(id, SubResource::Tags), &body)
    }

    pub fn delete_tag(&self, id: i64, tag: &str) -> Result<()> {
        self.require_sub(SubResource::Tags)?;
        let path = format!(
            "{}/{}",
            self.sub_path(id, SubResource::Tags),
            urlencoding::encode(tag)
        );
        self.client.delete_path(path)
    }

    /// Raw image bytes of a record
    pub fn image(&self, id: i64) -> Result<Vec<u8>> {
        self.require_sub(SubResource::Image)?;
        self.client.get_bytes(self.sub_path(id, SubResource::Image))
    }

    /// Replace the image of a record
    pub fn upload_image<T: DeserializeOwned>(
        &self,
        id: i64,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<T> {
        self.require_sub(SubResource::Image)?;
        let path = format!(
            "{}/{}",
            self.sub_path(id, SubResource::Image),
            urlencoding::encode(filename)
        );
        let builder = RequestBuilder::with_method(Method::Put, path)
            .bytes("application/octet-stream", data);
        self.client.send_json(builder)
    }

    pub fn delete_image(&self, id: i64) -> Result<()> {
        self.require_sub(SubResource::Image)?;
        self.client.delete_path(self.sub_path(id, SubResource::Image))
    }

    /// Upload a multipart form to the record's file attachments
    pub fn upload_attachment<T: DeserializeOwned>(
        &self,
        id: i64,
        fields: &UploadFields,
    ) -> Result<T> {
        self.require_sub(SubResource::FileAttachments)?;
        let payload = encode_multipart(fields)?;
        let builder = RequestBuilder::with_method(
            Method::Post,
            self.sub_path(id, SubResource::FileAttachments),
        )
        .multipart(payload);
        self.client.send_json(builder)
    }

    /// Attach a file from disk, optionally under a different filename
    pub fn attach_file<T: DeserializeOwned>(
        &self,
        id: i64,
        path: impl AsRef<Path>,
        filename: Option<&str>,
    ) -> Result<T> {
        let mut fields = UploadFields::new().file("file", path);
        if let Some(filename) = filename {
            fields = fields.filename("file", filename);
        }
        self.upload_attachment(id, &fields)
    }
}
