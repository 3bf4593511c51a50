use crate::error::{InsightlyError, Result};
use std::path::Path;
use uuid::Uuid;

/// Prefix marking a field value as a file reference
pub const FILE_MARKER: char = '@';

/// Suffix of side-channel fields carrying a filename override
pub const FILENAME_SUFFIX: &str = "#filename";

/// Ordered upload fields for a multipart request.
///
/// A value starting with `@` refers to a file on disk. A companion field
/// named `<field>#filename` overrides the filename sent for that file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadFields {
    fields: Vec<(String, String)>,
}

impl UploadFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with a raw value, which may carry the `@` marker
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add a file reference
    pub fn file(self, name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let value = format!("{}{}", FILE_MARKER, path.as_ref().display());
        self.field(name, value)
    }

    /// Override the filename sent for the file field `name`
    pub fn filename(self, name: &str, filename: impl Into<String>) -> Self {
        self.field(format!("{}{}", name, FILENAME_SUFFIX), filename)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UploadFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        UploadFields {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An encoded `multipart/form-data` body and its boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPayload {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartPayload {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Value of the request `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Generate a fresh multipart boundary
pub fn generate_boundary() -> String {
    format!("----------------------------{}", Uuid::new_v4().simple())
}

/// Encode upload fields into a multipart payload with a new boundary.
///
/// A file reference to a path that is not an existing file is sent as a
/// literal value. Only a read failure on an existing file is an error.
pub fn encode_multipart(fields: &UploadFields) -> Result<MultipartPayload> {
    encode_with_boundary(fields, generate_boundary())
}

fn encode_with_boundary(fields: &UploadFields, boundary: String) -> Result<MultipartPayload> {
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields.iter() {
        if name.ends_with(FILENAME_SUFFIX) {
            continue;
        }

        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());

        match file_reference(value) {
            Some(path) => {
                let filename = match fields.get(&format!("{}{}", name, FILENAME_SUFFIX)) {
                    Some(filename) => filename.to_string(),
                    None => base_name(path),
                };
                let contents =
                    std::fs::read(path).map_err(|e| InsightlyError::file(path, e))?;

                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        quote_param(name),
                        quote_param(&filename)
                    )
                    .as_bytes(),
                );
                if let Some(mime) = mime_guess::from_path(path).first() {
                    body.extend_from_slice(format!("Content-Type: {}\r\n", mime).as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(&contents);
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n",
                        quote_param(name)
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(value.as_bytes());
            }
        }

        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Ok(MultipartPayload { boundary, body })
}

/// Path named by a `@`-marked value, if it exists as a regular file
fn file_reference(value: &str) -> Option<&Path> {
    let path = Path::new(value.strip_prefix(FILE_MARKER)?);
    path.is_file().then_some(path)
}

/// Percent-encode `"`, CR and LF inside a quoted header parameter
fn quote_param(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn encode(fields: &UploadFields) -> String {
        let payload = encode_with_boundary(fields, "XyZ".to_string()).unwrap();
        String::from_utf8(payload.into_body()).unwrap()
    }

    #[test]
    fn test_literal_fields() {
        let fields = UploadFields::new().field("a", "1").field("b", "two");
        assert_eq!(
            encode(&fields),
            "--XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
             --XyZ\r\nContent-Disposition: form-data; name=\"b\"\r\n\r\ntwo\r\n\
             --XyZ--\r\n"
        );
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(encode(&UploadFields::new()), "--XyZ--\r\n");
    }

    #[test]
    fn test_missing_file_is_literal() {
        let fields = UploadFields::new().field("file", "@/nonexistent/path/x.png");
        assert_eq!(
            encode(&fields),
            "--XyZ\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\n\
             @/nonexistent/path/x.png\r\n--XyZ--\r\n"
        );
    }

    #[test]
    fn test_file_part_with_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"\x89PNG")
            .unwrap();

        let fields = UploadFields::new().file("file", &path);
        let payload = encode_with_boundary(&fields, "XyZ".to_string()).unwrap();

        let mut expected = b"--XyZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"x.png\"\r\nContent-Type: image/png\r\n\r\n".to_vec();
        expected.extend_from_slice(b"\x89PNG");
        expected.extend_from_slice(b"\r\n--XyZ--\r\n");
        assert_eq!(payload.body(), expected.as_slice());
    }

    #[test]
    fn test_filename_field_is_not_a_part() {
        let fields = UploadFields::new()
            .field("title", "hello")
            .filename("file", "photo.png");
        let encoded = encode(&fields);
        assert!(!encoded.contains("#filename"));
        assert!(!encoded.contains("photo.png"));
    }

    #[test]
    fn test_unknown_extension_omits_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.zzqx");
        std::fs::write(&path, "payload").unwrap();

        let encoded = encode(&UploadFields::new().file("file", &path));
        assert!(encoded.contains("filename=\"data.zzqx\"\r\n\r\npayload\r\n"));
        assert!(!encoded.contains("Content-Type"));
    }

    #[test]
    fn test_directory_reference_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        let value = format!("@{}", dir.path().display());
        let encoded = encode(&UploadFields::new().field("file", value.as_str()));
        assert!(encoded.contains(&format!("name=\"file\"\r\n\r\n{}\r\n", value)));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_unreadable_file_is_file_error() {
        // a regular file whose reads fail with EIO
        let fields = UploadFields::new().field("file", "@/proc/self/mem");
        match encode_multipart(&fields) {
            Err(InsightlyError::File { path, .. }) => {
                assert_eq!(path, Path::new("/proc/self/mem"));
            }
            other => panic!("expected File error, got {:?}", other),
        }
    }

    #[test]
    fn test_disposition_values_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.txt");
        std::fs::write(&path, "data").unwrap();

        let fields = UploadFields::new()
            .field("a\"b", "1")
            .file("file", &path)
            .filename("file", "evil\"\r\nX-Injected: 1.txt");
        let encoded = encode(&fields);
        assert!(encoded.contains("name=\"a%22b\"\r\n"));
        assert!(encoded.contains("filename=\"evil%22%0D%0AX-Injected: 1.txt\"\r\n"));
        assert!(!encoded.contains("\r\nX-Injected"));
    }

    #[test]
    fn test_content_type_matches_boundary() {
        let payload = encode_multipart(&UploadFields::new().field("a", "b")).unwrap();
        assert_eq!(
            payload.content_type(),
            format!("multipart/form-data; boundary={}", payload.boundary())
        );
        let body = String::from_utf8(payload.body().to_vec()).unwrap();
        assert!(body.starts_with(&format!("--{}\r\n", payload.boundary())));
        assert!(body.ends_with(&format!("--{}--\r\n", payload.boundary())));
    }

    #[test]
    fn test_boundaries_are_unique() {
        assert_ne!(generate_boundary(), generate_boundary());
    }
}
