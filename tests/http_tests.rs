use insightly::{Config, InsightlyClient, InsightlyError, ListOptions, UploadFields};
use mockito::Matcher;
use serde_json::{json, Value};

fn client_for(server: &mockito::ServerGuard) -> InsightlyClient {
    let config = Config::new("abc123").with_host("http", server.host_with_port());
    InsightlyClient::new(config).expect("failed to build client")
}

#[test]
fn test_list_over_http() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v2.2/Contacts")
        .match_header("authorization", "Basic YWJjMTIzOg==")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("$top".into(), "200".into()),
            Matcher::UrlEncoded("$orderby".into(), "FIRST_NAME desc".into()),
            Matcher::UrlEncoded("$filter".into(), "FIRST_NAME eq 'Brian'".into()),
            Matcher::UrlEncoded("tag".into(), "vip".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"CONTACT_ID": 1, "FIRST_NAME": "Brian"}]"#)
        .create();

    let client = client_for(&server);
    let contacts: Vec<Value> = client
        .contacts()
        .list(
            &ListOptions::new()
                .top(200)
                .orderby("FIRST_NAME desc")
                .filter("FIRST_NAME='Brian'")
                .tag("vip"),
        )
        .expect("list failed");

    mock.assert();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["FIRST_NAME"], "Brian");
}

#[test]
fn test_create_over_http() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2.2/Teams")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"TEAM_NAME": "Sales"})))
        .with_status(201)
        .with_body(r#"{"TEAM_ID": 77, "TEAM_NAME": "Sales"}"#)
        .create();

    let client = client_for(&server);
    let team: Value = client
        .teams()
        .save(&json!({"TEAM_NAME": "Sales"}))
        .expect("save failed");

    mock.assert();
    assert_eq!(team["TEAM_ID"], 77);
}

#[test]
fn test_not_found_over_http() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/v2.2/Projects/5")
        .with_status(404)
        .with_body("Not Found")
        .create();

    let client = client_for(&server);
    let err = client.projects().get::<Value>(5).unwrap_err();
    assert!(err.is_not_found());
    match err {
        InsightlyError::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[test]
fn test_server_error_over_http() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("DELETE", "/v2.2/Notes/3")
        .with_status(500)
        .create();

    let client = client_for(&server);
    let err = client.notes().delete(3).unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[test]
fn test_malformed_json_over_http() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/v2.2/Users/Me")
        .with_status(200)
        .with_body("{\"USER_ID\": ")
        .create();

    let client = client_for(&server);
    let err = client.me::<Value>().unwrap_err();
    assert!(matches!(err, InsightlyError::Decode(_)));
}

#[test]
fn test_multipart_upload_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello attachment").unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2.2/Projects/9/FileAttachments")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=.+$".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="readme.txt""#.to_string()),
            Matcher::Regex("Content-Type: text/plain".to_string()),
            Matcher::Regex("hello attachment".to_string()),
            Matcher::Regex(r#"name="description"\r\n\r\nproject notes"#.to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"FILE_ID": 3}"#)
        .create();

    let client = client_for(&server);
    let fields = UploadFields::new()
        .file("file", &path)
        .filename("file", "readme.txt")
        .field("description", "project notes");
    let attachment: Value = client
        .projects()
        .upload_attachment(9, &fields)
        .expect("upload failed");

    mock.assert();
    assert_eq!(attachment["FILE_ID"], 3);
}

#[test]
fn test_download_over_http() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/v2.2/FileAttachments/12")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(vec![0u8, 1, 2, 3, 255])
        .create();

    let client = client_for(&server);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("download.bin");
    let written = client
        .save_file_attachment(12, &dest)
        .expect("download failed");

    assert_eq!(written, 5);
    assert_eq!(std::fs::read(&dest).unwrap(), vec![0u8, 1, 2, 3, 255]);
}

#[test]
fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 1
    let config = Config::new("abc123").with_host("http", "127.0.0.1:1");
    let client = InsightlyClient::new(config).unwrap();
    let err = client.me::<Value>().unwrap_err();
    assert!(matches!(err, InsightlyError::Transport(_)));
}
