use insightly::{json, Config, InsightlyClient, InsightlyError, ListOptions, SubResource};
use serde_json::Value;

fn live_client() -> InsightlyClient {
    let config = Config::from_env().expect("INSIGHTLY_API_KEY must be set for live tests");
    InsightlyClient::new(config).expect("failed to create client")
}

#[test]
#[ignore] // Run with: INSIGHTLY_API_KEY=... cargo test --test integration_tests -- --ignored
fn test_me() {
    let client = live_client();

    let me: Value = client.me().expect("failed to call Users/Me");
    assert!(me["USER_ID"].as_i64().unwrap_or(0) > 0, "expected a user id, got {}", me);

    println!("Users/Me test passed: {}", me["EMAIL_ADDRESS"]);
}

#[test]
#[ignore]
fn test_list_contacts() {
    let client = live_client();

    let contacts: Vec<Value> = client
        .contacts()
        .list(&ListOptions::new().top(5).orderby("DATE_UPDATED_UTC desc"))
        .expect("failed to list contacts");

    assert!(contacts.len() <= 5, "expected at most 5 contacts, got {}", contacts.len());

    println!("List contacts test passed: {} contacts", contacts.len());
}

#[test]
#[ignore]
fn test_not_found() {
    let client = live_client();

    let result = client.contacts().get::<Value>(1);
    match result {
        Err(e @ InsightlyError::HttpStatus { .. }) => {
            assert!(e.is_not_found(), "expected 404, got {:?}", e.status_code());
            println!("Not found test passed");
        }
        other => panic!("expected HttpStatus error, got {:?}", other),
    }
}

#[test]
#[ignore]
fn test_contact_lifecycle() {
    let client = live_client();

    let created: Value = client
        .contacts()
        .save(&json!({"FIRST_NAME": "Smoke", "LAST_NAME": "Test"}))
        .expect("failed to create contact");
    let id = created["CONTACT_ID"]
        .as_i64()
        .expect("expected CONTACT_ID in created contact");

    let mut record = created.clone();
    record["BACKGROUND"] = json!("updated by integration test");
    let updated: Value = client.contacts().save(&record).expect("failed to update contact");
    assert_eq!(updated["CONTACT_ID"], id);
    assert_eq!(updated["BACKGROUND"], "updated by integration test");

    let notes: Vec<Value> = client
        .contacts()
        .related(id, SubResource::Notes)
        .expect("failed to list notes");
    assert!(notes.is_empty());

    client.contacts().delete(id).expect("failed to delete contact");

    println!("Contact lifecycle test passed for contact {}", id);
}

#[test]
#[ignore]
fn test_sample() {
    let client = live_client();

    let sample: Option<Value> = client.users().sample().expect("failed to fetch sample");
    let user = sample.expect("account should have at least one user");
    assert!(user.get("USER_ID").is_some());

    println!("Sample test passed: {}", user["USER_ID"]);
}
