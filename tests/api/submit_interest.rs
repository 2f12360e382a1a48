use std::collections::HashSet;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wattly_signups::storage::SignupStore;
use wiremock::{
    matchers::{any, body_partial_json, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{MemoryTestApp, TestApp, TABLE};

fn valid_submission() -> Value {
    json!({
        "firstName": "Ana",
        "lastName": "Li",
        "email": "ana@x.com",
        "consent": true,
        "location": "Austin",
    })
}

async fn mount_table_created(app: &TestApp, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/Tables"))
        .respond_with(ResponseTemplate::new(204))
        .expect(expected)
        .mount(&app.storage_server)
        .await;
}

#[tokio::test]
async fn submit_interest_valid_submission_is_stored() -> Result<()> {
    let app = TestApp::spawn().await?;

    mount_table_created(&app, 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/{TABLE}")))
        .and(body_partial_json(json!({
            "PartitionKey": "austin",
            "FirstName": "Ana",
            "LastName": "Li",
            "Email": "ana@x.com",
            "Location": "Austin",
            "Consent": true,
            "Phone": "",
            "Role": "",
            "Message": "",
            "Source": "",
            "UserAgent": "",
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.storage_server)
        .await;

    let res = app.post_submit_interest(&valid_submission()).await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Wrong response StatusCode: {}",
        res.status()
    );
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await?;
    assert_eq!(json!({ "ok": true }), body);

    Ok(())
}

#[tokio::test]
async fn submit_interest_returns_400_with_every_violation() -> Result<()> {
    let app = TestApp::spawn().await?;

    // Invalid submissions never reach the storage.
    Mock::given(any())
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&app.storage_server)
        .await;

    let cases = [
        (
            json!({}),
            vec![
                "email is required",
                "firstName is required",
                "lastName is required",
                "consent must be true",
            ],
            "Empty json",
        ),
        (
            json!({ "email": "a@x.com", "consent": true }),
            vec!["firstName is required", "lastName is required"],
            "Missing names",
        ),
        (
            json!({
                "firstName": "Ana",
                "lastName": "Li",
                "email": "ana@x.com",
                "consent": false,
            }),
            vec!["consent must be true"],
            "Consent false",
        ),
        (
            json!({
                "firstName": " ",
                "lastName": "Li",
                "email": "ana@x.com",
                "consent": "yes",
            }),
            vec!["firstName is required", "consent must be true"],
            "Blank name and non-boolean consent",
        ),
    ];

    for (body, expected_errors, description) in cases {
        let res = app.post_submit_interest(&body).await?;
        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "The API did not return a 400 BAD REQUEST, the payload was: {description}"
        );

        let body: Value = res.json().await?;
        assert_eq!(
            json!({ "ok": false, "errors": expected_errors }),
            body,
            "Wrong error list for: {description}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn submit_interest_non_object_body_is_a_validation_failure() -> Result<()> {
    let app = TestApp::spawn().await?;

    for raw in ["not json at all", "[1, 2, 3]", "\"Ana\"", ""] {
        let res = app
            .http_client
            .post(format!("http://{}/submit-interest", app.addr))
            .header("Content-Type", "application/json")
            .body(raw)
            .send()
            .await?;

        assert_eq!(StatusCode::BAD_REQUEST, res.status(), "body: {raw:?}");
        let body: Value = res.json().await?;
        assert_eq!(
            json!({ "ok": false, "errors": ["request body must be a JSON object"] }),
            body
        );
    }

    Ok(())
}

#[tokio::test]
async fn submit_interest_storage_unreachable_returns_500() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(503).insert_header("x-ms-error-code", "ServerBusy"))
        .mount(&app.storage_server)
        .await;

    let res = app.post_submit_interest(&valid_submission()).await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    let body: Value = res.json().await?;
    assert_eq!(json!({ "ok": false, "error": "Storage error" }), body);
    // The table was never created, so no insert was attempted.
    assert!(app.inserted_entities().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn submit_interest_rejected_insert_returns_500_without_details() -> Result<()> {
    let app = TestApp::spawn().await?;

    mount_table_created(&app, 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/{TABLE}")))
        .respond_with(
            ResponseTemplate::new(403).insert_header("x-ms-error-code", "AuthenticationFailed"),
        )
        .expect(1)
        .mount(&app.storage_server)
        .await;

    let res = app.post_submit_interest(&valid_submission()).await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    let body = res.text().await?;
    assert!(!body.contains("AuthenticationFailed"));
    assert_eq!(
        json!({ "ok": false, "error": "Storage error" }),
        serde_json::from_str::<Value>(&body)?
    );

    Ok(())
}

#[tokio::test]
async fn submit_interest_existing_table_is_not_an_error() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("POST"))
        .and(path("/Tables"))
        .respond_with(ResponseTemplate::new(409).insert_header("x-ms-error-code", "TableAlreadyExists"))
        .expect(1)
        .mount(&app.storage_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/{TABLE}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&app.storage_server)
        .await;

    for _ in 0..2 {
        let res = app.post_submit_interest(&valid_submission()).await?;
        assert_eq!(StatusCode::OK, res.status());
    }

    Ok(())
}

#[tokio::test]
async fn submit_interest_identical_submissions_get_distinct_row_keys() -> Result<()> {
    let app = TestApp::spawn().await?;

    mount_table_created(&app, 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/{TABLE}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&app.storage_server)
        .await;

    let (first_submission, second_submission) = (valid_submission(), valid_submission());
    let (first, second) = tokio::join!(
        app.post_submit_interest(&first_submission),
        app.post_submit_interest(&second_submission)
    );
    assert_eq!(StatusCode::OK, first?.status());
    assert_eq!(StatusCode::OK, second?.status());

    let row_keys = app
        .inserted_entities()
        .await
        .iter()
        .filter_map(|entity| entity["RowKey"].as_str().map(str::to_string))
        .collect::<HashSet<_>>();
    assert_eq!(2, row_keys.len());

    Ok(())
}

#[tokio::test]
async fn submit_interest_absent_fields_read_back_as_empty() -> Result<()> {
    let app = MemoryTestApp::spawn().await?;

    let res = app
        .post_submit_interest(&json!({
            "firstName": "Ursula",
            "lastName": "Le Guin",
            "email": "le_guin@gmail.com",
            "consent": true,
        }))
        .await?;
    assert_eq!(StatusCode::OK, res.status());

    let records = app.store.records();
    assert_eq!(1, records.len());
    let stored = app
        .store
        .get_entity(&records[0].partition_key, &records[0].row_key)
        .await?
        .expect("the record was just stored");

    assert_eq!("signup", stored.partition_key);
    assert_eq!("", stored.location);
    assert_eq!("", stored.phone);
    assert_eq!("", stored.role);
    assert_eq!("", stored.message);
    assert_eq!("", stored.source);
    assert_eq!("", stored.user_agent);
    assert!(stored.consent);

    Ok(())
}

#[tokio::test]
async fn submit_interest_stamps_server_time() -> Result<()> {
    let app = MemoryTestApp::spawn().await?;

    let before = chrono::Utc::now();
    let mut body = valid_submission();
    body["submittedAtUtc"] = json!("1999-01-01T00:00:00Z");
    let res = app.post_submit_interest(&body).await?;
    let after = chrono::Utc::now();
    assert_eq!(StatusCode::OK, res.status());

    let stored = app.store.records().remove(0);
    assert!(before <= stored.submitted_at_utc && stored.submitted_at_utc <= after);
    assert_eq!("austin", stored.partition_key);

    Ok(())
}

#[tokio::test]
async fn submit_interest_invalid_submission_is_not_stored() -> Result<()> {
    let app = MemoryTestApp::spawn().await?;

    let res = app
        .post_submit_interest(&json!({ "email": "a@x.com", "consent": true }))
        .await?;

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert_eq!(0, app.store.entity_count());

    Ok(())
}

#[tokio::test]
async fn submit_interest_numeric_fields_are_stored_as_text() -> Result<()> {
    let app = MemoryTestApp::spawn().await?;

    let mut body = valid_submission();
    body["phone"] = json!(5550100);
    body["source"] = json!(true);
    let res = app.post_submit_interest(&body).await?;
    assert_eq!(StatusCode::OK, res.status());

    let stored = app.store.records().remove(0);
    assert_eq!("5550100", stored.phone);
    assert_eq!("true", stored.source);

    Ok(())
}

#[tokio::test]
async fn submit_interest_long_location_is_accepted() -> Result<()> {
    let app = MemoryTestApp::spawn().await?;

    let location = "Austin ".repeat(300);
    let mut body = valid_submission();
    body["location"] = json!(location);
    let res = app.post_submit_interest(&body).await?;
    assert_eq!(StatusCode::OK, res.status());

    let stored = app.store.records().remove(0);
    assert_eq!(location, stored.location);
    assert!(stored.partition_key.len() <= 1024);
    assert!(stored.partition_key.starts_with("austin austin"));

    Ok(())
}
