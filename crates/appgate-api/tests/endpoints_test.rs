#![allow(clippy::unwrap_used)]
// Endpoint tests for authenticated sessions using wiremock.

use std::collections::BTreeSet;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{bearer_token, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appgate_api::models::{Condition, SeedRequest, SshConfig};
use appgate_api::{Credentials, Error, Session};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-abc",
            "expires": "2099-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/admin", server.uri())).unwrap();
    let creds = Credentials::new(url, "admin", SecretString::from("admin".to_owned()));
    let session = Session::establish(&creds, Some(14)).await.unwrap().session;
    (server, session)
}

fn condition_body(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "condition-test",
        "notes": "Managed by terraform",
        "tags": ["api-created", "terraform"],
        "expression": "return true;",
        "repeatSchedules": ["13:32", "1h"],
        "remedyMethods": []
    })
}

// ── Conditions ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_condition_returns_assigned_id() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/conditions"))
        .and(bearer_token("tok-abc"))
        .and(body_partial_json(json!({
            "name": "condition-test",
            "expression": "return true;"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(condition_body("c-1")))
        .expect(1)
        .mount(&server)
        .await;

    let condition = Condition {
        id: None,
        name: "condition-test".into(),
        notes: None,
        tags: BTreeSet::from(["terraform".to_owned(), "api-created".to_owned()]),
        expression: "return true;".into(),
        repeat_schedules: BTreeSet::from(["1h".to_owned(), "13:32".to_owned()]),
        remedy_methods: Vec::new(),
        remedy_logic: None,
    };
    let created = session.create_condition(&condition).await.unwrap();

    assert_eq!(created.id.as_deref(), Some("c-1"));
    assert_eq!(created.tags, condition.tags);
    assert_eq!(created.repeat_schedules.len(), 2);
}

#[tokio::test]
async fn list_conditions_passes_query() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/conditions"))
        .and(query_param("query", "condition-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [condition_body("c-1")]
        })))
        .mount(&server)
        .await;

    let found = session.list_conditions(Some("condition-test")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "condition-test");
}

#[tokio::test]
async fn missing_condition_is_not_found() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/conditions/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "id": "not-found",
            "message": "Condition not found."
        })))
        .mount(&server)
        .await;

    let err = session.get_condition("gone").await.unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn delete_twice_acks_then_not_found() {
    let (server, session) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/admin/conditions/c-1"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/conditions/c-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    session.delete_condition("c-1").await.unwrap();
    let second = session.delete_condition("c-1").await.unwrap_err();
    assert!(second.is_not_found());
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn unprocessable_entity_is_validation_error() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/conditions"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "id": "unprocessable entity",
            "message": "Request validation failed.",
            "errors": [{ "field": "expression", "message": "must not be empty" }]
        })))
        .mount(&server)
        .await;

    let err = session
        .create_object("conditions", &json!({ "name": "broken" }))
        .await
        .unwrap_err();

    match err {
        Error::Validation { message, errors } => {
            assert_eq!(message, "Request validation failed.");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "expression");
        }
        other => panic!("expected Validation, got: {other:?}"),
    }
}

#[tokio::test]
async fn conflict_is_api_error_with_id() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/sites"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "id": "conflict",
            "message": "Site with the same name already exists."
        })))
        .mount(&server)
        .await;

    let err = session
        .create_object("sites", &json!({ "name": "dup" }))
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message, id } => {
            assert_eq!(status, 409);
            assert!(message.contains("already exists"));
            assert_eq!(id.as_deref(), Some("conflict"));
        }
        other => panic!("expected Api, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_deserialization_error() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/global-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = session.get_object("global-settings").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "{err:?}");
}

// ── Generic objects ─────────────────────────────────────────────────

#[tokio::test]
async fn replace_object_puts_full_body() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/admin/global-settings"))
        .and(body_partial_json(json!({ "claimsTokenExpiration": 1440 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "claimsTokenExpiration": 1440,
            "entitlementTokenExpiration": 180
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stored = session
        .replace_object("global-settings", &json!({ "claimsTokenExpiration": 1440 }))
        .await
        .unwrap();
    assert_eq!(stored["entitlementTokenExpiration"], 180);
}

// ── Exports ─────────────────────────────────────────────────────────

#[tokio::test]
async fn certificate_authority_is_fetched() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/certificate-authority"))
        .and(bearer_token("tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": 3,
            "serial": "1f",
            "subject": "CN=Appgate CA",
            "fingerprint": "ab:cd"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ca = session.certificate_authority().await.unwrap();
    assert_eq!(ca["subject"], "CN=Appgate CA");
}

#[tokio::test]
async fn seed_export_posts_options_for_the_appliance() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/appliances/a-1/export"))
        .and(body_partial_json(json!({
            "provideCloudSSHKey": false,
            "sshConfig": { "password": "s3cret" },
            "validityDays": 7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uuid": "a-1",
            "seed": { "hostname": "gw.example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SeedRequest {
        ssh_config: Some(SshConfig {
            password: Some("s3cret"),
            ssh_key: None,
        }),
        validity_days: Some(7),
        ..SeedRequest::default()
    };
    let seed = session.export_seed("a-1", &request).await.unwrap();
    assert_eq!(seed["seed"]["hostname"], "gw.example.com");
}
