//! Integration tests for the Salesforce REST and OAuth adapters
//!
//! **Coverage:**
//! - Query pagination followed to completion through `fetch_all`
//! - Record updates sent as PATCH with a JSON body
//! - Salesforce error arrays surfaced in domain errors
//! - Authorization-code exchange and revoke
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for the org instance and login host

use std::time::Duration;

use armlink_core::{fetch_all, CrmAuthenticator, CrmClient, CrmConnector};
use armlink_domain::{ArmLinkError, CrmSession, OAuthSettings};
use armlink_infra::{generate_challenge, HttpClient, SalesforceAuthenticator, SalesforceConnector};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn http() -> HttpClient {
    HttpClient::builder().base_backoff(Duration::from_millis(5)).build().expect("http client")
}

fn client_for(server: &MockServer) -> std::sync::Arc<dyn CrmClient> {
    let session = CrmSession { instance_url: server.uri(), access_token: "00D-token".into() };
    SalesforceConnector::new(http(), "59.0").connect(&session)
}

fn oauth_settings(server: &MockServer) -> OAuthSettings {
    OAuthSettings {
        login_url: server.uri(),
        client_id: "consumer-key".into(),
        client_secret: "consumer-secret".into(),
        callback_url: "http://localhost:8080/auth/callback".into(),
    }
}

fn row(id: &str) -> Value {
    json!({ "attributes": { "type": "X9902_Client__c" }, "Id": id, "Client_ID_Num__c": id })
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn fetch_all_follows_next_records_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .and(query_param("q", "SELECT Id FROM X9902_Client__c"))
        .and(header("authorization", "Bearer 00D-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 3,
            "done": false,
            "nextRecordsUrl": "/services/data/v59.0/query/01gD0000002HU6KIAW-2000",
            "records": [row("a1"), row("a2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query/01gD0000002HU6KIAW-2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 3,
            "done": true,
            "records": [row("a3")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let crm = client_for(&server);
    let records = fetch_all(crm.as_ref(), "SELECT Id FROM X9902_Client__c").await.unwrap();

    let ids: Vec<_> = records.iter().filter_map(|r| r.id.clone()).collect();
    assert_eq!(ids, ["a1", "a2", "a3"]);
    assert!(records[0].get("attributes").is_none());
}

#[tokio::test]
async fn query_errors_carry_salesforce_error_codes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([
            { "message": "No such column 'Bogus__c'", "errorCode": "INVALID_FIELD" }
        ])))
        .mount(&server)
        .await;

    let err = client_for(&server).query("SELECT Bogus__c FROM X9902__c").await.unwrap_err();
    match err {
        ArmLinkError::Crm(msg) => {
            assert!(msg.contains("INVALID_FIELD"));
            assert!(msg.contains("Bogus__c"));
        }
        other => panic!("expected CRM error, got {other:?}"),
    }
}

#[tokio::test]
async fn expired_session_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!([
            { "message": "Session expired or invalid", "errorCode": "INVALID_SESSION_ID" }
        ])))
        .mount(&server)
        .await;

    let err = client_for(&server).identity().await.unwrap_err();
    assert!(matches!(err, ArmLinkError::Auth(msg) if msg.contains("INVALID_SESSION_ID")));
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn update_record_patches_sobject() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/services/data/v59.0/sobjects/X9902__c/a0B5e000001AbCdEAK"))
        .and(body_json(json!({ "ClientSubmissionStatus__c": "DONE" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = Map::new();
    fields.insert("ClientSubmissionStatus__c".into(), Value::from("DONE"));

    client_for(&server).update_record("X9902__c", "a0B5e000001AbCdEAK", fields).await.unwrap();
}

#[tokio::test]
async fn revoke_posts_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/oauth2/revoke"))
        .and(body_string_contains("token=00D-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).revoke().await.unwrap();
}

// ============================================================================
// OAuth
// ============================================================================

#[tokio::test]
async fn exchange_code_returns_instance_session() {
    let server = MockServer::start().await;
    let challenge = generate_challenge();

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=aPrx-code"))
        .and(body_string_contains(format!("code_verifier={}", challenge.code_verifier)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "00Dxx!token",
            "instance_url": "https://acme.my.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = SalesforceAuthenticator::new(http());
    let session =
        auth.exchange_code(&oauth_settings(&server), "aPrx-code", &challenge.code_verifier).await.unwrap();

    assert_eq!(session.instance_url, "https://acme.my.salesforce.com");
    assert_eq!(session.access_token, "00Dxx!token");
}

#[tokio::test]
async fn rejected_code_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "expired authorization code"
        })))
        .mount(&server)
        .await;

    let auth = SalesforceAuthenticator::new(http());
    let err = auth.exchange_code(&oauth_settings(&server), "stale", "verifier").await.unwrap_err();

    assert!(matches!(err, ArmLinkError::Auth(msg) if msg.contains("invalid_grant")));
}
