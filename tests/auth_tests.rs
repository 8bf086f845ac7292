//! Authentication tests for firewall-list
//!
//! Exercises the default credentials chain against mock token endpoints and
//! a mock metadata server, plus the static token short-circuit.

mod common;

use std::time::Duration;

use serde_json::json;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::CountingCredentials;
use firewall_list::auth::{
    Authenticator, DefaultCredentialChain, DefaultCredentials, TokenSource,
    COMPUTE_READONLY_SCOPE,
};
use firewall_list::Error;

const TIMEOUT: Duration = Duration::from_secs(5);

fn authorized_user_file(dir: &TempDir, token_uri: &str) -> std::path::PathBuf {
    let path = dir.path().join("application_default_credentials.json");
    let content = json!({
        "type": "authorized_user",
        "client_id": "764086051850-test.apps.googleusercontent.com",
        "client_secret": "d-FL95Q19q7MQmFpd7hHD0Ty",
        "refresh_token": "1//0refresh-token",
        "token_uri": token_uri
    });
    std::fs::write(&path, content.to_string()).unwrap();
    path
}

fn token_body(token: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "expires_in": 3599,
        "token_type": "Bearer"
    })
}

// ============================================================================
// Credentials Files
// ============================================================================

#[tokio::test]
async fn test_authorized_user_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2F0refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ya29.user")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let creds = authorized_user_file(&dir, &format!("{}/token", server.uri()));

    let chain = DefaultCredentialChain::empty(TIMEOUT)
        .unwrap()
        .with_credentials_file(&creds);
    let token = chain.fetch_token(COMPUTE_READONLY_SCOPE).await.unwrap();

    assert_eq!(token.secret(), "ya29.user");
    assert_eq!(token.source(), &TokenSource::AuthorizedUser(creds));
    assert!(token.expires_at().is_some());
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_well_known_file_is_used_when_env_file_unset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ya29.gcloud")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let creds = authorized_user_file(&dir, &format!("{}/token", server.uri()));

    let chain = DefaultCredentialChain::empty(TIMEOUT)
        .unwrap()
        .with_well_known_file(Some(creds));
    let token = chain.fetch_token(COMPUTE_READONLY_SCOPE).await.unwrap();
    assert_eq!(token.secret(), "ya29.gcloud");
}

#[tokio::test]
async fn test_token_endpoint_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let creds = authorized_user_file(&dir, &format!("{}/token", server.uri()));

    let chain = DefaultCredentialChain::empty(TIMEOUT)
        .unwrap()
        .with_credentials_file(creds);
    let err = chain.fetch_token(COMPUTE_READONLY_SCOPE).await.unwrap_err();

    match &err {
        Error::TokenExchange {
            status, message, ..
        } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "invalid_grant: Token has been expired or revoked.");
        }
        other => panic!("expected TokenExchange, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_unsupported_credentials_type() {
    let dir = tempdir().unwrap();
    let creds = dir.path().join("external.json");
    std::fs::write(&creds, r#"{"type": "external_account", "audience": "x"}"#).unwrap();

    let chain = DefaultCredentialChain::empty(TIMEOUT)
        .unwrap()
        .with_credentials_file(creds);
    let err = chain.fetch_token(COMPUTE_READONLY_SCOPE).await.unwrap_err();

    assert!(matches!(err, Error::InvalidCredentials { .. }));
    assert!(err.to_string().contains("external_account"));
}

// ============================================================================
// Metadata Server
// ============================================================================

#[tokio::test]
async fn test_metadata_server_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .and(header("Metadata-Flavor", "Google"))
        .and(query_param("scopes", COMPUTE_READONLY_SCOPE))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ya29.gce")))
        .expect(1)
        .mount(&server)
        .await;

    let chain = DefaultCredentialChain::empty(TIMEOUT)
        .unwrap()
        .with_metadata_host(server.address().to_string());
    let token = chain.fetch_token(COMPUTE_READONLY_SCOPE).await.unwrap();

    assert_eq!(token.secret(), "ya29.gce");
    assert_eq!(token.source(), &TokenSource::MetadataServer);
}

#[tokio::test]
async fn test_metadata_server_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("service account not found"))
        .mount(&server)
        .await;

    let chain = DefaultCredentialChain::empty(TIMEOUT)
        .unwrap()
        .with_metadata_host(server.address().to_string());
    let err = chain.fetch_token(COMPUTE_READONLY_SCOPE).await.unwrap_err();

    assert!(matches!(err, Error::TokenExchange { status: 404, .. }));
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_no_credentials_anywhere() {
    // Nothing listens on port 1
    let chain = DefaultCredentialChain::empty(TIMEOUT)
        .unwrap()
        .with_metadata_host("127.0.0.1:1");
    let err = chain.fetch_token(COMPUTE_READONLY_SCOPE).await.unwrap_err();

    assert!(matches!(err, Error::AuthenticationFailed { .. }));
    assert!(err.to_string().contains("default credentials"));
    assert_eq!(err.exit_code(), 3);
}

// ============================================================================
// Authenticator
// ============================================================================

#[tokio::test]
async fn test_static_token_never_consults_default_credentials() {
    let defaults = CountingCredentials::new("ya29.ambient");
    let auth = Authenticator::new(Some("ya29.static".to_string()), &defaults);

    let token = auth.authenticate().await.unwrap();
    assert_eq!(token.secret(), "ya29.static");
    assert_eq!(token.source(), &TokenSource::Static);
    assert_eq!(defaults.calls(), 0);
}

#[tokio::test]
async fn test_absent_token_consults_default_credentials_once() {
    let defaults = CountingCredentials::new("ya29.ambient");
    let auth = Authenticator::new(None, &defaults);

    let token = auth.authenticate().await.unwrap();
    assert_eq!(token.secret(), "ya29.ambient");
    assert_eq!(defaults.calls(), 1);
}
