//! Credential key files understood by the default credentials chain.
//!
//! Two file types are supported, distinguished by their `type` field:
//!
//! - `authorized_user`: written by `gcloud auth application-default login`,
//!   exchanged with a refresh-token grant
//! - `service_account`: a downloaded service account key, exchanged with a
//!   signed RS256 JWT assertion

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::token::{exchange, AccessToken, TokenSource};
use crate::error::{Error, Result};

/// Token endpoint used when a credentials file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for service account assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Parsed credentials file together with where it was read from.
#[derive(Debug, Clone)]
pub struct CredentialsFile {
    path: PathBuf,
    kind: CredentialKind,
}

/// The supported credential types.
#[derive(Debug, Clone)]
pub enum CredentialKind {
    /// User credentials with a refresh token
    AuthorizedUser(AuthorizedUser),
    /// Service account key
    ServiceAccount(ServiceAccount),
}

#[derive(Deserialize)]
struct TypeTag {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Fields of an `authorized_user` credentials file.
#[derive(Clone, Deserialize)]
pub struct AuthorizedUser {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Token endpoint override
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Fields of a `service_account` key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    /// Service account e-mail, used as the assertion issuer
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    /// Key ID, sent as the JWT `kid` header
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint override
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Project the key belongs to
    #[serde(default)]
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl CredentialsFile {
    /// Read and parse a credentials file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_credentials(path, format!("cannot be read: {}", e))
        })?;
        Self::parse(path, &content)
    }

    /// Parse credentials JSON that was read from `path`.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let tag: TypeTag = serde_json::from_str(content)
            .map_err(|e| Error::invalid_credentials(&path, format!("not valid JSON: {}", e)))?;

        let kind = match tag.kind.as_deref() {
            Some("authorized_user") => CredentialKind::AuthorizedUser(
                serde_json::from_str(content)
                    .map_err(|e| Error::invalid_credentials(&path, e.to_string()))?,
            ),
            Some("service_account") => CredentialKind::ServiceAccount(
                serde_json::from_str(content)
                    .map_err(|e| Error::invalid_credentials(&path, e.to_string()))?,
            ),
            Some(other) => {
                return Err(Error::invalid_credentials(
                    &path,
                    format!("unsupported credential type '{}'", other),
                ))
            }
            None => {
                return Err(Error::invalid_credentials(
                    &path,
                    "missing 'type' field",
                ))
            }
        };

        Ok(Self { path, kind })
    }

    /// Path the credentials were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed credential.
    pub fn kind(&self) -> &CredentialKind {
        &self.kind
    }

    /// Exchange the credential for an access token with the given scope.
    pub async fn fetch_token(&self, client: &Client, scope: &str) -> Result<AccessToken> {
        match &self.kind {
            CredentialKind::AuthorizedUser(user) => {
                let endpoint = user.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
                debug!(
                    "Refreshing user credentials for client {} from {}",
                    user.client_id,
                    self.path.display()
                );
                exchange(
                    client,
                    endpoint,
                    &[
                        ("grant_type", "refresh_token"),
                        ("client_id", user.client_id.as_str()),
                        ("client_secret", user.client_secret.as_str()),
                        ("refresh_token", user.refresh_token.as_str()),
                    ],
                    TokenSource::AuthorizedUser(self.path.clone()),
                )
                .await
            }
            CredentialKind::ServiceAccount(account) => {
                let endpoint = account.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
                let assertion = self.sign_assertion(account, endpoint, scope)?;
                debug!(
                    "Exchanging service account assertion for {}",
                    account.client_email
                );
                exchange(
                    client,
                    endpoint,
                    &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
                    TokenSource::ServiceAccount(self.path.clone()),
                )
                .await
            }
        }
    }

    fn sign_assertion(&self, account: &ServiceAccount, audience: &str, scope: &str) -> Result<String> {
        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &account.client_email,
            scope,
            aud: audience,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = account.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
            Error::invalid_credentials(&self.path, format!("private_key is not a usable RSA key: {}", e))
        })?;

        jsonwebtoken::encode(&header, &claims, &key).map_err(|e| {
            Error::invalid_credentials(&self.path, format!("failed to sign assertion: {}", e))
        })
    }
}
