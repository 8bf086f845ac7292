//! OAuth2 access tokens and token endpoint exchanges.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Where an access token came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Supplied verbatim through the environment, never refreshed
    Static,
    /// Refresh-token grant from a gcloud user credentials file
    AuthorizedUser(PathBuf),
    /// JWT-bearer grant from a service account key file
    ServiceAccount(PathBuf),
    /// Compute metadata server of the host instance
    MetadataServer,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static => write!(f, "static access token"),
            TokenSource::AuthorizedUser(path) => {
                write!(f, "authorized user credentials ({})", path.display())
            }
            TokenSource::ServiceAccount(path) => {
                write!(f, "service account credentials ({})", path.display())
            }
            TokenSource::MetadataServer => write!(f, "metadata server"),
        }
    }
}

/// A bearer token used to authorize compute API calls.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Option<DateTime<Utc>>,
    source: TokenSource,
}

impl AccessToken {
    /// Wrap a pre-issued token. It carries no expiry and is never refreshed.
    pub fn new_static(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expires_at: None,
            source: TokenSource::Static,
        }
    }

    /// Build a token from a token endpoint response.
    pub fn from_response(response: TokenResponse, source: TokenSource) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + ChronoDuration::seconds(secs));
        Self {
            secret: response.access_token,
            expires_at,
            source,
        }
    }

    /// The raw token, for the `Authorization` header only.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Expiry reported by the issuer, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Where the token came from.
    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    /// Whether the issuer-reported expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| at <= Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .finish()
    }
}

/// Successful token endpoint (or metadata server) response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The issued token
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Normally "Bearer"
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth2 error body (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Post a form-encoded grant to a token endpoint and decode the token.
pub(crate) async fn exchange(
    client: &Client,
    endpoint: &str,
    form: &[(&str, &str)],
    source: TokenSource,
) -> Result<AccessToken> {
    debug!("Requesting access token from {}", endpoint);

    let response = client
        .post(endpoint)
        .form(form)
        .send()
        .await
        .map_err(|e| Error::authentication_with_source(format!("token request to {} failed", endpoint), e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<OAuthErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => truncate(&body, 200).to_string(),
        };
        return Err(Error::TokenExchange {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        Error::authentication_with_source(format!("malformed token response from {}", endpoint), e)
    })?;

    Ok(AccessToken::from_response(token, source))
}

/// Cut a string down to at most `max` bytes on a char boundary.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
