//! Credential acquisition for the compute API.
//!
//! An [`Authenticator`] produces an [`AccessToken`] in one of two ways:
//!
//! - a static token taken from `GOOGLE_OAUTH_ACCESS_TOKEN`, used verbatim and
//!   never refreshed
//! - the default credentials chain ([`DefaultCredentialChain`]), scoped for
//!   read-only compute access
//!
//! When a static token is present the default chain is never consulted.

pub mod credentials;
pub mod default_credentials;
pub mod token;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use credentials::{CredentialKind, CredentialsFile};
pub use default_credentials::DefaultCredentialChain;
pub use token::{AccessToken, TokenSource};

/// OAuth scope for read-only Compute Engine access.
pub const COMPUTE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/compute.readonly";

/// Source of ambient credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DefaultCredentials: Send + Sync {
    /// Obtain an access token carrying `scope`.
    async fn fetch_token(&self, scope: &str) -> Result<AccessToken>;
}

/// Chooses between a static token and default credentials.
pub struct Authenticator<D> {
    access_token: Option<String>,
    scope: String,
    defaults: D,
}

impl<D: DefaultCredentials> Authenticator<D> {
    /// Create an authenticator. An empty `access_token` counts as absent.
    pub fn new(access_token: Option<String>, defaults: D) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            scope: COMPUTE_READONLY_SCOPE.to_string(),
            defaults,
        }
    }

    /// Request a different scope from default credentials.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Whether a static token will be used.
    pub fn has_static_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Produce a credential for the compute API.
    pub async fn authenticate(&self) -> Result<AccessToken> {
        if let Some(ref token) = self.access_token {
            info!("Authenticating with static access token from environment");
            return Ok(AccessToken::new_static(token.clone()));
        }

        debug!("No static access token, using default credentials");
        let token = self.defaults.fetch_token(&self.scope).await?;
        if token.is_expired() {
            return Err(Error::authentication(format!(
                "{} issued an already expired token",
                token.source()
            )));
        }

        info!("Authenticated via {}", token.source());
        Ok(token)
    }
}
