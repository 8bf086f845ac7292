//! Application Default Credentials lookup.
//!
//! Sources are tried in a fixed order and the first one that is present wins:
//!
//! 1. The key file named by `GOOGLE_APPLICATION_CREDENTIALS`
//! 2. The gcloud well-known file `application_default_credentials.json`
//! 3. The compute metadata server of the host instance
//!
//! A present source that fails is an error. Later sources are not tried.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::credentials::CredentialsFile;
use super::token::{truncate, AccessToken, TokenResponse, TokenSource};
use super::DefaultCredentials;
use crate::error::{Error, Result};

/// Environment variable naming a credentials key file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Environment variable overriding the gcloud configuration directory.
pub const CLOUDSDK_CONFIG_ENV: &str = "CLOUDSDK_CONFIG";

/// Environment variable overriding the metadata server host.
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

/// Default metadata server host.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

const WELL_KNOWN_FILE: &str = "application_default_credentials.json";

const METADATA_TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";

/// Probing the metadata server off-GCE must fail fast.
const METADATA_TIMEOUT: Duration = Duration::from_secs(3);

/// The default credentials chain.
#[derive(Debug, Clone)]
pub struct DefaultCredentialChain {
    client: Client,
    credentials_file: Option<PathBuf>,
    well_known_file: Option<PathBuf>,
    metadata_host: String,
}

impl DefaultCredentialChain {
    /// Build a chain from the process environment.
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let credentials_file = std::env::var(CREDENTIALS_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let metadata_host = std::env::var(METADATA_HOST_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string());

        Ok(Self {
            client: Self::build_client(timeout, &default_user_agent())?,
            credentials_file,
            well_known_file: well_known_path(),
            metadata_host,
        })
    }

    /// Build a chain that consults nothing but what is configured on it.
    pub fn empty(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Self::build_client(timeout, &default_user_agent())?,
            credentials_file: None,
            well_known_file: None,
            metadata_host: DEFAULT_METADATA_HOST.to_string(),
        })
    }

    fn build_client(timeout: Duration, user_agent: &str) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                Error::authentication_with_source("failed to create HTTP client for credentials", e)
            })
    }

    /// Use this key file as the first source.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Override (or disable) the gcloud well-known file.
    pub fn with_well_known_file(mut self, path: Option<PathBuf>) -> Self {
        self.well_known_file = path;
        self
    }

    /// Override the metadata server host (`host` or `host:port`).
    pub fn with_metadata_host(mut self, host: impl Into<String>) -> Self {
        self.metadata_host = host.into();
        self
    }

    async fn from_metadata_server(&self, scope: &str) -> Result<AccessToken> {
        let url = format!("http://{}/{}", self.metadata_host, METADATA_TOKEN_PATH);
        debug!("Requesting access token from metadata server {}", self.metadata_host);

        let response = self
            .client
            .get(&url)
            .query(&[("scopes", scope)])
            .header("Metadata-Flavor", "Google")
            .timeout(METADATA_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                Error::authentication_with_source(
                    format!(
                        "could not find default credentials: {} is unset, no {} was found, \
                         and the metadata server at {} is unreachable",
                        CREDENTIALS_ENV, WELL_KNOWN_FILE, self.metadata_host
                    ),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenExchange {
                endpoint: url,
                status: status.as_u16(),
                message: truncate(body.trim(), 200).to_string(),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            Error::authentication_with_source("malformed metadata server token response", e)
        })?;

        Ok(AccessToken::from_response(token, TokenSource::MetadataServer))
    }
}

#[async_trait]
impl DefaultCredentials for DefaultCredentialChain {
    async fn fetch_token(&self, scope: &str) -> Result<AccessToken> {
        if let Some(ref path) = self.credentials_file {
            info!("Using credentials from {}={}", CREDENTIALS_ENV, path.display());
            let creds = CredentialsFile::load(path)?;
            return creds.fetch_token(&self.client, scope).await;
        }

        if let Some(path) = self.well_known_file.as_ref().filter(|p| p.is_file()) {
            info!("Using application default credentials from {}", path.display());
            let creds = CredentialsFile::load(path)?;
            return creds.fetch_token(&self.client, scope).await;
        }

        self.from_metadata_server(scope).await
    }
}

fn default_user_agent() -> String {
    format!("firewall-list/{}", env!("CARGO_PKG_VERSION"))
}

/// Location of the gcloud application default credentials file.
pub fn well_known_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CLOUDSDK_CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir).join(WELL_KNOWN_FILE));
    }

    if cfg!(windows) {
        dirs::config_dir().map(|dir| dir.join("gcloud").join(WELL_KNOWN_FILE))
    } else {
        dirs::home_dir().map(|home| home.join(".config").join("gcloud").join(WELL_KNOWN_FILE))
    }
}
