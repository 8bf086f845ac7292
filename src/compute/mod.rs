//! Google Compute Engine access.
//!
//! [`GoogleCompute`] ties the [`Authenticator`](crate::auth::Authenticator)
//! and the [`ComputeClient`] together behind the
//! [`ComputeProvider`](crate::exporter::ComputeProvider) seam.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::auth::{AccessToken, Authenticator, DefaultCredentialChain, DefaultCredentials};
use crate::config::Config;
use crate::error::Result;
use crate::exporter::ComputeProvider;

pub use client::ComputeClient;
pub use types::{FirewallList, FirewallPermission, FirewallRule};

/// The live provider: OAuth credentials plus the compute REST API.
pub struct GoogleCompute<D> {
    authenticator: Authenticator<D>,
    client: ComputeClient,
}

impl GoogleCompute<DefaultCredentialChain> {
    /// Build the provider from configuration and the process environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let defaults = DefaultCredentialChain::from_env(config.api.timeout())?;
        Self::with_credentials(config, defaults)
    }
}

impl<D: DefaultCredentials> GoogleCompute<D> {
    /// Build the provider with an explicit default-credentials source.
    pub fn with_credentials(config: &Config, defaults: D) -> Result<Self> {
        Ok(Self {
            authenticator: Authenticator::new(config.access_token.clone(), defaults),
            client: ComputeClient::new(&config.api)?,
        })
    }
}

#[async_trait]
impl<D: DefaultCredentials> ComputeProvider for GoogleCompute<D> {
    async fn authenticate(&self) -> Result<AccessToken> {
        self.authenticator.authenticate().await
    }

    async fn list_firewalls(
        &self,
        token: &AccessToken,
        project_id: &str,
    ) -> Result<Vec<FirewallRule>> {
        let list = self.client.list_firewalls(token, project_id).await?;
        Ok(list.items)
    }
}
