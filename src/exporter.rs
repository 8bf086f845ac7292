//! The export pipeline: authenticate, fetch, write.
//!
//! ```text
//! Config ──► authenticate() ──► list_firewalls(project) ──► CSV file
//!                 │                     │                      │
//!            AccessToken         Vec<FirewallRule>       ExportSummary
//! ```
//!
//! Each stage runs once, in order. The first error ends the run and is
//! returned to the caller unchanged.

use std::io::Write;

use async_trait::async_trait;
use tracing::info;

use crate::auth::AccessToken;
use crate::compute::FirewallRule;
use crate::config::Config;
use crate::error::Result;
use crate::export::{export_to_file, ExportSummary};

/// The two calls the exporter needs from a cloud provider.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Obtain a credential for subsequent calls.
    async fn authenticate(&self) -> Result<AccessToken>;

    /// List a project's firewall rules in provider order.
    async fn list_firewalls(&self, token: &AccessToken, project_id: &str)
        -> Result<Vec<FirewallRule>>;
}

/// Runs one export against a provider.
pub struct RuleExporter<P> {
    provider: P,
}

impl<P: ComputeProvider> RuleExporter<P> {
    /// Create an exporter over `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Borrow the provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Export, echoing each row to standard output.
    pub async fn run(&self, config: &Config) -> Result<ExportSummary> {
        self.run_with_echo(config, std::io::stdout()).await
    }

    /// Export, echoing each row to `echo`.
    ///
    /// The configuration is validated before anything else, so an empty
    /// project never reaches the provider.
    pub async fn run_with_echo<E: Write>(&self, config: &Config, echo: E) -> Result<ExportSummary> {
        config.validate()?;
        let project_id = config.project_id.as_str();

        let token = self.provider.authenticate().await?;
        let rules = self.provider.list_firewalls(&token, project_id).await?;
        info!(
            "Fetched {} firewall rule(s) for project '{}'",
            rules.len(),
            project_id
        );

        let summary = export_to_file(&rules, config.output_path(), echo)?;
        info!("Firewall rules written to {}", summary.path.display());
        Ok(summary)
    }
}
