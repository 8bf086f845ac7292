//! HTTP client for the Compute Engine firewall collection.

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::types::{ApiErrorResponse, FirewallList};
use crate::auth::AccessToken;
use crate::auth::token::truncate;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Compute Engine REST client.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    client: Client,
    endpoint: Url,
}

impl ComputeClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| Error::Config {
            message: format!("invalid compute endpoint '{}'", config.endpoint),
            source: Some(Box::new(e)),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::config(format!(
                "compute endpoint '{}' cannot carry a path",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::transport(endpoint.as_str(), e))?;

        Ok(Self { client, endpoint })
    }

    /// Base URL requests are made against.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// URL of a project's global firewall collection.
    pub fn firewalls_url(&self, project_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["projects", project_id, "global", "firewalls"]);
        }
        url
    }

    /// Issue a single `firewalls.list` call. Only the first page is read.
    pub async fn list_firewalls(&self, token: &AccessToken, project_id: &str) -> Result<FirewallList> {
        let url = self.firewalls_url(project_id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| Error::transport(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let list: FirewallList = response
            .json()
            .await
            .map_err(|e| Error::transport(url.as_str(), e))?;

        if let Some(ref token) = list.next_page_token {
            warn!(
                "Project '{}' has more firewall rules than fit in one page; only the first {} are exported (nextPageToken={})",
                project_id,
                list.items.len(),
                token
            );
        }

        debug!("Received {} firewall rule(s) for '{}'", list.items.len(), project_id);
        for rule in &list.items {
            debug!(
                "  {} id={} direction={} priority={} {}",
                rule.name,
                rule.id.as_deref().unwrap_or("-"),
                rule.direction.as_deref().unwrap_or("-"),
                rule.priority.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                rule.self_link.as_deref().unwrap_or("")
            );
        }
        Ok(list)
    }
}

/// Turn a non-success response into an API error.
fn api_error(status: StatusCode, body: &str) -> Error {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(envelope) => Error::api(
            envelope.error.code.unwrap_or(status.as_u16()),
            envelope.error.describe(),
        ),
        Err(_) => {
            let text = truncate(body.trim(), 200);
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            } else {
                text.to_string()
            };
            Error::api(status.as_u16(), message)
        }
    }
}
