//! Wire types for the Compute Engine firewall collection.

use serde::{Deserialize, Serialize};

/// A firewall rule as returned by `firewalls.list`.
///
/// Every field is optional on the wire; absent values decode to their
/// empty form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirewallRule {
    /// Rule name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Network URL the rule applies to
    pub network: String,
    /// Whether the rule is disabled
    pub disabled: bool,
    /// Source CIDR ranges
    pub source_ranges: Vec<String>,
    /// Source service accounts
    pub source_service_accounts: Vec<String>,
    /// Source network tags
    pub source_tags: Vec<String>,
    /// Target network tags
    pub target_tags: Vec<String>,
    /// Target service accounts
    pub target_service_accounts: Vec<String>,
    /// Allowed protocol/port combinations
    pub allowed: Vec<FirewallPermission>,
    /// Denied protocol/port combinations
    pub denied: Vec<FirewallPermission>,

    /// Numeric ID, serialized as a string by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// INGRESS or EGRESS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// Rule priority, lower wins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Canonical resource URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// One protocol entry of a rule's `allowed` or `denied` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallPermission {
    /// Protocol name or number (tcp, udp, icmp, all, 47, ...)
    #[serde(rename = "IPProtocol", default)]
    pub ip_protocol: String,
    /// Ports or port ranges; absent means all ports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<String>>,
}

impl FirewallPermission {
    /// Permission for a protocol with the given ports.
    pub fn new<I, S>(protocol: impl Into<String>, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ip_protocol: protocol.into(),
            ports: Some(ports.into_iter().map(Into::into).collect()),
        }
    }

    /// Permission covering every port of a protocol.
    pub fn all_ports(protocol: impl Into<String>) -> Self {
        Self {
            ip_protocol: protocol.into(),
            ports: None,
        }
    }
}

/// Response body of `firewalls.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirewallList {
    /// Resource kind, `compute#firewallList`
    pub kind: Option<String>,
    /// Rules on this page, in provider order
    pub items: Vec<FirewallRule>,
    /// Set when further pages exist
    pub next_page_token: Option<String>,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorItem {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorBody {
    /// `message, reason` in the style the API tooling reports errors.
    pub fn describe(&self) -> String {
        match self.errors.first().and_then(|e| e.reason.as_deref()) {
            Some(reason) if !reason.is_empty() => format!("{}, {}", self.message, reason),
            _ => self.message.clone(),
        }
    }
}
