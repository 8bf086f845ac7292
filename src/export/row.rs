//! Projection of a firewall rule onto a fixed set of CSV columns.

use crate::compute::{FirewallPermission, FirewallRule};

/// Column names, in output order.
pub const HEADER: [&str; 11] = [
    "Name",
    "Description",
    "Network",
    "Disabled",
    "SourceRanges",
    "SourceServiceAccounts",
    "SourceTags",
    "TargetTags",
    "TargetServiceAccounts",
    "Allowed",
    "Denied",
];

/// One flattened firewall rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    cells: [String; 11],
}

impl OutputRow {
    /// Project a rule onto the [`HEADER`] columns.
    pub fn from_rule(rule: &FirewallRule) -> Self {
        Self {
            cells: [
                rule.name.clone(),
                rule.description.clone(),
                rule.network.clone(),
                rule.disabled.to_string(),
                render_list(&rule.source_ranges),
                render_list(&rule.source_service_accounts),
                render_list(&rule.source_tags),
                render_list(&rule.target_tags),
                render_list(&rule.target_service_accounts),
                render_permissions(&rule.allowed),
                render_permissions(&rule.denied),
            ],
        }
    }

    /// Cell values in column order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Value of a named column.
    pub fn get(&self, column: &str) -> Option<&str> {
        HEADER
            .iter()
            .position(|name| *name == column)
            .map(|idx| self.cells[idx].as_str())
    }

    /// The row as echoed to the terminal: raw cells joined by commas.
    pub fn echo_line(&self) -> String {
        self.cells.join(",")
    }
}

impl From<&FirewallRule> for OutputRow {
    fn from(rule: &FirewallRule) -> Self {
        OutputRow::from_rule(rule)
    }
}

/// `[a b c]`, or `[]` for an empty list.
pub fn render_list<S: AsRef<str>>(items: &[S]) -> String {
    let joined: Vec<&str> = items.iter().map(|item| item.as_ref()).collect();
    format!("[{}]", joined.join(" "))
}

/// `protocol:port;port` for a single permission. A missing port list renders empty.
pub fn render_permission(permission: &FirewallPermission) -> String {
    let ports = permission
        .ports
        .as_ref()
        .map(|ports| ports.join(";"))
        .unwrap_or_default();
    format!("{}:{}", permission.ip_protocol, ports)
}

/// Bracketed list of rendered permissions.
pub fn render_permissions(permissions: &[FirewallPermission]) -> String {
    let tokens: Vec<String> = permissions.iter().map(render_permission).collect();
    render_list(&tokens)
}
