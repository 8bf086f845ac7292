//! Shared test utilities and fixtures for the firewall-list test suite.
//!
//! This module provides:
//! - Builders for firewall rules and their API JSON
//! - A recording [`ComputeProvider`] for pipeline tests
//! - A counting [`DefaultCredentials`] source for authentication tests
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use firewall_list::auth::{AccessToken, DefaultCredentials};
use firewall_list::compute::{FirewallPermission, FirewallRule};
use firewall_list::exporter::ComputeProvider;
use firewall_list::{Error, Result};

// ============================================================================
// Rule Fixtures
// ============================================================================

/// A minimal rule allowing SSH.
pub fn ssh_rule(name: &str) -> FirewallRule {
    FirewallRule {
        name: name.to_string(),
        description: format!("{} rule", name),
        network: "https://www.googleapis.com/compute/v1/projects/test-project/global/networks/default"
            .to_string(),
        source_ranges: vec!["35.235.240.0/20".to_string()],
        allowed: vec![FirewallPermission::new("tcp", ["22"])],
        ..FirewallRule::default()
    }
}

/// A rule exercising every column.
pub fn full_rule() -> FirewallRule {
    FirewallRule {
        name: "allow-web".to_string(),
        description: "web tier, \"public\" ingress".to_string(),
        network: "https://www.googleapis.com/compute/v1/projects/test-project/global/networks/prod"
            .to_string(),
        disabled: true,
        source_ranges: vec!["0.0.0.0/0".to_string(), "10.0.0.0/8".to_string()],
        source_service_accounts: vec!["lb@test-project.iam.gserviceaccount.com".to_string()],
        source_tags: vec!["lb".to_string()],
        target_tags: vec!["http-server".to_string(), "https-server".to_string()],
        target_service_accounts: vec!["web@test-project.iam.gserviceaccount.com".to_string()],
        allowed: vec![
            FirewallPermission::new("tcp", ["80", "443"]),
            FirewallPermission::all_ports("icmp"),
        ],
        denied: vec![FirewallPermission::new("udp", ["53"])],
        ..FirewallRule::default()
    }
}

/// JSON for a `firewalls.list` response containing the named SSH rules.
pub fn firewall_list_json(names: &[&str]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            json!({
                "kind": "compute#firewall",
                "name": name,
                "description": format!("{} rule", name),
                "network": "https://www.googleapis.com/compute/v1/projects/test-project/global/networks/default",
                "priority": 1000,
                "direction": "INGRESS",
                "sourceRanges": ["35.235.240.0/20"],
                "allowed": [{"IPProtocol": "tcp", "ports": ["22"]}],
                "disabled": false
            })
        })
        .collect();

    json!({
        "kind": "compute#firewallList",
        "id": "projects/test-project/global/firewalls",
        "items": items,
        "selfLink": "https://www.googleapis.com/compute/v1/projects/test-project/global/firewalls"
    })
}

// ============================================================================
// Mock Provider
// ============================================================================

/// Provider returning canned rules and recording every call.
pub struct RecordingProvider {
    rules: Vec<FirewallRule>,
    fail_auth: bool,
    fail_list: bool,
    pub auth_calls: AtomicU32,
    pub list_calls: AtomicU32,
    pub projects: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new(rules: Vec<FirewallRule>) -> Self {
        Self {
            rules,
            fail_auth: false,
            fail_list: false,
            auth_calls: AtomicU32::new(0),
            list_calls: AtomicU32::new(0),
            projects: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_auth() -> Self {
        Self {
            fail_auth: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn failing_list() -> Self {
        Self {
            fail_list: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn auth_count(&self) -> u32 {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComputeProvider for RecordingProvider {
    async fn authenticate(&self) -> Result<AccessToken> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth {
            return Err(Error::authentication("could not find default credentials"));
        }
        Ok(AccessToken::new_static("ya29.test"))
    }

    async fn list_firewalls(
        &self,
        _token: &AccessToken,
        project_id: &str,
    ) -> Result<Vec<FirewallRule>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.projects.lock().unwrap().push(project_id.to_string());
        if self.fail_list {
            return Err(Error::api(403, "Required 'compute.firewalls.list' permission, forbidden"));
        }
        Ok(self.rules.clone())
    }
}

// ============================================================================
// Mock Default Credentials
// ============================================================================

/// Default credentials source that counts how often it is consulted.
pub struct CountingCredentials {
    calls: AtomicU32,
    secret: String,
}

impl CountingCredentials {
    pub fn new(secret: &str) -> Self {
        Self {
            calls: AtomicU32::new(0),
            secret: secret.to_string(),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DefaultCredentials for CountingCredentials {
    async fn fetch_token(&self, _scope: &str) -> Result<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new_static(self.secret.clone()))
    }
}

#[async_trait]
impl<'a> DefaultCredentials for &'a CountingCredentials {
    async fn fetch_token(&self, scope: &str) -> Result<AccessToken> {
        (**self).fetch_token(scope).await
    }
}
