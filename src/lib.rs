//! # firewall-list
//!
//! Exports the firewall rules of a Google Cloud project to a CSV file.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      CLI Interface                        │
//! │          (clap parsing, single-dash flag support)         │
//! └──────────────────────────────────────────────────────────┘
//!                              │ Config
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      RuleExporter                         │
//! └──────────────────────────────────────────────────────────┘
//!          │                   │                    │
//!          ▼                   ▼                    ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌──────────────────┐
//! │  Authenticator  │ │  ComputeClient  │ │   CsvExporter    │
//! │ (static token / │ │ (firewalls.list,│ │ (11 fixed cols,  │
//! │  default creds) │ │  first page)    │ │  input order)    │
//! └─────────────────┘ └─────────────────┘ └──────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use firewall_list::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load(None)?.with_project("my-project");
//!     let exporter = RuleExporter::new(GoogleCompute::from_config(&config)?);
//!     let summary = exporter.run(&config).await?;
//!     println!("{} rules written to {}", summary.rows, summary.path.display());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod compute;
pub mod config;
pub mod error;
pub mod export;
pub mod exporter;

pub use error::{Error, Result};

/// Commonly used types.
pub mod prelude {
    pub use crate::auth::{AccessToken, Authenticator, DefaultCredentialChain, DefaultCredentials};
    pub use crate::compute::{ComputeClient, FirewallPermission, FirewallRule, GoogleCompute};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::export::{ExportSummary, OutputRow, HEADER};
    pub use crate::exporter::{ComputeProvider, RuleExporter};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
