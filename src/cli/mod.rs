//! CLI module for firewall-list
//!
//! Argument parsing and the hand-off from flags to [`Config`]. Flags are
//! accepted in both the single-dash long form (`-projectID my-project`) and
//! clap's double-dash form (`--projectID my-project`).

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Usage line printed when the project ID is missing.
pub const USAGE: &str = "Usage: firewall-list -projectID <projectID> -output <outputFile>";

/// Long flags that may also be spelled with a single dash.
const LONG_FLAGS: &[&str] = &[
    "projectID",
    "output",
    "config",
    "timeout",
    "endpoint",
    "verbose",
    "help",
    "version",
];

/// Export Google Compute Engine firewall rules to CSV
#[derive(Parser, Debug, Clone)]
#[command(name = "firewall-list")]
#[command(version)]
#[command(about = "Export Google Compute Engine firewall rules to CSV", long_about = None)]
#[command(override_usage = "firewall-list -projectID <projectID> [-output <outputFile>] [OPTIONS]")]
pub struct Cli {
    /// GCP project ID
    #[arg(long = "projectID", value_name = "PROJECT_ID", default_value = "")]
    pub project_id: String,

    /// Output file name [default: output.csv]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short = 'c', long, env = "FIREWALL_LIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Compute API base URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse_from(normalize_args(std::env::args()))
    }

    /// Parse from an explicit argument list, accepting single-dash long flags.
    pub fn try_parse_normalized<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Cli::try_parse_from(normalize_args(args))
    }

    /// Get the effective verbosity level (0-2)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(2)
    }

    /// Whether a project ID was given. Any non-empty value counts.
    pub fn has_project(&self) -> bool {
        !self.project_id.is_empty()
    }

    /// Apply flags on top of a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        config.project_id = self.project_id.clone();
        if let Some(ref output) = self.output {
            config.output.path = output.clone();
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_secs = timeout;
        }
        if let Some(ref endpoint) = self.endpoint {
            config.api.endpoint = endpoint.clone();
        }
    }
}

/// Rewrite `-flag` and `-flag=value` into `--flag` / `--flag=value` for known
/// long flags. Everything after a bare `--` is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAGS.contains(&name) {
                        format!("-{}", arg)
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}
