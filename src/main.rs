//! firewall-list - export GCP firewall rules to CSV
//!
//! This is the main entry point for the firewall-list CLI. It is the single
//! place where errors turn into exit codes.

use firewall_list::cli::{Cli, USAGE};
use firewall_list::compute::GoogleCompute;
use firewall_list::config::Config;
use firewall_list::exporter::RuleExporter;
use firewall_list::{Error, Result, VERSION};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(Error::Usage(_)) => {
            println!("{}", USAGE);
            1
        }
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<()> {
    // Checked before configuration or credentials are touched
    if !cli.has_project() {
        return Err(Error::usage("missing -projectID"));
    }

    debug!("firewall-list v{}", VERSION);

    let mut config = Config::load(cli.config.as_ref())?;
    cli.apply(&mut config);
    config.validate()?;

    let provider = GoogleCompute::from_config(&config)?;
    RuleExporter::new(provider).run(&config).await?;
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "firewall_list=info,warn",
        1 => "firewall_list=debug,info",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 2),
        )
        .with(env_filter)
        .init();
}
