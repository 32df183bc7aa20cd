use anyhow::Result;
use clap::{Parser, Subcommand};
use ratedash::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display exchange rates for a base currency (default command)
    Rates {
        /// Base currency code, e.g. USD
        #[arg(short, long)]
        base: Option<String>,
        /// Comma-separated target currency codes, e.g. EUR,GBP,JPY
        #[arg(short, long)]
        targets: Option<String>,
    },
    /// List the currencies the rate source quotes
    Currencies,
}

impl From<Commands> for ratedash::AppCommand {
    fn from(cmd: Commands) -> ratedash::AppCommand {
        match cmd {
            Commands::Rates { base, targets } => ratedash::AppCommand::Rates { base, targets },
            Commands::Currencies => ratedash::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => ratedash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            ratedash::run_command(
                ratedash::AppCommand::Rates {
                    base: None,
                    targets: None,
                },
                cli.config_path.as_deref(),
            )
            .await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = ratedash::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
provider:
  base_url: "https://api.exchangerate-api.com/v4/latest"

base_currency: "USD"
target_currencies: ["EUR", "GBP", "JPY", "CAD", "AUD"]

cache:
  ttl_secs: 900
  sweep_secs: 60
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
