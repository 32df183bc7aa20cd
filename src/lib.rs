pub mod cache;
pub mod cli;
pub mod config;
pub mod currencies;
pub mod dashboard;
pub mod log;
pub mod providers;
pub mod rates;
pub mod validator;

use crate::providers::exchange_rate_api::ExchangeRateApiSource;
use crate::rates::{RateCache, RateService};
use crate::validator::{CurrencyValidator, TargetInput};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rates {
        base: Option<String>,
        targets: Option<String>,
    },
    Currencies,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Rates dashboard starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Process-wide singletons: one cache, one rate service, one validator.
    let cache = Arc::new(RateCache::new(config.cache.ttl()));
    let _sweeper = cache::spawn_sweeper(&cache, config.cache.sweep_interval());

    let source = ExchangeRateApiSource::new(&config.provider.base_url);
    let service = RateService::new(Arc::new(source), Arc::clone(&cache), &config.base_currency);

    let validator = CurrencyValidator::new(&config.base_currency, config.target_currencies.clone());
    validator.initialize(&service).await;

    match command {
        AppCommand::Rates { base, targets } => {
            cli::rates::run(
                &service,
                &validator,
                base.as_deref(),
                targets.map(TargetInput::from),
            )
            .await
        }
        AppCommand::Currencies => cli::currencies::run(&service).await,
    }
}
