pub mod cli;
pub mod core;
pub mod local_cache;
pub mod providers;
pub mod service;
pub mod store;

use crate::core::config::{AppConfig, SourceConfig};
use crate::core::source::RateSource;
use crate::local_cache::LocalCache;
use crate::providers::{BucketSource, KoreaEximSource};
use crate::service::RateService;
use crate::store::KeyValueStore;
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Rates,
    Convert {
        keys: String,
        from: Option<String>,
        to: Option<String>,
        offline: bool,
    },
    Currencies,
}

/// Picks the configured rate source. The Korea Exim API wins when both are
/// configured.
pub fn build_source(config: &SourceConfig) -> Result<Arc<dyn RateSource>> {
    if let Some(exim) = &config.korea_exim {
        debug!(base_url = %exim.base_url, "Using Korea Exim rate source");
        return Ok(Arc::new(KoreaEximSource::new(
            &exim.base_url,
            &exim.auth_key,
        )));
    }
    if let Some(bucket) = &config.bucket {
        debug!(url = %bucket.url, "Using bucket rate source");
        return Ok(Arc::new(BucketSource::new(&bucket.url)));
    }
    bail!("No exchange rate source configured")
}

/// Opens the on-disk cache and builds a service on top of it. No fetch is
/// started.
pub async fn open_service(config: &AppConfig) -> Result<Arc<RateService>> {
    let source = build_source(&config.source)?;
    let data_path = config.default_data_path()?;
    debug!("Using data path {}", data_path.display());

    let store = KeyValueStore::open(&data_path)?;
    let cache = LocalCache::from_store(&store, true)?;
    Ok(Arc::new(RateService::new(source, cache).await))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ratepad starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Currencies => cli::currencies::run(),
        AppCommand::Rates => {
            let service = open_service(&config).await?;
            cli::rates::run(&service, &config).await
        }
        AppCommand::Convert {
            keys,
            from,
            to,
            offline,
        } => {
            let service = open_service(&config).await?;
            let request = cli::convert::ConvertRequest {
                keys,
                from: from.unwrap_or_else(|| config.default_from.clone()),
                to: to.unwrap_or_else(|| config.default_to.clone()),
                offline,
            };
            cli::convert::run(&service, &config, &request).await
        }
    }
}
