//! Exchange-rate retrieval with a caching layer in front of the upstream
//! source.

use crate::cache::TtlCache;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Fixed cache key for the available-currency list.
const CURRENCIES_CACHE_KEY: &str = "available_currencies";

/// Failures talking to the upstream rate source.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to rate source failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rate source returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response from rate source: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failures surfaced by [`RateService`] to its callers.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("failed to fetch exchange rates for {base}")]
    RatesFetchFailed {
        base: String,
        #[source]
        source: UpstreamError,
    },
    #[error("failed to fetch available currencies")]
    CurrenciesFetchFailed {
        #[source]
        source: UpstreamError,
    },
}

/// Full rate table for one base currency at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

/// What the cache holds: either a rate table or the currency-code list.
#[derive(Debug, Clone)]
pub enum CachedPayload {
    Snapshot(RateSnapshot),
    CurrencyList(Vec<String>),
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the current full rate table for `base`.
    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, UpstreamError>;
}

pub type RateCache = TtlCache<String, CachedPayload>;

/// Serves exchange rates out of the cache, going upstream only on a miss.
pub struct RateService {
    source: Arc<dyn RateSource>,
    cache: Arc<RateCache>,
    default_base: String,
}

impl RateService {
    pub fn new(source: Arc<dyn RateSource>, cache: Arc<RateCache>, default_base: &str) -> Self {
        Self {
            source,
            cache,
            default_base: default_base.to_string(),
        }
    }

    fn rates_cache_key(base: &str) -> String {
        format!("rates:{base}")
    }

    /// Returns `(target, rate)` pairs for `base`, in the order requested.
    ///
    /// The whole table for `base` is fetched and cached on a miss; targets
    /// the table does not quote are omitted from the result with a warning,
    /// never an error.
    pub async fn get_rates(
        &self,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<(String, f64)>, RateError> {
        let key = Self::rates_cache_key(base);
        let cached = self.cache.get(&key).await;

        let fetched;
        let snapshot: &RateSnapshot = match cached.as_deref() {
            Some(CachedPayload::Snapshot(snap)) => snap,
            _ => {
                fetched = self.fetch_and_cache_snapshot(base, &key).await?;
                &fetched
            }
        };

        let rates = targets
            .iter()
            .filter_map(|target| match snapshot.rates.get(target) {
                Some(rate) => Some((target.clone(), *rate)),
                None => {
                    warn!(
                        "No rate for target {} in the {} table, omitting it",
                        target, snapshot.base
                    );
                    None
                }
            })
            .collect();
        Ok(rates)
    }

    /// Returns the sorted list of currency codes the upstream source quotes.
    pub async fn available_currencies(&self) -> Result<Vec<String>, RateError> {
        let key = CURRENCIES_CACHE_KEY.to_string();
        if let Some(payload) = self.cache.get(&key).await {
            if let CachedPayload::CurrencyList(codes) = &*payload {
                return Ok(codes.clone());
            }
        }

        let snapshot = self
            .source
            .fetch_latest(&self.default_base)
            .await
            .map_err(|source| {
                error!("Available-currency fetch failed: {source}");
                RateError::CurrenciesFetchFailed { source }
            })?;

        let mut codes: Vec<String> = snapshot.rates.keys().cloned().collect();
        codes.sort_unstable();
        debug!("Fetched {} available currencies", codes.len());

        let payload = Arc::new(CachedPayload::CurrencyList(codes.clone()));
        if let Err(e) = self.cache.set(key, payload).await {
            warn!("Could not cache the currency list: {e}");
        }
        Ok(codes)
    }

    async fn fetch_and_cache_snapshot(
        &self,
        base: &str,
        key: &str,
    ) -> Result<RateSnapshot, RateError> {
        let snapshot = self.source.fetch_latest(base).await.map_err(|source| {
            error!("Rate fetch for {base} failed: {source}");
            RateError::RatesFetchFailed {
                base: base.to_string(),
                source,
            }
        })?;

        let payload = Arc::new(CachedPayload::Snapshot(snapshot.clone()));
        // A rejected write is a cache miss next time around, nothing more.
        if let Err(e) = self.cache.set(key.to_string(), payload).await {
            warn!("Could not cache the {base} rate table: {e}");
        }
        Ok(snapshot)
    }
}
