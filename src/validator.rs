//! Currency-code validation against a whitelist seeded from
//! [`crate::currencies`] and refreshed once from upstream data.

use crate::currencies::{DEFAULT_BASE_CURRENCY, DEFAULT_CURRENCIES, DEFAULT_TARGET_CURRENCIES};
use crate::rates::RateService;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Raw target-currency input as supplied by the caller: either already a
/// list, or a single comma-separated string.
#[derive(Debug, Clone)]
pub enum TargetInput {
    List(Vec<String>),
    Csv(String),
}

impl From<&str> for TargetInput {
    fn from(raw: &str) -> Self {
        TargetInput::Csv(raw.to_string())
    }
}

impl From<String> for TargetInput {
    fn from(raw: String) -> Self {
        TargetInput::Csv(raw)
    }
}

impl From<Vec<String>> for TargetInput {
    fn from(raw: Vec<String>) -> Self {
        TargetInput::List(raw)
    }
}

/// Validates and sanitizes user-supplied currency codes.
///
/// Holds the only mutable copy of the whitelist. Sanitization never fails;
/// anything invalid degrades to the configured defaults.
pub struct CurrencyValidator {
    valid_codes: RwLock<HashSet<String>>,
    initialized: AtomicBool,
    default_base: String,
    default_targets: Vec<String>,
}

impl CurrencyValidator {
    pub fn new(default_base: &str, default_targets: Vec<String>) -> Self {
        let seeded = DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect();
        Self {
            valid_codes: RwLock::new(seeded),
            initialized: AtomicBool::new(false),
            default_base: default_base.to_string(),
            default_targets,
        }
    }

    /// Replaces the seeded whitelist with the upstream currency list, once.
    ///
    /// Repeat calls no-op. An upstream failure keeps the seeded defaults and
    /// still counts as initialized; the validator stays usable throughout.
    pub async fn initialize(&self, rates: &RateService) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Currency validator already initialized");
            return;
        }

        match rates.available_currencies().await {
            Ok(codes) => {
                let mut refreshed: HashSet<String> = codes.into_iter().collect();
                refreshed.insert(self.default_base.clone());
                let count = refreshed.len();
                *self.valid_codes.write().unwrap() = refreshed;
                info!("Initialized {} valid currency codes", count);
            }
            Err(e) => {
                let count = self.valid_codes.read().unwrap().len();
                warn!("Currency list refresh failed ({e}), keeping {count} default codes");
            }
        }
    }

    /// True iff `code` is exactly three ASCII uppercase letters and on the
    /// current whitelist.
    pub fn is_valid(&self, code: &str) -> bool {
        code.len() == 3
            && code.bytes().all(|b| b.is_ascii_uppercase())
            && self.valid_codes.read().unwrap().contains(code)
    }

    /// Uppercases and trims `raw`, falling back to the default base currency
    /// when absent or invalid.
    pub fn sanitize_base(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw else {
            return self.default_base.clone();
        };
        let candidate = raw.trim().to_ascii_uppercase();
        if self.is_valid(&candidate) {
            candidate
        } else {
            debug!("Invalid base currency {raw:?}, using {}", self.default_base);
            self.default_base.clone()
        }
    }

    /// Sanitizes a raw target list, keeping valid codes in their original
    /// order (duplicates included). Absent input or an empty result falls
    /// back to the default target list.
    pub fn sanitize_targets(&self, raw: Option<TargetInput>) -> Vec<String> {
        let Some(raw) = raw else {
            return self.default_targets.clone();
        };

        let candidates = match raw {
            TargetInput::List(items) => items,
            TargetInput::Csv(joined) => joined.split(',').map(str::to_string).collect(),
        };

        let valid: Vec<String> = candidates
            .iter()
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| self.is_valid(code))
            .collect();

        if valid.is_empty() {
            debug!("No valid target currencies in {candidates:?}, using defaults");
            self.default_targets.clone()
        } else {
            valid
        }
    }

    /// Current whitelist as a sorted list.
    pub fn valid_currencies(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.valid_codes.read().unwrap().iter().cloned().collect();
        codes.sort_unstable();
        codes
    }
}

impl Default for CurrencyValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_CURRENCY,
            DEFAULT_TARGET_CURRENCIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::tests::{service_with, StubSource};
    use std::sync::Arc;

    fn default_targets() -> Vec<String> {
        DEFAULT_TARGET_CURRENCIES
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_is_valid_requires_three_uppercase_letters() {
        let validator = CurrencyValidator::default();

        assert!(validator.is_valid("USD"));
        assert!(validator.is_valid("EUR"));
        assert!(!validator.is_valid("usd"));
        assert!(!validator.is_valid("US"));
        assert!(!validator.is_valid("USDX"));
        assert!(!validator.is_valid("U1D"));
        assert!(!validator.is_valid(""));
    }

    #[test]
    fn test_is_valid_requires_whitelist_membership() {
        let validator = CurrencyValidator::default();

        // Well-formed but not on the default whitelist
        assert!(!validator.is_valid("ZZZ"));
        assert!(!validator.is_valid("BTC"));
    }

    #[test]
    fn test_sanitize_base() {
        let validator = CurrencyValidator::default();

        assert_eq!(validator.sanitize_base(None), "USD");
        assert_eq!(validator.sanitize_base(Some("eur")), "EUR");
        assert_eq!(validator.sanitize_base(Some("  gbp  ")), "GBP");
        assert_eq!(validator.sanitize_base(Some("ZZZ")), "USD");
        assert_eq!(validator.sanitize_base(Some("nonsense")), "USD");
        assert_eq!(validator.sanitize_base(Some("")), "USD");
    }

    #[test]
    fn test_sanitize_targets_defaults() {
        let validator = CurrencyValidator::default();

        assert_eq!(validator.sanitize_targets(None), default_targets());
        assert_eq!(
            validator.sanitize_targets(Some(TargetInput::List(vec![]))),
            default_targets()
        );
        assert_eq!(
            validator.sanitize_targets(Some(TargetInput::Csv("xx,yy".into()))),
            default_targets()
        );
    }

    #[test]
    fn test_sanitize_targets_csv_drops_invalid_keeps_order() {
        let validator = CurrencyValidator::default();

        assert_eq!(
            validator.sanitize_targets(Some(TargetInput::Csv("eur, gbp, xyz".into()))),
            vec!["EUR".to_string(), "GBP".to_string()]
        );
    }

    #[test]
    fn test_sanitize_targets_list_preserves_duplicates() {
        let validator = CurrencyValidator::default();

        let raw = vec!["jpy".to_string(), "EUR".to_string(), "jpy".to_string()];
        assert_eq!(
            validator.sanitize_targets(Some(TargetInput::List(raw))),
            vec!["JPY".to_string(), "EUR".to_string(), "JPY".to_string()]
        );
    }

    #[tokio::test]
    async fn test_initialize_replaces_whitelist_from_upstream() {
        let source = Arc::new(StubSource::with_rates(&[("EUR", 0.9), ("ZAR", 18.0)]));
        let service = service_with(&source);
        let validator = CurrencyValidator::default();

        validator.initialize(&service).await;

        // Replaced, not merged: upstream codes plus the default base only.
        assert!(validator.is_valid("ZAR"));
        assert!(validator.is_valid("USD"));
        assert!(!validator.is_valid("JPY"));
    }

    #[tokio::test]
    async fn test_initialize_failure_keeps_defaults() {
        let source = Arc::new(StubSource::failing());
        let service = service_with(&source);
        let validator = CurrencyValidator::default();

        validator.initialize(&service).await;

        assert!(validator.is_valid("USD"));
        assert!(validator.is_valid("JPY"));
        assert_eq!(validator.valid_currencies().len(), DEFAULT_CURRENCIES.len());
    }

    #[tokio::test]
    async fn test_initialize_is_one_shot() {
        let source = Arc::new(StubSource::with_rates(&[("EUR", 0.9)]));
        let service = service_with(&source);
        let validator = CurrencyValidator::default();

        validator.initialize(&service).await;
        assert_eq!(source.calls(), 1);

        validator.initialize(&service).await;
        assert_eq!(source.calls(), 1);
    }
}
