//! Assembles the structured rates view handed to the presentation layer.

use crate::rates::{RateError, RateService};
use crate::validator::{CurrencyValidator, TargetInput};
use tracing::debug;

/// Everything the presentation layer needs to render one rates view:
/// the sanitized inputs actually used, the (possibly partial) rate pairs
/// in requested order, and the full available-currency list.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub base: String,
    pub targets: Vec<String>,
    pub rates: Vec<(String, f64)>,
    pub available: Vec<String>,
}

impl Dashboard {
    pub async fn build(
        rates: &RateService,
        validator: &CurrencyValidator,
        raw_base: Option<&str>,
        raw_targets: Option<TargetInput>,
    ) -> Result<Dashboard, RateError> {
        let base = validator.sanitize_base(raw_base);
        let targets = validator.sanitize_targets(raw_targets);
        debug!("Building dashboard for {} -> {:?}", base, targets);

        let (rate_pairs, available) = futures::join!(
            rates.get_rates(&base, &targets),
            rates.available_currencies()
        );

        Ok(Dashboard {
            base,
            targets,
            rates: rate_pairs?,
            available: available?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::tests::{service_with, StubSource};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_build_sanitizes_inputs_and_filters_rates() {
        let source = Arc::new(StubSource::with_rates(&[("EUR", 0.9), ("GBP", 0.8)]));
        let service = service_with(&source);
        let validator = CurrencyValidator::default();

        let dashboard = Dashboard::build(
            &service,
            &validator,
            Some("usd "),
            Some(TargetInput::Csv("eur, gbp, xyz".into())),
        )
        .await
        .unwrap();

        assert_eq!(dashboard.base, "USD");
        assert_eq!(dashboard.targets, vec!["EUR".to_string(), "GBP".to_string()]);
        assert_eq!(
            dashboard.rates,
            vec![("EUR".to_string(), 0.9), ("GBP".to_string(), 0.8)]
        );
        assert_eq!(dashboard.available, vec!["EUR".to_string(), "GBP".to_string()]);
    }

    #[tokio::test]
    async fn test_build_falls_back_to_defaults_on_bad_inputs() {
        let source = Arc::new(StubSource::with_rates(&[("EUR", 0.9), ("JPY", 150.0)]));
        let service = service_with(&source);
        let validator = CurrencyValidator::default();

        let dashboard = Dashboard::build(
            &service,
            &validator,
            Some("not-a-code"),
            Some(TargetInput::Csv("??".into())),
        )
        .await
        .unwrap();

        assert_eq!(dashboard.base, "USD");
        // Default targets, filtered down to what the table quotes.
        assert_eq!(
            dashboard.targets,
            vec!["EUR", "GBP", "JPY", "CAD", "AUD"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(
            dashboard.rates,
            vec![("EUR".to_string(), 0.9), ("JPY".to_string(), 150.0)]
        );
    }

    #[tokio::test]
    async fn test_build_fails_when_upstream_is_down() {
        let source = Arc::new(StubSource::failing());
        let service = service_with(&source);
        let validator = CurrencyValidator::default();

        let result = Dashboard::build(&service, &validator, None, None).await;
        assert!(result.is_err());
    }
}
