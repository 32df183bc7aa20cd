use crate::providers::util::with_retry;
use crate::rates::{RateSnapshot, RateSource, UpstreamError};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

/// HTTP source serving `GET {base_url}/{BASE}` with a JSON body of
/// `{ base, rates, timestamp }`.
pub struct ExchangeRateApiSource {
    base_url: String,
}

impl ExchangeRateApiSource {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateApiSource {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: String,
    rates: HashMap<String, f64>,
    timestamp: i64,
}

#[async_trait]
impl RateSource for ExchangeRateApiSource {
    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, UpstreamError> {
        let url = format!("{}/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("ratedash/0.1")
            .build()?;

        let response = with_retry(|| client.get(&url).send(), RETRIES, RETRY_DELAY_MS).await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)?;

        let fetched_at = Utc
            .timestamp_opt(data.timestamp, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Ok(RateSnapshot {
            base: data.base,
            rates: data.rates,
            fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/{base}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "base": "USD",
            "rates": {"EUR": 0.9123, "GBP": 0.7891, "JPY": 151.2},
            "timestamp": 1700000000
        }"#;

        let mock_server = create_mock_server("USD", mock_response).await;
        let source = ExchangeRateApiSource::new(&mock_server.uri());

        let snapshot = source.fetch_latest("USD").await.unwrap();
        assert_eq!(snapshot.base, "USD");
        assert_eq!(snapshot.rates.len(), 3);
        assert_eq!(snapshot.rates.get("EUR"), Some(&0.9123));
        assert_eq!(snapshot.fetched_at.timestamp(), 1700000000);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/USD"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let source = ExchangeRateApiSource::new(&mock_server.uri());
        let err = source.fetch_latest("USD").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status(status) if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_malformed_response_body() {
        let mock_server = create_mock_server("USD", "not json at all").await;
        let source = ExchangeRateApiSource::new(&mock_server.uri());

        let err = source.fetch_latest("USD").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_response_missing_rates_field() {
        let mock_server =
            create_mock_server("USD", r#"{"base": "USD", "timestamp": 1700000000}"#).await;
        let source = ExchangeRateApiSource::new(&mock_server.uri());

        let err = source.fetch_latest("USD").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unparseable_timestamp_falls_back_to_now() {
        let mock_response = r#"{
            "base": "USD",
            "rates": {"EUR": 0.9},
            "timestamp": 99999999999999999
        }"#;

        let mock_server = create_mock_server("USD", mock_response).await;
        let source = ExchangeRateApiSource::new(&mock_server.uri());

        let snapshot = source.fetch_latest("USD").await.unwrap();
        let age = Utc::now() - snapshot.fetched_at;
        assert!(age.num_seconds().abs() < 60);
    }
}
