pub mod config;
pub mod models;

use analysis_core::{AnalysisError, CompanyFinancials, FinancialDataProvider};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub use config::YahooConfig;
pub use models::{AnnualStatements, QuoteSummaryResult, TimeseriesResult, YahooError};

use models::{QuoteSummaryResponse, TimeseriesResponse};

/// quoteSummary modules holding the company summary fields.
pub const QUOTE_SUMMARY_MODULES: &str = "price,financialData,defaultKeyStatistics";

/// Start of the statement history window (1985-08-23), as used by Yahoo's own pages.
const TIMESERIES_PERIOD_START: i64 = 493_590_046;

#[derive(Clone)]
pub struct YahooClient {
    config: YahooConfig,
    client: Client,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooClient {
    pub fn new(config: YahooConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(|e| AnalysisError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::new(YahooConfig::from_env()?)
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    /// Return the session crumb, performing the cookie + crumb handshake on
    /// first use.
    async fn crumb(&self) -> Result<String, AnalysisError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie page answers with an error status but still sets the session cookie.
        self.client
            .get(&self.config.cookie_url)
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(format!("cookie handshake: {e}")))?;

        let url = format!("{}/v1/test/getcrumb", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "crumb request failed: HTTP {}",
                response.status()
            )));
        }

        let crumb = response
            .text()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?
            .trim()
            .to_string();
        if crumb.is_empty() {
            return Err(AnalysisError::ApiError("empty crumb returned".to_string()));
        }

        tracing::debug!("Obtained Yahoo crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// Send one GET request and decode its JSON body. A 404 is `NotFound`,
    /// any other non-2xx status is `ApiError`. Not retried.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        mut query: Vec<(&'static str, String)>,
        symbol: &str,
    ) -> Result<T, AnalysisError> {
        if self.config.use_crumb {
            query.push(("crumb", self.crumb().await?));
        }

        tracing::debug!(symbol, url, "Requesting Yahoo Finance");
        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AnalysisError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(symbol, url, %status, "Yahoo Finance request failed");
            return Err(AnalysisError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))
    }

    /// Get the raw quoteSummary result for a symbol
    pub async fn get_quote_summary(&self, symbol: &str) -> Result<QuoteSummaryResult, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.config.base_url, symbol);
        let query = vec![("modules", QUOTE_SUMMARY_MODULES.to_string())];
        let summary: QuoteSummaryResponse = self.get_json(&url, query, symbol).await?;

        if let Some(err) = summary.quote_summary.error {
            return Err(AnalysisError::NotFound(format!("{}: {}", symbol, err.message())));
        }

        summary
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| AnalysisError::NotFound(symbol.to_string()))
    }

    /// Get the annual statement series for a symbol. A symbol without
    /// fundamentals yields an empty list rather than an error.
    pub async fn get_annual_timeseries(
        &self,
        symbol: &str,
    ) -> Result<Vec<TimeseriesResult>, AnalysisError> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.config.base_url, symbol
        );
        let query = vec![
            ("symbol", symbol.to_string()),
            ("type", models::timeseries_types()),
            ("period1", TIMESERIES_PERIOD_START.to_string()),
            ("period2", Utc::now().timestamp().to_string()),
        ];
        let response: TimeseriesResponse = self.get_json(&url, query, symbol).await?;

        if let Some(err) = response.timeseries.error {
            return Err(AnalysisError::ApiError(format!("{}: {}", symbol, err.message())));
        }
        Ok(response.timeseries.result.unwrap_or_default())
    }
}

#[async_trait]
impl FinancialDataProvider for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<CompanyFinancials, AnalysisError> {
        let summary = self.get_quote_summary(symbol).await?.into_summary();
        let series = self.get_annual_timeseries(symbol).await?;
        Ok(AnnualStatements::from_timeseries(&series).into_financials(symbol, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMESERIES_PATH: &str = "/ws/fundamentals-timeseries/v1/finance/timeseries/ACME";

    fn quote_summary_body() -> serde_json::Value {
        json!({
            "quoteSummary": {
                "result": [{
                    "price": { "longName": "Acme Corp", "currency": "USD",
                               "regularMarketPrice": { "raw": 50.0 } },
                    "financialData": { "currentPrice": { "raw": 50.0 },
                                       "profitMargins": { "raw": 0.25 },
                                       "debtToEquity": { "raw": 40.0 } },
                    "defaultKeyStatistics": { "sharesOutstanding": { "raw": 1000.0 } }
                }],
                "error": null
            }
        })
    }

    fn series(kind: &str, points: &[(&str, f64)]) -> serde_json::Value {
        let data: Vec<_> = points
            .iter()
            .map(|(date, value)| json!({ "asOfDate": date, "reportedValue": { "raw": value } }))
            .collect();
        let mut result = json!({ "meta": { "symbol": ["ACME"], "type": [kind] } });
        result[kind] = json!(data);
        result
    }

    fn timeseries_body() -> serde_json::Value {
        json!({
            "timeseries": {
                "result": [
                    series("annualNetIncome", &[("2023-09-30", 180.0), ("2024-09-30", 200.0)]),
                    series("annualCommonStockEquity", &[("2024-09-30", 1000.0)]),
                    series("annualOperatingCashFlow", &[("2023-09-30", 380.0), ("2024-09-30", 400.0)]),
                    series("annualCapitalExpenditure", &[("2023-09-30", -100.0), ("2024-09-30", -100.0)])
                ],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_financials_maps_statements() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ACME"))
            .and(query_param("modules", QUOTE_SUMMARY_MODULES))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote_summary_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TIMESERIES_PATH))
            .and(query_param("type", models::timeseries_types()))
            .and(query_param("period1", "493590046"))
            .respond_with(ResponseTemplate::new(200).set_body_json(timeseries_body()))
            .mount(&server)
            .await;

        let client = YahooClient::new(YahooConfig::for_base_url(server.uri())).unwrap();
        let financials = client.fetch_financials("ACME").await.unwrap();

        assert_eq!(financials.symbol, "ACME");
        assert_eq!(financials.summary.current_price, Some(50.0));
        assert_eq!(financials.summary.shares_outstanding, Some(1000.0));
        assert_eq!(financials.income_statement.latest("Net Income"), Some(200.0));
        assert_eq!(
            financials.balance_sheet.latest_of(&["Total Stockholder Equity", "Common Stock Equity"]),
            Some(1000.0)
        );
        assert_eq!(
            financials.cash_flow.history(models::FREE_CASH_FLOW, 3),
            vec![300.0, 280.0]
        );
    }

    #[tokio::test]
    async fn test_empty_timeseries_gives_empty_statements() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ACME"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote_summary_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TIMESERIES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timeseries": { "result": [], "error": null }
            })))
            .mount(&server)
            .await;

        let client = YahooClient::new(YahooConfig::for_base_url(server.uri())).unwrap();
        let financials = client.fetch_financials("ACME").await.unwrap();
        assert!(financials.income_statement.is_empty());
        assert!(financials.cash_flow.is_empty());
        assert_eq!(financials.summary.profit_margins, Some(0.25));
    }

    #[tokio::test]
    async fn test_crumb_handshake_runs_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cookie"))
            .respond_with(ResponseTemplate::new(404).insert_header("set-cookie", "A3=session; Path=/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/test/getcrumb"))
            .respond_with(ResponseTemplate::new(200).set_body_string("abc123"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ACME"))
            .and(query_param("crumb", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote_summary_body()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TIMESERIES_PATH))
            .and(query_param("crumb", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(timeseries_body()))
            .expect(2)
            .mount(&server)
            .await;

        let config = YahooConfig {
            base_url: server.uri(),
            cookie_url: format!("{}/cookie", server.uri()),
            use_crumb: true,
            ..YahooConfig::default()
        };
        let client = YahooClient::new(config).unwrap();
        client.fetch_financials("ACME").await.unwrap();
        client.fetch_financials("ACME").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/NOPE"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "quoteSummary": { "result": null,
                    "error": { "code": "Not Found", "description": "Quote not found for symbol: NOPE" } }
            })))
            .mount(&server)
            .await;

        let client = YahooClient::new(YahooConfig::for_base_url(server.uri())).unwrap();
        let err = client.fetch_financials("NOPE").await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_error_object_in_body_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/GONE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quoteSummary": { "result": [],
                    "error": { "code": "Not Found", "description": "No fundamentals data found" } }
            })))
            .mount(&server)
            .await;

        let client = YahooClient::new(YahooConfig::for_base_url(server.uri())).unwrap();
        let err = client.fetch_financials("GONE").await.unwrap_err();
        assert!(err.to_string().contains("No fundamentals data found"));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ACME"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = YahooClient::new(YahooConfig::for_base_url(server.uri())).unwrap();
        let err = client.fetch_financials("ACME").await.unwrap_err();
        assert!(matches!(err, AnalysisError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_timeseries_failure_fails_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ACME"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote_summary_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TIMESERIES_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = YahooClient::new(YahooConfig::for_base_url(server.uri())).unwrap();
        let err = client.fetch_financials("ACME").await.unwrap_err();
        assert!(matches!(err, AnalysisError::ApiError(_)));
    }
}
