//! Value-investing score for a single ticker.
//!
//! Three independent steps run against one fetched [`CompanyFinancials`]
//! snapshot: return on equity, a simplified discounted-cash-flow valuation and
//! an economic-moat rating. Step failures are kept as tagged results and
//! rendered inline, so a broken step never hides the others.

pub mod error;
pub mod moat;
pub mod profitability;
pub mod valuation;
pub mod verdict;

use analysis_core::{AnalysisError, CompanyFinancials, FinancialDataProvider};
use serde_json::json;
use std::fmt;

pub use error::StepError;
pub use moat::{assess_moat, Moat, MoatRating};
pub use profitability::{assess_profitability, Profitability};
pub use valuation::{assess_valuation, GrowthSource, Valuation};
pub use verdict::Verdict;

/// Outcome of all scoring steps for one ticker.
#[derive(Debug, Clone)]
pub struct ValueScore {
    pub symbol: String,
    pub profitability: Result<Profitability, StepError>,
    pub valuation: Result<Valuation, StepError>,
    pub moat: Moat,
    pub verdict: Verdict,
}

impl ValueScore {
    pub fn profitability_comment(&self) -> String {
        match &self.profitability {
            Ok(p) => p.comment(),
            Err(e) => format!("Error calculating ROE: {}.", e),
        }
    }

    pub fn valuation_comment(&self) -> String {
        match &self.valuation {
            Ok(v) => v.comment(),
            Err(e) => format!("Error calculating intrinsic value: {}.", e),
        }
    }

    /// Fixed-layout text report: header, three numbered steps, conclusion.
    pub fn render(&self) -> String {
        format!(
            "{} according to Buffett:\n1. Profitability: {}\n2. Valuation: {}\n3. Economic Moat: {}\nConclusion: {}",
            self.symbol,
            self.profitability_comment(),
            self.valuation_comment(),
            self.moat.comment(),
            self.verdict.to_label()
        )
    }

    /// Structured view of the same result, for hosts that want numbers rather than text.
    pub fn metrics(&self) -> serde_json::Value {
        let mut metrics_map = serde_json::Map::new();
        match &self.profitability {
            Ok(p) => {
                metrics_map.insert("roe".to_string(), json!(p.roe));
            }
            Err(e) => {
                metrics_map.insert("roe_error".to_string(), json!(e.to_string()));
            }
        }
        match &self.valuation {
            Ok(v) => {
                metrics_map.insert("valuation".to_string(), json!(v));
            }
            Err(e) => {
                metrics_map.insert("valuation_error".to_string(), json!(e.to_string()));
            }
        }
        metrics_map.insert("moat".to_string(), json!(self.moat));
        metrics_map.insert("verdict".to_string(), json!(self.verdict));
        json!(metrics_map)
    }
}

impl fmt::Display for ValueScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Run every scoring step against an already fetched snapshot.
pub fn score(financials: &CompanyFinancials) -> ValueScore {
    let profitability = assess_profitability(financials);
    if let Err(e) = &profitability {
        tracing::warn!(symbol = %financials.symbol, error = %e, "ROE step failed");
    }
    let valuation = assess_valuation(financials);
    if let Err(e) = &valuation {
        tracing::warn!(symbol = %financials.symbol, error = %e, "Valuation step failed");
    }
    let moat = assess_moat(&financials.summary);
    let verdict = Verdict::assemble(&profitability, &valuation);

    ValueScore {
        symbol: financials.symbol.clone(),
        profitability,
        valuation,
        moat,
        verdict,
    }
}

/// Fetches a fresh snapshot per call and scores it. Holds no state between calls.
pub struct ValueScorer<P> {
    provider: P,
}

impl<P: FinancialDataProvider> ValueScorer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetch and score. Only the fetch can fail; step failures live in the result.
    pub async fn evaluate(&self, ticker: &str) -> Result<ValueScore, AnalysisError> {
        tracing::info!(
            "Starting value analysis for {} (provider: {})",
            ticker,
            self.provider.name()
        );
        let financials = self.provider.fetch_financials(ticker).await?;
        let result = score(&financials);
        tracing::info!(symbol = %result.symbol, verdict = ?result.verdict, "Value analysis complete");
        Ok(result)
    }

    /// Fetch, score and render the text report.
    pub async fn analyze(&self, ticker: &str) -> Result<String, AnalysisError> {
        self.evaluate(ticker).await.map(|s| s.render())
    }
}
