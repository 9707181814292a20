use analysis_core::FinancialDataProvider;
use std::sync::Arc;
use value_analysis::ValueScorer;

use crate::{ToolError, ToolRegistry};

pub const BUFFETT_TOOL_NAME: &str = "buffett_analysis";
pub const BUFFETT_TOOL_DESCRIPTION: &str = "Analyzes a publicly traded company using Warren Buffett's value investing principles. Input: ticker symbol (e.g., AAPL).";

/// Expose `scorer` to the host as the `buffett_analysis` tool.
pub fn register_buffett_analysis<P>(
    registry: &mut ToolRegistry,
    scorer: Arc<ValueScorer<P>>,
) -> Result<(), ToolError>
where
    P: FinancialDataProvider + 'static,
{
    registry.register_fn(BUFFETT_TOOL_NAME, BUFFETT_TOOL_DESCRIPTION, move |ticker| {
        let scorer = scorer.clone();
        async move { scorer.analyze(&ticker).await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{AnalysisError, CompanyFinancials, StatementTable};
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedProvider;

    #[async_trait]
    impl FinancialDataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_financials(&self, symbol: &str) -> Result<CompanyFinancials, AnalysisError> {
            if symbol == "DOWN" {
                return Err(AnalysisError::ApiError("connection refused".to_string()));
            }
            let mut f = CompanyFinancials::new(symbol);
            f.income_statement = StatementTable::new().with_row("Net Income", &[200.0]);
            f.balance_sheet = StatementTable::new().with_row("Total Stockholder Equity", &[1000.0]);
            f.summary.profit_margins = Some(0.10);
            Ok(f)
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_buffett_analysis(&mut registry, Arc::new(ValueScorer::new(FixedProvider))).unwrap();
        registry
    }

    #[test]
    fn test_spec() {
        let specs = registry().specs();
        assert_eq!(specs[0].name, "buffett_analysis");
        assert!(specs[0].description.contains("value investing"));
    }

    #[tokio::test]
    async fn test_partial_analysis_is_success() {
        let result = registry()
            .invoke(BUFFETT_TOOL_NAME, json!({"ticker": "AAPL"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("AAPL according to Buffett:"));
        assert!(result.output.contains("Error calculating intrinsic value"));
        assert!(result.output.contains("weak moat"));
        assert!(result
            .output
            .ends_with("Insufficient data for a reliable conclusion."));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_runtime_error() {
        let err = registry()
            .invoke(BUFFETT_TOOL_NAME, json!("DOWN"))
            .await
            .unwrap_err();
        match err {
            ToolError::Execution { tool, source } => {
                assert_eq!(tool, BUFFETT_TOOL_NAME);
                assert!(matches!(source, AnalysisError::ApiError(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
