use async_trait::async_trait;
use crate::{AnalysisError, CompanyFinancials};

/// Trait for market-data sources that can produce a per-ticker financial snapshot.
///
/// Implementations fetch fresh data on every call; nothing is cached between calls.
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    /// Short provider identifier used in logs.
    fn name(&self) -> &str;

    async fn fetch_financials(&self, symbol: &str) -> Result<CompanyFinancials, AnalysisError>;
}

#[async_trait]
impl<P: FinancialDataProvider + ?Sized> FinancialDataProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<CompanyFinancials, AnalysisError> {
        (**self).fetch_financials(symbol).await
    }
}
