use analysis_core::CompanyFinancials;
use serde::Serialize;

use crate::StepError;

/// ROE above this percentage meets the value-investing target (strictly greater).
pub const ROE_TARGET: f64 = 15.0;

/// Net income line items in order of preference.
pub const NET_INCOME_ROWS: &[&str] = &["Net Income", "Net Income Common Stockholders"];
/// Shareholder equity line items in order of preference.
pub const EQUITY_ROWS: &[&str] = &["Total Stockholder Equity", "Common Stock Equity"];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Profitability {
    pub net_income: f64,
    pub equity: f64,
    /// Return on equity in percent.
    pub roe: f64,
}

impl Profitability {
    pub fn meets_target(&self) -> bool {
        self.roe > ROE_TARGET
    }

    pub fn comment(&self) -> String {
        let label = if self.meets_target() {
            "solid, aligns with target."
        } else {
            "low, below target."
        };
        format!("ROE: {:.2}% - {}", self.roe, label)
    }
}

fn calculate_roe(net_income: f64, equity: f64) -> Result<f64, StepError> {
    if equity == 0.0 {
        return Err(StepError::ZeroEquity);
    }
    let roe = (net_income / equity) * 100.0;
    if roe.is_finite() {
        Ok(roe)
    } else {
        Err(StepError::NonFinite("ROE"))
    }
}

/// Step A: return on equity from the latest income statement and balance sheet.
pub fn assess_profitability(financials: &CompanyFinancials) -> Result<Profitability, StepError> {
    let net_income = financials
        .income_statement
        .latest_of(NET_INCOME_ROWS)
        .ok_or_else(|| StepError::MissingField(NET_INCOME_ROWS[0].to_string()))?;
    let equity = financials
        .balance_sheet
        .latest_of(EQUITY_ROWS)
        .ok_or_else(|| StepError::MissingField(EQUITY_ROWS[0].to_string()))?;

    let roe = calculate_roe(net_income, equity)?;
    Ok(Profitability {
        net_income,
        equity,
        roe,
    })
}
