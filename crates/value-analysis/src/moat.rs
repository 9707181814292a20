use analysis_core::CompanySummary;
use serde::Serialize;

/// Net profit margin (fraction) above which margins count as high.
pub const HIGH_MARGIN: f64 = 0.20;
/// Debt-to-equity (percent, as reported) below which debt counts as low.
pub const LOW_DEBT_TO_EQUITY: f64 = 50.0;
pub const DEFAULT_PROFIT_MARGIN: f64 = 0.0;
/// Deliberately pessimistic so that a missing ratio never reads as low debt.
pub const DEFAULT_DEBT_TO_EQUITY: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoatRating {
    Strong,
    HighMarginsDebtUnclear,
    Weak,
}

impl MoatRating {
    pub fn to_label(&self) -> &'static str {
        match self {
            MoatRating::Strong => "High margins and low debt suggest a strong competitive advantage.",
            MoatRating::HighMarginsDebtUnclear => "High margins, but debt needs evaluation.",
            MoatRating::Weak => "Low margins or high debt, weak moat.",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Moat {
    pub profit_margin: f64,
    pub debt_to_equity: f64,
    pub rating: MoatRating,
}

impl Moat {
    pub fn comment(&self) -> String {
        format!("Moat evaluation: {}", self.rating.to_label())
    }
}

pub fn classify_moat(profit_margin: f64, debt_to_equity: f64) -> MoatRating {
    if profit_margin > HIGH_MARGIN && debt_to_equity < LOW_DEBT_TO_EQUITY {
        MoatRating::Strong
    } else if profit_margin > HIGH_MARGIN {
        MoatRating::HighMarginsDebtUnclear
    } else {
        MoatRating::Weak
    }
}

/// Step C: qualitative moat rating from margins and leverage. Always succeeds.
pub fn assess_moat(summary: &CompanySummary) -> Moat {
    let profit_margin = summary.profit_margins.unwrap_or(DEFAULT_PROFIT_MARGIN);
    let debt_to_equity = summary.debt_to_equity.unwrap_or(DEFAULT_DEBT_TO_EQUITY);
    Moat {
        profit_margin,
        debt_to_equity,
        rating: classify_moat(profit_margin, debt_to_equity),
    }
}
