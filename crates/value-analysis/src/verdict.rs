use serde::Serialize;

use crate::{Profitability, StepError, Valuation};

/// Margin of safety (percent) above which a quality company is undervalued.
pub const UNDERVALUED_MARGIN: f64 = 25.0;
/// Margin of safety (percent) below which the price is considered overvalued.
pub const OVERVALUED_MARGIN: f64 = -10.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Undervalued,
    Overvalued,
    FairlyPriced,
    InsufficientData,
}

impl Verdict {
    /// Combine the profitability and valuation steps. Any failed step makes the
    /// verdict `InsufficientData`; the moat rating never influences it.
    pub fn assemble(
        profitability: &Result<Profitability, StepError>,
        valuation: &Result<Valuation, StepError>,
    ) -> Self {
        match (profitability, valuation) {
            (Ok(p), Ok(v)) => {
                if v.margin_of_safety > UNDERVALUED_MARGIN && p.meets_target() {
                    Verdict::Undervalued
                } else if v.margin_of_safety < OVERVALUED_MARGIN {
                    Verdict::Overvalued
                } else {
                    Verdict::FairlyPriced
                }
            }
            _ => Verdict::InsufficientData,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Verdict::Undervalued => "Undervalued - great opportunity!",
            Verdict::Overvalued => "Overvalued - avoid.",
            Verdict::FairlyPriced => "Fairly priced, needs further evaluation.",
            Verdict::InsufficientData => "Insufficient data for a reliable conclusion.",
        }
    }
}
