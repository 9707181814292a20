use analysis_core::growth::mean_growth_ratio;
use analysis_core::CompanyFinancials;
use serde::Serialize;

use crate::StepError;

pub const FREE_CASH_FLOW_ROW: &str = "Free Cash Flow";
pub const DISCOUNT_RATE: f64 = 0.09;
pub const GROWTH_FLOOR: f64 = 0.03;
pub const GROWTH_CAP: f64 = 0.07;
/// Used when fewer than two periods of free-cash-flow history are available.
pub const DEFAULT_GROWTH_RATE: f64 = 0.07;
pub const FORECAST_YEARS: i32 = 10;
/// Number of most recent periods considered for the growth estimate.
pub const HISTORY_PERIODS: usize = 3;
/// Applied when the provider reports no share count. Yields per-share values
/// equal to the whole-company value, which is almost always wrong.
pub const DEFAULT_SHARES_OUTSTANDING: f64 = 1.0;
/// Intrinsic value above this multiple of the market price is flagged as suspicious.
pub const HIGH_VALUE_MULTIPLE: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GrowthSource {
    /// Mean growth ratio of the most recent periods, before clamping.
    History { periods: usize, raw_ratio: f64 },
    Default,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Valuation {
    pub free_cash_flow: f64,
    pub growth_rate: f64,
    pub growth_source: GrowthSource,
    pub discount_rate: f64,
    pub intrinsic_value: f64,
    pub intrinsic_per_share: f64,
    pub shares_outstanding: f64,
    pub shares_defaulted: bool,
    pub current_price: f64,
    /// Percent gap between intrinsic value and price, relative to intrinsic value.
    pub margin_of_safety: f64,
    pub high_value_warning: bool,
}

impl Valuation {
    pub fn comment(&self) -> String {
        format!(
            "Intrinsic value: ${:.2}/share (estimated growth: {:.1}%). Current price: ${:.2}. Margin: {:.2}%.",
            self.intrinsic_per_share,
            self.growth_rate * 100.0,
            self.current_price,
            self.margin_of_safety
        )
    }
}

/// Growth estimate from a most-recent-first free-cash-flow history: the mean
/// period-over-period growth ratio, clamped to `[GROWTH_FLOOR, GROWTH_CAP]`
/// whatever its source. A ratio near 1.0 therefore lands on the cap.
pub fn estimate_growth_rate(history: &[f64]) -> (f64, GrowthSource) {
    let (rate, source) = match mean_growth_ratio(history) {
        Some(raw_ratio) => (
            raw_ratio,
            GrowthSource::History {
                periods: history.len(),
                raw_ratio,
            },
        ),
        None => (DEFAULT_GROWTH_RATE, GrowthSource::Default),
    };
    (rate.clamp(GROWTH_FLOOR, GROWTH_CAP), source)
}

/// Ten-year discounted cash flow plus a perpetuity-growth terminal value
/// discounted from the final forecast year.
pub fn discounted_cash_flow(free_cash_flow: f64, growth_rate: f64, discount_rate: f64) -> f64 {
    let projected: f64 = (1..=FORECAST_YEARS)
        .map(|year| {
            free_cash_flow * (1.0 + growth_rate).powi(year) / (1.0 + discount_rate).powi(year)
        })
        .sum();
    let terminal_value = free_cash_flow * (1.0 + growth_rate).powi(FORECAST_YEARS)
        / (discount_rate - growth_rate);
    projected + terminal_value / (1.0 + discount_rate).powi(FORECAST_YEARS)
}

/// Step B: simplified DCF intrinsic value per share and margin of safety.
pub fn assess_valuation(financials: &CompanyFinancials) -> Result<Valuation, StepError> {
    let symbol = financials.symbol.as_str();
    let free_cash_flow = financials.cash_flow.latest(FREE_CASH_FLOW_ROW).unwrap_or(0.0);
    if free_cash_flow <= 0.0 {
        return Err(StepError::NonPositiveFreeCashFlow(free_cash_flow));
    }

    let history = financials.cash_flow.history(FREE_CASH_FLOW_ROW, HISTORY_PERIODS);
    let (growth_rate, growth_source) = estimate_growth_rate(&history);
    let discount_rate = DISCOUNT_RATE;

    tracing::debug!(
        symbol,
        free_cash_flow,
        growth_rate,
        discount_rate,
        "DCF inputs"
    );

    let intrinsic_value = discounted_cash_flow(free_cash_flow, growth_rate, discount_rate);

    let (shares_outstanding, shares_defaulted) = match financials.summary.shares_outstanding {
        Some(shares) => (shares, false),
        None => {
            tracing::warn!(
                symbol,
                "Shares outstanding missing, defaulting to {}",
                DEFAULT_SHARES_OUTSTANDING
            );
            (DEFAULT_SHARES_OUTSTANDING, true)
        }
    };
    if shares_outstanding == 0.0 {
        return Err(StepError::InvalidShareCount(shares_outstanding));
    }

    let intrinsic_per_share = intrinsic_value / shares_outstanding;
    if !intrinsic_per_share.is_finite() {
        return Err(StepError::NonFinite("intrinsic value"));
    }
    let current_price = financials.summary.current_price.unwrap_or(0.0);

    if intrinsic_per_share < 0.0 {
        return Err(StepError::NegativeIntrinsicValue(intrinsic_per_share));
    }
    let high_value_warning = intrinsic_per_share > current_price * HIGH_VALUE_MULTIPLE;
    if high_value_warning {
        tracing::warn!(
            symbol,
            "Intrinsic value (${:.2}) seems unusually high against price ${:.2}",
            intrinsic_per_share,
            current_price
        );
    }

    let margin_of_safety = (intrinsic_per_share - current_price) / intrinsic_per_share * 100.0;
    if !margin_of_safety.is_finite() {
        return Err(StepError::NonFinite("margin of safety"));
    }

    Ok(Valuation {
        free_cash_flow,
        growth_rate,
        growth_source,
        discount_rate,
        intrinsic_value,
        intrinsic_per_share,
        shares_outstanding,
        shares_defaulted,
        current_price,
        margin_of_safety,
        high_value_warning,
    })
}
