use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A financial statement keyed by line-item name.
///
/// Every row holds one value per reporting period, most recent period first.
/// A `None` cell means the provider reported the line item but had no value
/// for that period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementTable {
    /// Period end dates, most recent first. May be shorter than a row when the
    /// provider omits dates.
    #[serde(default)]
    pub periods: Vec<NaiveDate>,
    rows: HashMap<String, Vec<Option<f64>>>,
}

impl StatementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_periods(periods: Vec<NaiveDate>) -> Self {
        Self {
            periods,
            rows: HashMap::new(),
        }
    }

    /// Insert (or replace) a line item.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.rows.insert(name.into(), values);
    }

    /// Builder-style variant of [`insert`](Self::insert) for fully populated rows.
    pub fn with_row(mut self, name: &str, values: &[f64]) -> Self {
        self.insert(name, values.iter().copied().map(Some).collect());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }

    pub fn row(&self, name: &str) -> Option<&[Option<f64>]> {
        self.rows.get(name).map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent value of a line item. `None` when the row is absent or its
    /// latest cell is empty or non-finite.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.rows
            .get(name)
            .and_then(|values| values.first().copied().flatten())
            .filter(|v| v.is_finite())
    }

    /// Latest value of the first listed line item that is present in the table.
    ///
    /// Presence is decided by the row name, not by the cell: if the preferred
    /// row exists but its latest cell is empty, the result is `None` rather
    /// than a fallback row's value.
    pub fn latest_of(&self, names: &[&str]) -> Option<f64> {
        names
            .iter()
            .find(|name| self.contains(name))
            .and_then(|name| self.latest(name))
    }

    /// Up to `periods` non-missing values of a line item, most recent first.
    pub fn history(&self, name: &str, periods: usize) -> Vec<f64> {
        self.rows
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .take(periods)
                    .filter_map(|v| *v)
                    .filter(|v| v.is_finite())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Company-level summary fields (quote and key statistics).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySummary {
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub current_price: Option<f64>,
    pub shares_outstanding: Option<f64>,
    /// Trailing net profit margin as a fraction (0.25 = 25%).
    pub profit_margins: Option<f64>,
    /// Debt-to-equity expressed in percent, as reported by the provider (40.0 = 0.4x).
    pub debt_to_equity: Option<f64>,
}

/// Per-ticker snapshot used by a single scoring call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFinancials {
    pub symbol: String,
    pub summary: CompanySummary,
    pub income_statement: StatementTable,
    pub balance_sheet: StatementTable,
    pub cash_flow: StatementTable,
    pub fetched_at: DateTime<Utc>,
}

impl CompanyFinancials {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            summary: CompanySummary::default(),
            income_statement: StatementTable::new(),
            balance_sheet: StatementTable::new(),
            cash_flow: StatementTable::new(),
            fetched_at: Utc::now(),
        }
    }
}
