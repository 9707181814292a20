use analysis_core::{CompanyFinancials, CompanySummary, StatementTable};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FREE_CASH_FLOW: &str = "Free Cash Flow";

/// Prefix of annual series in the fundamentals-timeseries API.
pub const ANNUAL_PREFIX: &str = "annual";

/// Timeseries line items making up each statement.
pub const INCOME_STATEMENT_ITEMS: &[&str] = &["NetIncome", "NetIncomeCommonStockholders"];
pub const BALANCE_SHEET_ITEMS: &[&str] = &["StockholdersEquity", "CommonStockEquity"];
pub const CASH_FLOW_ITEMS: &[&str] = &["FreeCashFlow", "OperatingCashFlow", "CapitalExpenditure"];

const OPERATING_CASH_FLOW_ROWS: &[&str] = &["Operating Cash Flow"];
const CAPEX_ROWS: &[&str] = &["Capital Expenditure"];

/// Comma-separated `type` query value covering every statement line item.
pub fn timeseries_types() -> String {
    INCOME_STATEMENT_ITEMS
        .iter()
        .chain(BALANCE_SHEET_ITEMS)
        .chain(CASH_FLOW_ITEMS)
        .map(|item| format!("{ANNUAL_PREFIX}{item}"))
        .collect::<Vec<_>>()
        .join(",")
}

// API response types
#[derive(Debug, Deserialize)]
pub(crate) struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteSummaryEnvelope {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeseriesResponse {
    pub timeseries: TimeseriesEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeseriesEnvelope {
    #[serde(default)]
    pub result: Option<Vec<TimeseriesResult>>,
    #[serde(default)]
    pub error: Option<YahooError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YahooError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl YahooError {
    pub fn message(self) -> String {
        self.description
            .or(self.code)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// `{ "raw": 1.0, "fmt": "1.00" }` value cell. Missing values arrive as `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawValue {
    #[serde(default)]
    pub raw: Option<f64>,
}

fn raw(cell: &Option<RawValue>) -> Option<f64> {
    cell.as_ref().and_then(|c| c.raw).filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default, rename = "financialData")]
    pub financial_data: Option<FinancialDataModule>,
    #[serde(default, rename = "defaultKeyStatistics")]
    pub key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    pub current_price: Option<RawValue>,
    pub profit_margins: Option<RawValue>,
    pub debt_to_equity: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatisticsModule {
    pub shares_outstanding: Option<RawValue>,
    pub implied_shares_outstanding: Option<RawValue>,
}

impl QuoteSummaryResult {
    pub fn into_summary(self) -> CompanySummary {
        let price = self.price.unwrap_or_default();
        let financial_data = self.financial_data.unwrap_or_default();
        let key_stats = self.key_statistics.unwrap_or_default();

        CompanySummary {
            long_name: price.long_name.or(price.short_name),
            currency: price.currency,
            current_price: raw(&financial_data.current_price)
                .or_else(|| raw(&price.regular_market_price)),
            shares_outstanding: raw(&key_stats.shares_outstanding)
                .or_else(|| raw(&key_stats.implied_shares_outstanding)),
            profit_margins: raw(&financial_data.profit_margins),
            debt_to_equity: raw(&financial_data.debt_to_equity),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeseriesMeta {
    #[serde(default, rename = "type")]
    pub kind: Vec<String>,
}

/// One series of the timeseries response. The data sits under a key equal
/// to the series type, e.g. `"annualNetIncome": [...]`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesResult {
    #[serde(default)]
    pub meta: TimeseriesMeta,
    #[serde(flatten)]
    pub series: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPoint {
    pub as_of_date: NaiveDate,
    #[serde(default)]
    pub reported_value: Option<RawValue>,
}

impl TimeseriesResult {
    /// Line item name (without the period prefix) and its dated values.
    /// `None` for non-annual series or series without data.
    pub fn annual_points(&self) -> Option<(&str, Vec<(NaiveDate, Option<f64>)>)> {
        let kind = self.meta.kind.first()?;
        let line_item = kind.strip_prefix(ANNUAL_PREFIX)?;
        let points: Vec<Option<TimeseriesPoint>> =
            serde_json::from_value(self.series.get(kind)?.clone()).ok()?;
        let points = points
            .into_iter()
            .flatten()
            .map(|p| (p.as_of_date, raw(&p.reported_value)))
            .collect();
        Some((line_item, points))
    }
}

/// Convert a PascalCase or camelCase key into a Title Case line-item name
/// (`StockholdersEquity` -> `Stockholders Equity`).
pub fn display_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Build a statement from the series whose line item is listed in
/// `line_items`. Periods are the union of all reported dates, most recent
/// first; a series without a value for a period gets an empty cell.
pub fn statement_table(results: &[TimeseriesResult], line_items: &[&str]) -> StatementTable {
    let series: Vec<_> = results
        .iter()
        .filter_map(TimeseriesResult::annual_points)
        .filter(|(item, _)| line_items.contains(item))
        .collect();

    let mut periods: Vec<NaiveDate> = series
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(date, _)| *date))
        .collect();
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();

    let mut table = StatementTable::with_periods(periods.clone());
    for (item, points) in series {
        let values = periods
            .iter()
            .map(|period| {
                points
                    .iter()
                    .find(|(date, _)| date == period)
                    .and_then(|(_, value)| *value)
            })
            .collect();
        table.insert(display_name(item), values);
    }
    table
}

/// Add a derived "Free Cash Flow" row (operating cash flow + capital
/// expenditure, capex being reported negative) when the provider omits it.
pub fn derive_free_cash_flow(table: &mut StatementTable) {
    if table.contains(FREE_CASH_FLOW) {
        return;
    }
    let operating = OPERATING_CASH_FLOW_ROWS.iter().find_map(|name| table.row(name));
    let capex = CAPEX_ROWS.iter().find_map(|name| table.row(name));

    if let (Some(operating), Some(capex)) = (operating, capex) {
        let fcf: Vec<Option<f64>> = operating
            .iter()
            .zip(capex.iter())
            .map(|(ocf, cx)| match (ocf, cx) {
                (Some(o), Some(c)) => Some(o + c),
                _ => None,
            })
            .collect();
        table.insert(FREE_CASH_FLOW, fcf);
    }
}

/// Income statement, balance sheet and cash-flow statement built from one
/// timeseries response.
#[derive(Debug, Clone, Default)]
pub struct AnnualStatements {
    pub income_statement: StatementTable,
    pub balance_sheet: StatementTable,
    pub cash_flow: StatementTable,
}

impl AnnualStatements {
    pub fn from_timeseries(results: &[TimeseriesResult]) -> Self {
        let mut cash_flow = statement_table(results, CASH_FLOW_ITEMS);
        derive_free_cash_flow(&mut cash_flow);
        Self {
            income_statement: statement_table(results, INCOME_STATEMENT_ITEMS),
            balance_sheet: statement_table(results, BALANCE_SHEET_ITEMS),
            cash_flow,
        }
    }

    pub fn into_financials(self, symbol: &str, summary: CompanySummary) -> CompanyFinancials {
        CompanyFinancials {
            symbol: symbol.to_string(),
            summary,
            income_statement: self.income_statement,
            balance_sheet: self.balance_sheet,
            cash_flow: self.cash_flow,
            fetched_at: Utc::now(),
        }
    }
}
