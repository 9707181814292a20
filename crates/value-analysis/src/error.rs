use thiserror::Error;

/// Failure of a single scoring step.
///
/// Step failures are local: they are rendered in place of the step's text and
/// never abort the other steps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("'{0}' not found in financial statements")]
    MissingField(String),

    #[error("shareholder equity is zero, ROE is undefined")]
    ZeroEquity,

    #[error("Free Cash Flow is non-positive ({0}), invalid for DCF")]
    NonPositiveFreeCashFlow(f64),

    #[error("invalid share count ({0})")]
    InvalidShareCount(f64),

    #[error("Negative intrinsic value (${0:.2}) detected")]
    NegativeIntrinsicValue(f64),

    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}
