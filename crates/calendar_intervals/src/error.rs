#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Invalid interval input: {0}")]
    InvalidInput(String),
    #[error(
        "Unrecognized interval unit '{0}', expected one of: second, minute, hour, day, week, month, quarter, year"
    )]
    InvalidUnit(String),
}

pub type IntervalResult<T> = Result<T, IntervalError>;

/// What a visitor callback returns: `Ok(true)` asks for the visited interval
/// to be subdivided, and an `Err` is logged and skipped by the traversal.
pub type VisitResult = anyhow::Result<bool>;
