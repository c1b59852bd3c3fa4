use thiserror::Error;

/// Why a `"<lat>,<lng>"` string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateParseError {
    #[error("expected exactly two comma-separated values, found {found}")]
    WrongTokenCount { found: usize },
    #[error("'{token}' is not a finite number")]
    InvalidNumber { token: String },
}
