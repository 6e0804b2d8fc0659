use thiserror::Error;

/// Failures raised while loading or aggregating a purchase log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("Invalid gender value: {0}")]
    InvalidGender(String),

    #[error("Record set is empty; nothing to aggregate for '{0}'")]
    EmptyRecordSet(&'static str),

    #[error("Group '{group}' has no purchases; cannot compute averages")]
    EmptyGroup { group: String },
}

pub type ReportResult<T> = Result<T, ReportError>;
