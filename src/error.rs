//! Error kinds surfaced by the engine.

use thiserror::Error;

/// Tagged error kinds. See the design notes for recovery policy: `BadInput`
/// and `FileFormat` propagate to the caller; `InvariantViolation` indicates
/// a programming bug and is reported, not recovered from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenzeneError {
    #[error("invariant violation in {operation}: {detail}")]
    InvariantViolation { operation: &'static str, detail: String },

    #[error("bad input: {0}")]
    BadInput(String),

    #[error("file format error at {path}: {detail}")]
    FileFormat { path: String, detail: String },

    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
}

impl BenzeneError {
    pub fn invariant(operation: &'static str, detail: impl Into<String>) -> Self {
        let err = BenzeneError::InvariantViolation {
            operation,
            detail: detail.into(),
        };
        debug_assert!(false, "{err}");
        err
    }

    pub fn bad_input(detail: impl Into<String>) -> Self {
        BenzeneError::BadInput(detail.into())
    }

    pub fn file_format(path: impl Into<String>, detail: impl Into<String>) -> Self {
        BenzeneError::FileFormat { path: path.into(), detail: detail.into() }
    }

    pub fn resource_limit(detail: impl Into<String>) -> Self {
        BenzeneError::ResourceLimit(detail.into())
    }
}

pub type Result<T> = std::result::Result<T, BenzeneError>;
