//! Error types for window-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Invalid granularity: {0}")]
    InvalidGranularity(String),

    #[error("Invalid window spec: {0}")]
    InvalidWindowSpec(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid job: {0}")]
    InvalidJob(String),
}

pub type Result<T> = std::result::Result<T, WindowError>;
