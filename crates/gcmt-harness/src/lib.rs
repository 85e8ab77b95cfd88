//! # gcmt-harness
//!
//! Runs the threading scenarios against the compiled back-end and records
//! each result as a JSONL [`structured_log::LogEntry`].

pub mod scenarios;
pub mod structured_log;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Gcmt(#[from] gcmt::GcmtError),
    #[error("{scenario}: {message}")]
    Check {
        scenario: &'static str,
        message: String,
    },
}

pub type HarnessResult<T> = Result<T, HarnessError>;
