use chrono::NaiveDate;
use ledger_types::LedgerError;
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid interval: {from} must be before {to}")]
    InvalidInterval { from: NaiveDate, to: NaiveDate },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
