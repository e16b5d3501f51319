//! Rent roll CLI
//!
//! Loads a ledger and configuration from disk, runs one engine command and
//! renders the result.

pub mod commands;
pub mod loader;
pub mod reporter;

pub use commands::{Outcome, Runner};
pub use reporter::{OutputFormat, Report, Reporter};
