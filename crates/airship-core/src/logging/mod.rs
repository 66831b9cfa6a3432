//! Logging setup.
//!
//! The engine logs through the `log` facade. Severity maps from the classic
//! five-level scheme as follows: debug, info, alert (`warn!`), error, and
//! mayday (`error!` followed by process exit at the call site).

mod init;

pub use init::{init_logging, LoggingConfig};
