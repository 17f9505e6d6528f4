//! Countwatch: log-count threshold alert
//!
//! Asks an Elasticsearch-compatible backend how many log lines containing a
//! phrase arrived within a recent time window, and reports `1` when that
//! count reaches a threshold, `0` otherwise.
//!
//! # Example
//!
//! ```no_run
//! use countwatch::alerts::{CheckerConfig, ThresholdChecker};
//!
//! # async fn demo() -> Result<(), countwatch::CheckError> {
//! let config = CheckerConfig::new("http://localhost:9200", "test", "Handbill not printed", "3h", 3);
//! let checker = ThresholdChecker::new(config);
//!
//! let signal = checker.run(&mut std::io::stdout()).await?;
//! # let _ = signal;
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod error;
pub mod query;
pub mod search;

// Re-export commonly used types
pub use alerts::{AlertSignal, CheckerConfig, ThresholdChecker};
pub use error::CheckError;
