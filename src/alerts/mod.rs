//! Threshold alerting over a log-search count
//!
//! Builds a count query from a [`CheckerConfig`], asks the backend once,
//! and reduces the answer to an [`AlertSignal`].

pub mod checker;
pub mod config;
pub mod signal;

pub use checker::{evaluate, ThresholdChecker};
pub use config::{CheckerConfig, RequestMethod};
pub use signal::AlertSignal;
