//! Countwatch
//!
//! Run with: cargo run
//!
//! Prints `1` if at least COUNTWATCH_THRESHOLD log lines containing
//! COUNTWATCH_PHRASE arrived in the last COUNTWATCH_WINDOW, `0` otherwise.
//! Nothing is printed and the exit code is 254 if the check fails.
//!
//! Environment variables:
//! - COUNTWATCH_URL: Backend base URL (default: http://localhost:9200)
//! - COUNTWATCH_INDEX: Index to search (default: test)
//! - COUNTWATCH_PHRASE: Phrase to look for (default: Handbill not printed)
//! - COUNTWATCH_WINDOW: Time window, e.g. 15m, 3h, 1d (default: 3h)
//! - COUNTWATCH_THRESHOLD: Alert threshold (default: 3)
//! - COUNTWATCH_METHOD: get or post (default: get)
//! - COUNTWATCH_TIMEOUT_SECS: Request timeout (default: none)
//! - RUST_LOG: Log level, logs go to stderr (default: countwatch=warn)
//!
//! Meant to be invoked by an external scheduler such as cron.

use std::process::ExitCode;

use countwatch::{CheckError, CheckerConfig, ThresholdChecker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for any failed check
const FAILURE_EXIT_CODE: u8 = 254;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries only the alert bit
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "countwatch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = run().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Check failed");
    }
    exit_code(&result)
}

/// Any failure collapses to the one failure status
fn exit_code(result: &Result<(), CheckError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(FAILURE_EXIT_CODE),
    }
}

async fn run() -> Result<(), CheckError> {
    let config = CheckerConfig::from_env()?;

    tracing::debug!(
        url = %config.count_url(),
        phrase = %config.phrase,
        window = %config.time_window,
        threshold = config.threshold,
        "Starting check"
    );

    let checker = ThresholdChecker::new(config);
    let mut stdout = std::io::stdout();
    checker.run(&mut stdout).await?;
    Ok(())
}
