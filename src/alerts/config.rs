//! Checker configuration

use std::time::Duration;

use regex::Regex;

use crate::error::CheckError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "test";
pub const DEFAULT_PHRASE: &str = "Handbill not printed";
pub const DEFAULT_TIME_WINDOW: &str = "3h";
pub const DEFAULT_THRESHOLD: u64 = 3;

/// HTTP method used for the count request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    /// GET with a body, the Elasticsearch convention
    #[default]
    Get,
    /// For backends or proxies that drop bodies on GET
    Post,
}

impl std::str::FromStr for RequestMethod {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(RequestMethod::Get),
            "post" => Ok(RequestMethod::Post),
            other => Err(CheckError::Config(format!(
                "unknown request method '{}'",
                other
            ))),
        }
    }
}

/// Everything a single check needs
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Index to count in
    pub index: String,
    /// Substring to look for in the message field (case-sensitive)
    pub phrase: String,
    /// Date-math expression such as `3h` or `1d/d`, counted back from now
    pub time_window: String,
    /// Minimum count that raises the alert
    pub threshold: u64,
    pub method: RequestMethod,
    /// None means wait indefinitely
    pub timeout: Option<Duration>,
}

impl CheckerConfig {
    pub fn new(
        base_url: impl Into<String>,
        index: impl Into<String>,
        phrase: impl Into<String>,
        time_window: impl Into<String>,
        threshold: u64,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.into(),
            phrase: phrase.into(),
            time_window: time_window.into(),
            threshold,
            method: RequestMethod::default(),
            timeout: None,
        }
    }

    /// Set request method
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load from environment variables
    ///
    /// - COUNTWATCH_URL (default: http://localhost:9200)
    /// - COUNTWATCH_INDEX (default: test)
    /// - COUNTWATCH_PHRASE (default: Handbill not printed)
    /// - COUNTWATCH_WINDOW (default: 3h)
    /// - COUNTWATCH_THRESHOLD (default: 3)
    /// - COUNTWATCH_METHOD: get | post (default: get)
    /// - COUNTWATCH_TIMEOUT_SECS (default: none)
    pub fn from_env() -> Result<Self, CheckError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, applying the same defaults as `from_env`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("COUNTWATCH_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let index = lookup("COUNTWATCH_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string());
        let phrase = lookup("COUNTWATCH_PHRASE").unwrap_or_else(|| DEFAULT_PHRASE.to_string());
        let time_window =
            lookup("COUNTWATCH_WINDOW").unwrap_or_else(|| DEFAULT_TIME_WINDOW.to_string());

        let threshold = match lookup("COUNTWATCH_THRESHOLD") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                CheckError::Config(format!("COUNTWATCH_THRESHOLD '{}': {}", raw, e))
            })?,
            None => DEFAULT_THRESHOLD,
        };

        let method = match lookup("COUNTWATCH_METHOD") {
            Some(raw) => raw.parse()?,
            None => RequestMethod::default(),
        };

        let timeout = lookup("COUNTWATCH_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    CheckError::Config(format!("COUNTWATCH_TIMEOUT_SECS '{}': {}", raw, e))
                })
            })
            .transpose()?;

        let mut config = Self::new(base_url, index, phrase, time_window, threshold)
            .with_method(method);
        config.timeout = timeout;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the backend could never accept
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.base_url.is_empty() {
            return Err(CheckError::Config("base URL is empty".to_string()));
        }
        if self.index.is_empty() || self.index.contains('/') {
            return Err(CheckError::Config(format!(
                "invalid index name '{}'",
                self.index
            )));
        }
        // Date math after `now-`: offsets in y M w d h H m s, optional rounding
        let window = Regex::new(r"^[0-9]+[yMwdhHms](?:[+-][0-9]+[yMwdhHms])*(?:/[yMwdhHms])?$")
            .map_err(|e| CheckError::Config(e.to_string()))?;
        if !window.is_match(&self.time_window) {
            return Err(CheckError::Config(format!(
                "invalid time window '{}'",
                self.time_window
            )));
        }
        Ok(())
    }

    /// Full URL of the count endpoint
    pub fn count_url(&self) -> String {
        format!("{}/{}/_count", self.base_url, self.index)
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_URL,
            DEFAULT_INDEX,
            DEFAULT_PHRASE,
            DEFAULT_TIME_WINDOW,
            DEFAULT_THRESHOLD,
        )
    }
}
