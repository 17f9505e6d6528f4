//! One-shot threshold checker

use std::io::Write;

use super::config::CheckerConfig;
use super::signal::AlertSignal;
use crate::error::CheckError;
use crate::query::CountQuery;
use crate::search::SearchClient;

/// Counts matching log lines once and compares against the threshold
pub struct ThresholdChecker {
    config: CheckerConfig,
}

impl ThresholdChecker {
    /// Create a checker for `config`
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Run the check and return the alert bit
    ///
    /// The HTTP client lives only for the duration of this call.
    pub async fn check(&self) -> Result<AlertSignal, CheckError> {
        let config = &self.config;
        config.validate()?;

        let query = CountQuery::new(&config.phrase, &config.time_window);
        let client = SearchClient::new(config.method, config.timeout)?;
        let count = client.count(&config.count_url(), &query).await?;

        let signal = evaluate(count, config.threshold);
        tracing::debug!(
            index = %config.index,
            count,
            threshold = config.threshold,
            signal = %signal,
            "Threshold evaluated"
        );
        Ok(signal)
    }

    /// Run the check and write the bit to `out`
    ///
    /// Nothing is written unless the check succeeds.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<AlertSignal, CheckError> {
        let signal = self.check().await?;
        signal.write_to(out)?;
        Ok(signal)
    }
}

/// `Triggered` iff `count >= threshold`
pub fn evaluate(count: u64, threshold: u64) -> AlertSignal {
    if count >= threshold {
        AlertSignal::Triggered
    } else {
        AlertSignal::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::config::RequestMethod;

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{
        body::Bytes,
        http::{header, HeaderMap, Method, StatusCode},
        response::IntoResponse,
        routing::any,
        Router,
    };
    use tokio::net::TcpListener;

    #[derive(Debug, Clone)]
    struct Captured {
        method: Method,
        path: String,
        content_type: Option<String>,
        body: serde_json::Value,
    }

    /// Serve `reply` on `/<index>/_count` and record what arrives
    async fn start_backend(
        status: StatusCode,
        reply: &'static str,
    ) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let app = Router::new().route(
            "/:index/_count",
            any(
                move |method: Method,
                      uri: axum::http::Uri,
                      headers: HeaderMap,
                      body: Bytes| {
                    let sink = Arc::clone(&sink);
                    async move {
                        sink.lock().unwrap().push(Captured {
                            method,
                            path: uri.path().to_string(),
                            content_type: headers
                                .get(header::CONTENT_TYPE)
                                .and_then(|v| v.to_str().ok())
                                .map(String::from),
                            body: serde_json::from_slice(&body)
                                .unwrap_or(serde_json::Value::Null),
                        });
                        (status, reply).into_response()
                    }
                },
            ),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn config_for(base_url: &str, threshold: u64) -> CheckerConfig {
        CheckerConfig::new(base_url, "test", "Handbill not printed", "3h", threshold)
            .with_timeout(Duration::from_secs(5))
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate(3, 3), AlertSignal::Triggered);
        assert_eq!(evaluate(2, 3), AlertSignal::Clear);
        assert_eq!(evaluate(0, 0), AlertSignal::Triggered);
        assert_eq!(evaluate(u64::MAX, 3), AlertSignal::Triggered);
        for count in 0..10 {
            for threshold in 0..10 {
                assert_eq!(
                    evaluate(count, threshold) == AlertSignal::Triggered,
                    count >= threshold
                );
            }
        }
    }

    #[tokio::test]
    async fn test_count_at_threshold_prints_one() {
        let (url, captured) = start_backend(StatusCode::OK, r#"{"count":3}"#).await;
        let checker = ThresholdChecker::new(config_for(&url, 3));

        let mut out = Vec::new();
        let signal = checker.run(&mut out).await.unwrap();

        assert_eq!(signal, AlertSignal::Triggered);
        assert_eq!(out, b"1");

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/test/_count");
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            request.body,
            serde_json::json!({
                "query": {"bool": {"must": [
                    {"regexp": {"message": {"value": ".*Handbill not printed.*"}}},
                    {"range": {"timestamp": {"gte": "now-3h", "lt": "now"}}}
                ]}}
            })
        );
    }

    #[tokio::test]
    async fn test_count_below_threshold_prints_zero() {
        let (url, _) = start_backend(StatusCode::OK, r#"{"count":2,"_shards":{}}"#).await;
        let checker = ThresholdChecker::new(config_for(&url, 3));

        let mut out = Vec::new();
        let signal = checker.run(&mut out).await.unwrap();

        assert_eq!(signal, AlertSignal::Clear);
        assert_eq!(out, b"0");
    }

    #[tokio::test]
    async fn test_post_method() {
        let (url, captured) = start_backend(StatusCode::OK, r#"{"count":1}"#).await;
        let config = config_for(&url, 1).with_method(RequestMethod::Post);
        let checker = ThresholdChecker::new(config);

        let signal = checker.check().await.unwrap();
        assert_eq!(signal, AlertSignal::Triggered);
        assert_eq!(captured.lock().unwrap()[0].method, Method::POST);
    }

    #[tokio::test]
    async fn test_malformed_json_prints_nothing() {
        let (url, _) = start_backend(StatusCode::OK, "{count: oops").await;
        let checker = ThresholdChecker::new(config_for(&url, 3));

        let mut out = Vec::new();
        let result = checker.run(&mut out).await;

        assert!(matches!(result, Err(CheckError::Decode(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_count_prints_nothing() {
        let (url, _) = start_backend(StatusCode::OK, r#"{"hits":5}"#).await;
        let checker = ThresholdChecker::new(config_for(&url, 3));

        let mut out = Vec::new();
        let result = checker.run(&mut out).await;

        assert!(matches!(result, Err(CheckError::MissingCount)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_prints_nothing() {
        let (url, _) = start_backend(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"count":99}"#,
        )
        .await;
        let checker = ThresholdChecker::new(config_for(&url, 3));

        let mut out = Vec::new();
        let result = checker.run(&mut out).await;

        assert!(matches!(result, Err(CheckError::Status { status: 500, .. })));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_date_math_window_passed_verbatim() {
        let (url, captured) = start_backend(StatusCode::OK, r#"{"count":0}"#).await;
        let config = CheckerConfig::new(url, "test", "Handbill not printed", "3h/h", 1)
            .with_timeout(Duration::from_secs(5));
        let checker = ThresholdChecker::new(config);

        let mut out = Vec::new();
        let signal = checker.run(&mut out).await.unwrap();

        assert_eq!(signal, AlertSignal::Clear);
        assert_eq!(out, b"0");
        assert_eq!(
            captured.lock().unwrap()[0].body["query"]["bool"]["must"][1]["range"]["timestamp"]["gte"],
            "now-3h/h"
        );
    }

    #[tokio::test]
    async fn test_slow_backend_times_out_and_prints_nothing() {
        let app = Router::new().route(
            "/:index/_count",
            any(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                (StatusCode::OK, r#"{"count":3}"#).into_response()
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = CheckerConfig::new(format!("http://{}", addr), "test", "x", "3h", 3)
            .with_timeout(Duration::from_secs(1));
        let checker = ThresholdChecker::new(config);

        let mut out = Vec::new();
        let result = checker.run(&mut out).await;

        assert!(matches!(result, Err(CheckError::Network(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_prints_nothing() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let checker = ThresholdChecker::new(config_for(&format!("http://{}", addr), 3));

        let mut out = Vec::new();
        let result = checker.run(&mut out).await;

        assert!(matches!(result, Err(CheckError::Network(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_request() {
        let (url, captured) = start_backend(StatusCode::OK, r#"{"count":3}"#).await;
        let checker = ThresholdChecker::new(CheckerConfig::new(url, "test", "x", "three hours", 3));

        let mut out = Vec::new();
        let result = checker.run(&mut out).await;

        assert!(matches!(result, Err(CheckError::Config(_))));
        assert!(out.is_empty());
        assert!(captured.lock().unwrap().is_empty());
    }
}
