use std::time::Duration;

use serde::Deserialize;

use crate::alerts::config::RequestMethod;
use crate::error::CheckError;
use crate::query::CountQuery;

/// Client for a search backend's `_count` endpoint
#[derive(Debug, Clone)]
pub struct SearchClient {
    http_client: reqwest::Client,
    method: RequestMethod,
}

/// The part of a `_count` reply we read
#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: Option<serde_json::Value>,
}

impl SearchClient {
    /// Build a client; `timeout` of None leaves the request unbounded
    pub fn new(method: RequestMethod, timeout: Option<Duration>) -> Result<Self, CheckError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| CheckError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            method,
        })
    }

    /// Count documents matching `query` at `url`, a full `.../<index>/_count` endpoint
    pub async fn count(&self, url: &str, query: &CountQuery) -> Result<u64, CheckError> {
        let request = match self.method {
            RequestMethod::Get => self.http_client.get(url),
            RequestMethod::Post => self.http_client.post(url),
        };

        tracing::debug!(url = %url, method = ?self.method, "Sending count request");

        // `.json` also sets Content-Type: application/json
        let response = request
            .json(query)
            .send()
            .await
            .map_err(|e| CheckError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(CheckError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_count(&body)
    }
}

/// Extract the `count` field from a `_count` reply body
pub fn parse_count(body: &str) -> Result<u64, CheckError> {
    let response: CountResponse =
        serde_json::from_str(body).map_err(|e| CheckError::Decode(e.to_string()))?;

    let count = response.count.ok_or(CheckError::MissingCount)?;
    count
        .as_u64()
        .ok_or_else(|| CheckError::InvalidCount(count.to_string()))
}
