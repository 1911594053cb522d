//! Connection tests for MCP providers.
//!
//! `AppState` holds an `Arc<dyn ConnectionProber>`; production wires
//! [`HttpProber`], tests substitute a stub.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::provider::{
    AuthType, McpProvider, MAX_RETRY_COUNT, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS,
};

const BACKOFF_BASE_MS: u64 = 200;

#[derive(Debug, Error, PartialEq)]
pub enum ProbeError {
    #[error("Invalid endpoint URL '{0}'")]
    InvalidEndpoint(String),

    #[error("Timeout {0}ms is outside {}..={}ms", MIN_TIMEOUT_MS, MAX_TIMEOUT_MS)]
    TimeoutOutOfRange(u32),

    #[error("Retry count {0} exceeds the maximum of {}", MAX_RETRY_COUNT)]
    TooManyRetries(u32),
}

/// Everything needed to reach a provider, borrowed from a stored record or
/// taken from an unsaved form.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub endpoint_url: String,
    pub auth_type: AuthType,
    pub api_key: Option<SecretString>,
    pub timeout_ms: u32,
    pub retry_count: u32,
}

impl ProbeTarget {
    pub fn from_provider(provider: &McpProvider) -> Self {
        Self {
            endpoint_url: provider.endpoint_url.clone(),
            auth_type: provider.auth_type,
            api_key: provider.api_key.clone(),
            timeout_ms: provider.timeout_ms,
            retry_count: provider.retry_count,
        }
    }

    /// Checks the endpoint and bounds the time a single connection test may take.
    pub fn validate(&self) -> Result<Url, ProbeError> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ProbeError::TimeoutOutOfRange(self.timeout_ms));
        }
        if self.retry_count > MAX_RETRY_COUNT {
            return Err(ProbeError::TooManyRetries(self.retry_count));
        }
        let url = Url::parse(self.endpoint_url.trim())
            .map_err(|_| ProbeError::InvalidEndpoint(self.endpoint_url.clone()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ProbeError::InvalidEndpoint(self.endpoint_url.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub success: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn ok(elapsed: Duration) -> Self {
        Self {
            success: true,
            duration_ms: millis(elapsed),
            error: None,
        }
    }

    pub fn failed(elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            success: false,
            duration_ms: millis(elapsed),
            error: Some(error.into()),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Reaches a provider endpoint and reports whether it answered.
/// Unreachable endpoints are a failed result, not an error.
#[async_trait]
pub trait ConnectionProber: Send + Sync {
    async fn probe(&self, target: &ProbeTarget) -> ProbeResult;
}

/// Probes over HTTP GET, retrying `retry_count` extra times with backoff.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client for provider probes")?;
        Ok(Self { client })
    }

    fn request(&self, url: Url, target: &ProbeTarget) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .timeout(Duration::from_millis(u64::from(target.timeout_ms)));
        authorize(request, target)
    }
}

fn authorize(request: RequestBuilder, target: &ProbeTarget) -> RequestBuilder {
    let Some(key) = target.api_key.as_ref() else {
        return request;
    };
    let key = key.expose_secret();
    match target.auth_type {
        AuthType::ApiKey => request.header("X-API-Key", key),
        AuthType::BearerToken => request.bearer_auth(key),
        // Stored as "user:password"; a bare value is the user name.
        AuthType::BasicAuth => match key.split_once(':') {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request.basic_auth(key, None::<&str>),
        },
    }
}

#[async_trait]
impl ConnectionProber for HttpProber {
    async fn probe(&self, target: &ProbeTarget) -> ProbeResult {
        let started = Instant::now();
        let url = match target.validate() {
            Ok(url) => url,
            Err(e) => return ProbeResult::failed(started.elapsed(), e.to_string()),
        };

        let attempts = target.retry_count.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = Duration::from_millis(BACKOFF_BASE_MS << (attempt - 1).min(5));
                warn!(
                    "Probe of {} failed ({}), retrying after {}ms",
                    url,
                    last_error,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.request(url.clone(), target).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() || status.is_redirection() {
                        debug!("Probe of {} succeeded with {}", url, status);
                        return ProbeResult::ok(started.elapsed());
                    }
                    last_error = format!("endpoint answered {status}");
                }
                Err(e) if e.is_timeout() => {
                    last_error = format!("timed out after {}ms", target.timeout_ms);
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        ProbeResult::failed(started.elapsed(), last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str, auth_type: AuthType, key: Option<&str>) -> ProbeTarget {
        ProbeTarget {
            endpoint_url: url.to_string(),
            auth_type,
            api_key: key.map(SecretString::from),
            timeout_ms: 500,
            retry_count: 0,
        }
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let t = target("ftp://example.com", AuthType::ApiKey, None);
        assert_eq!(
            t.validate(),
            Err(ProbeError::InvalidEndpoint("ftp://example.com".to_string()))
        );
        assert!(target("not a url", AuthType::ApiKey, None).validate().is_err());
        assert!(target("https://api.example.com/verify", AuthType::ApiKey, None)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_timeout_bounds_are_inclusive() {
        let mut t = target("https://api.example.com", AuthType::ApiKey, None);
        for ok in [MIN_TIMEOUT_MS, MAX_TIMEOUT_MS] {
            t.timeout_ms = ok;
            assert!(t.validate().is_ok(), "{ok}");
        }
        for bad in [0, MIN_TIMEOUT_MS - 1, MAX_TIMEOUT_MS + 1, 4_000_000_000] {
            t.timeout_ms = bad;
            assert_eq!(t.validate(), Err(ProbeError::TimeoutOutOfRange(bad)));
        }
    }

    #[test]
    fn test_retry_count_bounds() {
        let mut t = target("https://api.example.com", AuthType::ApiKey, None);
        for ok in [0, MAX_RETRY_COUNT] {
            t.retry_count = ok;
            assert!(t.validate().is_ok(), "{ok}");
        }
        for bad in [MAX_RETRY_COUNT + 1, 4_000_000_000] {
            t.retry_count = bad;
            assert_eq!(t.validate(), Err(ProbeError::TooManyRetries(bad)));
        }
    }

    #[test]
    fn test_auth_headers_by_type() {
        let prober = HttpProber::new("test-agent").unwrap();
        let url = Url::parse("https://api.example.com").unwrap();

        let t = target(url.as_str(), AuthType::ApiKey, Some("k-123"));
        let req = prober.request(url.clone(), &t).build().unwrap();
        assert_eq!(req.headers()["x-api-key"], "k-123");

        let t = target(url.as_str(), AuthType::BearerToken, Some("tok"));
        let req = prober.request(url.clone(), &t).build().unwrap();
        assert_eq!(req.headers()["authorization"], "Bearer tok");

        let t = target(url.as_str(), AuthType::BasicAuth, Some("user:pass"));
        let req = prober.request(url.clone(), &t).build().unwrap();
        assert_eq!(req.headers()["authorization"], "Basic dXNlcjpwYXNz");
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_a_failed_result() {
        let prober = HttpProber::new("test-agent").unwrap();
        let result = prober
            .probe(&target("mailto:someone", AuthType::ApiKey, None))
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Invalid endpoint"));
    }

    #[test]
    fn test_result_omits_error_on_success() {
        let json = serde_json::to_value(ProbeResult::ok(Duration::from_millis(42))).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "durationMs": 42}));
    }
}
