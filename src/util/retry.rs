use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::MigrateError;

const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Methods that may be replayed after the server has seen them.
const IDEMPOTENT_METHODS: &[&str] = &["GET", "HEAD", "PUT", "DELETE", "OPTIONS", "TRACE"];

/// Bounded exponential backoff for transient server errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub retry_statuses: &'static [u16],
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            backoff_factor: Duration::from_millis(300),
            retry_statuses: &[500, 502, 504],
        }
    }
}

impl RetryPolicy {
    /// Delay before the `retry`-th retry (1-based): `factor * 2^(retry-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(31);
        self.backoff_factor
            .checked_mul(1u32 << exp)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    pub fn should_retry(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// Send a request, retrying transient failures, and fail on any
    /// non-success status.
    ///
    /// Retryable statuses and timeouts are only retried for idempotent
    /// methods; a POST or PATCH may already have taken effect. Connect
    /// failures are retried for every method.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let mut retry = 0u32;
        loop {
            let attempt = request
                .try_clone()
                .context("Request body cannot be replayed for retry")?;
            let (method, url) = describe(&attempt);
            let replayable = IDEMPOTENT_METHODS.contains(&method.as_str());

            let last = match attempt.send().await {
                Ok(resp) if replayable && self.should_retry(resp.status()) => {
                    resp.status().to_string()
                }
                Ok(resp) => return check_status(&method, resp).await,
                Err(e) if e.is_connect() => e.to_string(),
                Err(e) if replayable && e.is_timeout() => e.to_string(),
                Err(e) => return Err(e).with_context(|| format!("{method} {url} failed")),
            };

            if retry >= self.max_retries {
                return Err(MigrateError::RetriesExhausted {
                    method,
                    url,
                    attempts: retry + 1,
                    last,
                }
                .into());
            }
            retry += 1;
            let delay = self.delay_for(retry);
            tracing::warn!(%method, %url, %last, retry, ?delay, "transient failure, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = self.send(request).await?;
        let url = resp.url().to_string();
        resp.json()
            .await
            .with_context(|| format!("Failed to parse response from {url}"))
    }
}

fn describe(request: &RequestBuilder) -> (String, String) {
    match request.try_clone().and_then(|r| r.build().ok()) {
        Some(req) => (req.method().to_string(), req.url().to_string()),
        None => ("?".into(), "?".into()),
    }
}

async fn check_status(method: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    Err(MigrateError::Http {
        method: method.to_string(),
        url,
        status: status.as_u16(),
        body,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_server::{StubResponse, StubServer};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_factor: Duration::from_millis(1),
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn delays_grow_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(300));
        assert_eq!(policy.delay_for(2), Duration::from_millis(600));
        assert_eq!(policy.delay_for(4), Duration::from_millis(2400));
    }

    #[test]
    fn delays_are_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(20), MAX_BACKOFF);
        assert_eq!(policy.delay_for(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn only_listed_statuses_are_retried() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(StatusCode::BAD_GATEWAY));
        assert!(policy.should_retry(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(policy.should_retry(StatusCode::GATEWAY_TIMEOUT));
        assert!(!policy.should_retry(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!policy.should_retry(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn recovers_after_transient_errors() {
        let server = StubServer::start(vec![
            StubResponse::status(502),
            StubResponse::status(500),
            StubResponse::json(200, r#"{"ok":true}"#),
        ])
        .await;
        let client = reqwest::Client::new();

        let value: serde_json::Value = fast_policy(3)
            .send_json(client.get(server.url("/thing")))
            .await
            .unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let server = StubServer::start(vec![StubResponse::status(504); 3]).await;
        let client = reqwest::Client::new();

        let err = fast_policy(2)
            .send(client.get(server.url("/thing")))
            .await
            .unwrap_err();

        match err.downcast_ref::<MigrateError>() {
            Some(MigrateError::RetriesExhausted { attempts, .. }) => assert_eq!(*attempts, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn post_is_not_replayed_after_server_error() {
        let server = StubServer::start(vec![
            StubResponse::status(502),
            StubResponse::json(201, r#"{"name":"Type: Bug","color":"f9d0c4"}"#),
        ])
        .await;
        let client = reqwest::Client::new();

        let err = fast_policy(5)
            .send(client.post(server.url("/labels")).json(&serde_json::json!({"name": "Type: Bug"})))
            .await
            .unwrap_err();

        match err.downcast_ref::<MigrateError>() {
            Some(MigrateError::Http { status, method, .. }) => {
                assert_eq!(*status, 502);
                assert_eq!(method, "POST");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn put_is_replayed_after_server_error() {
        let server = StubServer::start(vec![
            StubResponse::status(500),
            StubResponse::json(200, r#"{"ok":true}"#),
        ])
        .await;
        let client = reqwest::Client::new();

        let resp = fast_policy(3)
            .send(client.put(server.url("/thing")).body("x"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn connect_failures_are_retried_for_any_method() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/labels", listener.local_addr().unwrap());
        drop(listener);
        let client = reqwest::Client::new();

        let err = fast_policy(2)
            .send(client.post(&url).json(&serde_json::json!({"name": "x"})))
            .await
            .unwrap_err();

        match err.downcast_ref::<MigrateError>() {
            Some(MigrateError::RetriesExhausted { attempts, method, .. }) => {
                assert_eq!(*attempts, 3);
                assert_eq!(method, "POST");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_errors_fail_without_retry() {
        let server = StubServer::start(vec![StubResponse::json(422, r#"{"message":"Validation Failed"}"#)]).await;
        let client = reqwest::Client::new();

        let err = fast_policy(5)
            .send(client.post(server.url("/labels")).json(&serde_json::json!({"name": "x"})))
            .await
            .unwrap_err();

        match err.downcast_ref::<MigrateError>() {
            Some(MigrateError::Http { status, body, .. }) => {
                assert_eq!(*status, 422);
                assert!(body.contains("Validation Failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.requests().len(), 1);
    }
}
