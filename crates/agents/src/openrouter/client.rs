use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use tracing::{debug, error, info, warn};

use super::types::*;
use crate::error::{AgentError, AgentResult};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Backoff applied when the API signals rate limiting.
///
/// Only rate limits are retried; every other failure surfaces on the first
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_backoff: Duration::from_secs(10),
            multiplier: 1.5,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .mul_f64(self.multiplier.powi(attempt as i32))
    }
}

/// Client for the OpenRouter chat completions API
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn with_retry<T, F, Fut>(&self, operation: F, operation_name: &str) -> AgentResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AgentResult<T>>,
    {
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(AgentError::RateLimited { retry_after }) => {
                    if retries >= self.retry.max_retries {
                        error!(
                            operation = operation_name,
                            retries, "Giving up after repeated rate limiting"
                        );
                        return Err(AgentError::RateLimited { retry_after });
                    }

                    let backoff = self.retry.backoff(retries);
                    let wait = retry_after
                        .map(Duration::from_secs)
                        .map_or(backoff, |hinted| hinted.max(backoff));

                    warn!(
                        operation = operation_name,
                        wait_ms = wait.as_millis() as u64,
                        attempt = retries + 1,
                        max_retries = self.retry.max_retries,
                        "Rate limited, retrying"
                    );

                    tokio::time::sleep(wait).await;
                    retries += 1;
                }
                Err(e) => {
                    if retries > 0 {
                        info!(
                            operation = operation_name,
                            retries,
                            error = %e,
                            "Failed after rate-limit retries"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Run a chat completion and return the assistant text.
    pub async fn complete(
        &self,
        request: ChatCompletionRequest,
        operation_name: &str,
    ) -> AgentResult<String> {
        self.with_retry(|| self.complete_inner(&request), operation_name)
            .await
    }

    async fn complete_inner(&self, request: &ChatCompletionRequest) -> AgentResult<String> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            web_search = !request.plugins.is_empty(),
            structured = request.response_format.is_some(),
            "Creating chat completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, retry_after, &error_text));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AgentError::api("No completion returned", None))
    }
}

/// Map a non-success response onto the error taxonomy.
///
/// Upstream providers relay quota exhaustion with other status codes, so the
/// body is checked for rate-limit markers as well.
fn classify_failure(status: StatusCode, retry_after: Option<u64>, body: &str) -> AgentError {
    let message = serde_json::from_str::<OpenRouterError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || mentions_rate_limit(&message) {
        warn!(status = status.as_u16(), "Rate limited by OpenRouter");
        return AgentError::RateLimited { retry_after };
    }

    error!(status = status.as_u16(), message = %message, "OpenRouter API error");
    AgentError::api(message, Some(status.as_u16()))
}

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("resource_exhausted") || lower.contains("quota") || lower.contains("rate limit")
}
