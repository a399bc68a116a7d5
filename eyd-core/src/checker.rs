//! # Checker service client
//!
//! The linguistic analysis happens in an external service. This module
//! defines the [`CheckService`] boundary and an HTTP implementation of it.
//!
//! Wire format of the check endpoint:
//!
//! ```text
//! POST /check_eyd   {"text": "..."}
//! 200               {"text": "...", "corrections": [{"original", "suggested", "rule"}]}
//! ```
//!
//! Any non-success status, connection failure, or body that does not match
//! the schema is reported as an error; nothing is retried.

use crate::config::ServiceConfig;
use crate::correction::{CorrectionBatch, CorrectionCandidate};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Body of a check request.
#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    text: &'a str,
}

/// Successful answer of the check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// The text that was checked, as echoed by the service
    pub text: String,
    /// Suggested corrections in the order the service found them
    pub corrections: Vec<CorrectionCandidate>,
}

impl CheckResponse {
    /// Turn the candidates into an undecided batch.
    pub fn into_batch(self) -> (String, CorrectionBatch) {
        (self.text, CorrectionBatch::from_candidates(self.corrections))
    }
}

/// Error body produced by the service for rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// External spelling and style checker.
#[async_trait]
pub trait CheckService: Send + Sync {
    /// Submit `text` for checking.
    async fn check(&self, text: &str) -> Result<CheckResponse>;

    /// Report the user's decision on a correction.
    ///
    /// The default implementation discards the feedback.
    async fn send_feedback(
        &self,
        correction: &CorrectionCandidate,
        accepted: bool,
    ) -> Result<()> {
        let _ = (correction, accepted);
        Ok(())
    }
}

/// Reject text the service would refuse anyway.
pub fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::validation("text", "Text is empty"));
    }
    Ok(())
}

/// HTTP client for the checker service.
///
/// # Example
///
/// ```rust
/// use eyd_core::checker::HttpChecker;
/// use eyd_core::config::ServiceConfig;
///
/// let checker = HttpChecker::new(&ServiceConfig::default())?;
/// assert_eq!(checker.check_url(), "http://localhost:8000/check_eyd");
/// # Ok::<(), eyd_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: reqwest::Client,
    check_url: String,
    feedback_url: String,
}

impl HttpChecker {
    /// Create a client for the service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        let base_url = config.base_url.trim_end_matches('/');

        Ok(Self {
            client,
            check_url: format!("{}{}", base_url, config.check_path),
            feedback_url: format!("{}{}", base_url, config.feedback_path),
        })
    }

    /// Full URL of the check endpoint.
    pub fn check_url(&self) -> &str {
        &self.check_url
    }

    /// Full URL of the feedback endpoint.
    pub fn feedback_url(&self) -> &str {
        &self.feedback_url
    }
}

/// Build an error for a non-success response, preferring the service's own
/// `detail` message over the raw body.
async fn status_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.detail,
        Err(_) if body.is_empty() => status.canonical_reason().unwrap_or("").to_string(),
        Err(_) => body,
    };
    Error::service(status.as_u16(), message)
}

#[async_trait]
impl CheckService for HttpChecker {
    async fn check(&self, text: &str) -> Result<CheckResponse> {
        validate_text(text)?;
        debug!(url = %self.check_url, chars = text.chars().count(), "Submitting text for checking");

        let response = self
            .client
            .post(&self.check_url)
            .json(&CheckRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await?;
        let parsed: CheckResponse = serde_json::from_str(&body)
            .map_err(|e| Error::malformed(format!("Unexpected check response: {}", e)))?;

        info!(corrections = parsed.corrections.len(), "Received check result");
        Ok(parsed)
    }

    async fn send_feedback(&self, correction: &CorrectionCandidate, accepted: bool) -> Result<()> {
        let response = self
            .client
            .post(&self.feedback_url)
            .query(&[("accepted", accepted)])
            .json(correction)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        debug!(rule = %correction.rule, accepted, "Feedback recorded");
        Ok(())
    }
}
