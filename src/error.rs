//! Error types for the leapocr client library.
//!
//! Every failure surfaced to callers is a member of one closed taxonomy,
//! [`OcrError`]. Transport failures are classified from their HTTP status
//! code at the call site — a raw transport error never escapes the crate —
//! and anything unexpected (malformed response, internal bug) is wrapped in
//! the catch-all [`OcrError::Client`] with the original message preserved.
//!
//! ## Retryability
//!
//! Each kind answers [`OcrError::is_retryable`]. The library itself never
//! retries; the flag is the single source of truth consulted by any retry
//! wrapper layered on top (see [`crate::retry`]). Server errors, rate
//! limits, poll timeouts, and upload failures are retryable; everything
//! that requires the caller to change the request (credentials, payload,
//! configuration) is not.

use std::time::Duration;
use thiserror::Error;

use crate::transport::TransportError;

/// All errors returned by the leapocr client library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Transport-classified errors ───────────────────────────────────────
    /// HTTP 401/403 — credentials rejected or insufficient.
    #[error("authentication error: {message}")]
    Authentication {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// HTTP 404 — the job or resource does not exist.
    #[error("not found: {message}")]
    NotFound {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// HTTP 422 — the request was understood but rejected.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// HTTP 429 — too many requests. Retry after a delay.
    #[error("rate limit exceeded")]
    RateLimit { status: u16, body: Option<String> },

    /// HTTP 5xx — server-side failure, generally transient.
    #[error("server error: {message}")]
    Server {
        message: String,
        status: u16,
        body: Option<String>,
    },

    // ── Locally raised errors ─────────────────────────────────────────────
    /// The polling loop gave up waiting. The remote job is NOT cancelled
    /// and may still complete server-side.
    #[error("job '{job_id}' did not complete within {timeout:?}")]
    Timeout { job_id: String, timeout: Duration },

    /// Byte transfer to a presigned upload target failed.
    #[error("upload failed: {message}")]
    Upload {
        message: String,
        status: Option<u16>,
    },

    /// A job reached a terminal state that prevents further progress.
    #[error("job error: {message}")]
    Job {
        message: String,
        job_id: Option<String>,
        job_status: Option<String>,
    },

    /// Client construction or configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Anything that does not fit the kinds above: network-level failures
    /// with no status code, malformed responses, unexpected internal errors.
    #[error("client error: {message}")]
    Client {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },
}

impl OcrError {
    /// Classify a numeric HTTP status (plus optional response body) into
    /// the matching error kind.
    ///
    /// The mapping is total: any status outside the recognised set, and the
    /// absence of a status entirely, fall through to [`OcrError::Client`].
    pub fn from_status(status: Option<u16>, body: Option<String>, context: &str) -> Self {
        match status {
            Some(401) => OcrError::Authentication {
                message: "invalid API key or authentication failed".into(),
                status: 401,
                body,
            },
            Some(403) => OcrError::Authentication {
                message: "access forbidden - check API key permissions".into(),
                status: 403,
                body,
            },
            Some(404) => OcrError::NotFound {
                message: "resource not found".into(),
                status: 404,
                body,
            },
            Some(422) => OcrError::Validation {
                message: body.clone().unwrap_or_else(|| "request rejected".into()),
                status: 422,
                body,
            },
            Some(429) => OcrError::RateLimit { status: 429, body },
            Some(s) if (500..600).contains(&s) => OcrError::Server {
                message: body.clone().unwrap_or_else(|| format!("HTTP {s}")),
                status: s,
                body,
            },
            other => OcrError::Client {
                message: context.to_string(),
                status: other,
                body,
            },
        }
    }

    /// Wrap an unexpected, non-transport failure without losing its message.
    pub fn unexpected(message: impl Into<String>) -> Self {
        OcrError::Client {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Whether a repeated identical request might succeed.
    ///
    /// True exactly for server errors, rate limits, poll timeouts, and
    /// upload failures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OcrError::Server { .. }
                | OcrError::RateLimit { .. }
                | OcrError::Timeout { .. }
                | OcrError::Upload { .. }
        )
    }

    /// The HTTP status code responsible for this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OcrError::Authentication { status, .. }
            | OcrError::NotFound { status, .. }
            | OcrError::Validation { status, .. }
            | OcrError::RateLimit { status, .. }
            | OcrError::Server { status, .. } => Some(*status),
            OcrError::Upload { status, .. } | OcrError::Client { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<TransportError> for OcrError {
    fn from(err: TransportError) -> Self {
        let context = err.to_string();
        OcrError::from_status(err.status, err.body, &context)
    }
}
