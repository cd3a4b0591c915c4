//! The HTTP transport seam.
//!
//! [`OcrTransport`] is the sole boundary between the orchestration layer and
//! the wire. It is a trait so tests can script server behaviour without a
//! network, and so callers can interpose middleware (caching, recording).
//! The production implementation is [`HttpTransport`], a thin reqwest
//! wrapper that attaches the bearer credential and user agent to every call.
//!
//! Transport methods fail with [`TransportError`] — a numeric status code
//! plus optional body. That pair is the *sole* input to error
//! classification; the transport itself never decides retryability or
//! error kind (see [`crate::error::OcrError::from_status`]).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;
use crate::types::{JobResult, JobStatus, JobStatusInfo};

/// A failure at the wire level: HTTP error status, network failure, or an
/// undecodable response.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP status code, when the server answered at all.
    pub status: Option<u16>,
    /// Raw response body, when one was received.
    pub body: Option<String>,
    pub message: String,
}

impl TransportError {
    /// A failure with no HTTP status: DNS, connect, timeout, TLS.
    pub fn network(message: impl Into<String>) -> Self {
        TransportError {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    /// A non-success HTTP response.
    pub fn http(status: u16, body: Option<String>) -> Self {
        TransportError {
            status: Some(status),
            body,
            message: format!("HTTP {status}"),
        }
    }
}

// ── Wire messages ────────────────────────────────────────────────────────

/// Request body for URL-based submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitUrlRequest {
    pub url: String,
    pub format: String,
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Response to a submission: the job handle fields.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for a presigned upload target.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTargetRequest {
    pub format: String,
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Response carrying the presigned upload target.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTargetResponse {
    pub job_id: String,
    pub upload_url: String,
    /// Headers the service requires on the byte transfer.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

// ── Trait ────────────────────────────────────────────────────────────────

/// The five remote operations the orchestration layer needs.
///
/// Implementations attach authentication transparently; callers never see
/// credentials. All methods may fail with a status-coded [`TransportError`].
#[async_trait]
pub trait OcrTransport: Send + Sync {
    /// Submit a document by URL; the service downloads it itself.
    async fn submit_from_url(
        &self,
        request: SubmitUrlRequest,
    ) -> Result<SubmitResponse, TransportError>;

    /// Request a presigned upload target for direct byte transfer.
    async fn request_upload_target(
        &self,
        request: UploadTargetRequest,
    ) -> Result<UploadTargetResponse, TransportError>;

    /// PUT raw bytes to a presigned target with the headers the service
    /// supplied. Success is any 2xx.
    async fn upload_bytes(
        &self,
        upload_url: &str,
        headers: &HashMap<String, String>,
        bytes: Vec<u8>,
    ) -> Result<(), TransportError>;

    /// Fetch the current status of a job.
    async fn get_status(&self, job_id: &str) -> Result<JobStatusInfo, TransportError>;

    /// Fetch the full result payload of a job.
    async fn get_result(&self, job_id: &str) -> Result<JobResult, TransportError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────

/// reqwest-backed [`OcrTransport`] speaking JSON to the LeapOCR API.
pub struct HttpTransport {
    /// Authenticated client for API calls.
    api: reqwest::Client,
    /// Bare client for presigned uploads — the target URL embeds its own
    /// credentials, so the bearer header must not leak onto it.
    upload: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.api_key);
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|e| TransportError::network(format!("invalid API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| TransportError::network(format!("invalid user agent: {e}")))?,
        );

        let api = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::network(e.to_string()))?;

        let upload = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::network(e.to_string()))?;

        Ok(Self {
            api,
            upload,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decode a response, turning non-2xx into a status-coded error.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(TransportError::http(status.as_u16(), body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::network(format!("undecodable response: {e}")))
    }

    fn send_error(e: reqwest::Error) -> TransportError {
        match e.status() {
            Some(status) => TransportError::http(status.as_u16(), None),
            None => TransportError::network(e.to_string()),
        }
    }
}

#[async_trait]
impl OcrTransport for HttpTransport {
    async fn submit_from_url(
        &self,
        request: SubmitUrlRequest,
    ) -> Result<SubmitResponse, TransportError> {
        debug!(url = %request.url, format = %request.format, "submitting URL");
        let response = self
            .api
            .post(self.endpoint("/v1/upload/url"))
            .json(&request)
            .send()
            .await
            .map_err(Self::send_error)?;
        Self::decode(response).await
    }

    async fn request_upload_target(
        &self,
        request: UploadTargetRequest,
    ) -> Result<UploadTargetResponse, TransportError> {
        debug!(format = %request.format, "requesting presigned upload target");
        let response = self
            .api
            .post(self.endpoint("/v1/upload/presigned"))
            .json(&request)
            .send()
            .await
            .map_err(Self::send_error)?;
        Self::decode(response).await
    }

    async fn upload_bytes(
        &self,
        upload_url: &str,
        headers: &HashMap<String, String>,
        bytes: Vec<u8>,
    ) -> Result<(), TransportError> {
        debug!(bytes = bytes.len(), "uploading to presigned target");
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::network(format!("bad upload header '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::network(format!("bad upload header value: {e}")))?;
            header_map.insert(name, value);
        }

        let response = self
            .upload
            .put(upload_url)
            .headers(header_map)
            .body(bytes)
            .send()
            .await
            .map_err(Self::send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(TransportError::http(status.as_u16(), body));
        }
        Ok(())
    }

    async fn get_status(&self, job_id: &str) -> Result<JobStatusInfo, TransportError> {
        let response = self
            .api
            .get(self.endpoint(&format!("/v1/jobs/{job_id}/status")))
            .send()
            .await
            .map_err(Self::send_error)?;
        Self::decode(response).await
    }

    async fn get_result(&self, job_id: &str) -> Result<JobResult, TransportError> {
        let response = self
            .api
            .get(self.endpoint(&format!("/v1/jobs/{job_id}/result")))
            .send()
            .await
            .map_err(Self::send_error)?;
        Self::decode(response).await
    }
}
