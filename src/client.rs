//! The low-level client: submission, status, results, and the poll loop.
//!
//! [`OcrClient`] wraps an [`OcrTransport`] and adds the job lifecycle
//! orchestration: submit a document, poll its status at a fixed cadence
//! until a terminal state, then fetch the full result. Every transport
//! failure is classified into [`OcrError`] at the call site — no raw
//! transport error crosses this boundary.
//!
//! ## Polling semantics
//!
//! [`OcrClient::wait_for_result`] re-fetches fresh status every iteration
//! (no caching), stops immediately on a terminal status, and enforces a
//! purely local wall-clock deadline. Hitting the deadline raises
//! [`OcrError::Timeout`] without cancelling the remote job — a timed-out
//! job may still complete server-side, and the caller is not notified if
//! it later does. The cadence is fixed; backoff belongs to the caller (see
//! [`crate::retry`]).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::OcrError;
use crate::transport::{
    HttpTransport, OcrTransport, SubmitUrlRequest, UploadTargetRequest,
};
use crate::types::{
    DocumentSource, FileUploadResult, Job, JobResult, JobStatus, JobStatusInfo, ProcessOptions,
};

/// Client for the LeapOCR job API.
///
/// Cheap to clone; all clones share one transport.
///
/// # Example
/// ```rust,no_run
/// use leapocr::{ClientConfig, OcrClient, ProcessOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), leapocr::OcrError> {
/// let client = OcrClient::from_config(ClientConfig::new("sk-key")?)?;
/// let job = client
///     .process_url("https://example.com/invoice.pdf", &ProcessOptions::default())
///     .await?;
/// let result = client
///     .wait_for_result(&job.id, client.config().job_timeout, client.config().poll_interval)
///     .await?;
/// println!("used {:?} credits", result.credits_used);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OcrClient {
    transport: Arc<dyn OcrTransport>,
    config: ClientConfig,
}

impl OcrClient {
    /// Build a client over the production HTTP transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, OcrError> {
        let transport = HttpTransport::new(&config).map_err(|e| OcrError::Configuration {
            message: format!("failed to build HTTP transport: {e}"),
        })?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Build a client over a caller-supplied transport.
    ///
    /// The seam used by tests and by callers who interpose middleware.
    pub fn new(config: ClientConfig, transport: Arc<dyn OcrTransport>) -> Self {
        Self { transport, config }
    }

    /// The immutable configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Submit a document by URL and return its job handle.
    ///
    /// The service downloads the document itself; nothing is transferred
    /// from this process. A response without a status is treated as pending.
    pub async fn process_url(
        &self,
        url: &str,
        options: &ProcessOptions,
    ) -> Result<Job, OcrError> {
        info!(url, format = options.format.as_str(), "submitting document URL");
        let request = SubmitUrlRequest {
            url: url.to_string(),
            format: options.format.as_str().to_string(),
            tier: options.tier.as_str().to_string(),
            project_id: options.project_id.clone(),
            schema_id: options.schema_id.clone(),
            instruction_id: options.instruction_id.clone(),
            category_id: options.category_id.clone(),
            webhook_url: options.webhook_url.clone(),
        };

        let response = self.transport.submit_from_url(request).await?;
        let job = Job {
            id: response.job_id,
            status: response.status.unwrap_or(JobStatus::Pending),
            created_at: response.created_at,
        };
        info!(job_id = %job.id, status = %job.status, "job created");
        Ok(job)
    }

    /// Upload a local file or in-memory bytes for processing.
    ///
    /// Two phases: request a presigned upload target carrying the same
    /// options payload, then PUT the raw bytes to it with the headers the
    /// service supplied. The byte source is read fully into memory; no
    /// streaming upload is attempted. A non-2xx PUT surfaces as
    /// [`OcrError::Upload`], never as a silent return.
    pub async fn upload_file(
        &self,
        source: &DocumentSource,
        options: &ProcessOptions,
    ) -> Result<FileUploadResult, OcrError> {
        let bytes = match source {
            DocumentSource::Path(path) => {
                tokio::fs::read(path).await.map_err(|e| {
                    OcrError::unexpected(format!("failed to read '{}': {e}", path.display()))
                })?
            }
            DocumentSource::Bytes(bytes) => bytes.clone(),
            DocumentSource::Url(url) => {
                return Err(OcrError::unexpected(format!(
                    "cannot upload a URL source ('{url}'); use process_url instead"
                )));
            }
        };

        info!(bytes = bytes.len(), "requesting presigned upload target");
        let request = UploadTargetRequest {
            format: options.format.as_str().to_string(),
            tier: options.tier.as_str().to_string(),
            project_id: options.project_id.clone(),
            schema_id: options.schema_id.clone(),
            instruction_id: options.instruction_id.clone(),
            category_id: options.category_id.clone(),
            webhook_url: options.webhook_url.clone(),
        };
        let target = self.transport.request_upload_target(request).await?;

        self.transport
            .upload_bytes(&target.upload_url, &target.headers, bytes)
            .await
            .map_err(|e| OcrError::Upload {
                message: e.to_string(),
                status: e.status,
            })?;

        info!(job_id = %target.job_id, "upload complete");
        Ok(FileUploadResult {
            job_id: target.job_id,
            upload_url: target.upload_url,
            headers: target.headers,
            status: "uploaded".to_string(),
        })
    }

    // ── Status & results ─────────────────────────────────────────────────

    /// Fetch the current status snapshot of a job.
    pub async fn get_job_status(&self, job_id: &str) -> Result<JobStatusInfo, OcrError> {
        Ok(self.transport.get_status(job_id).await?)
    }

    /// Fetch the full result payload of a job.
    ///
    /// Does not check that the job is terminal; callers normally reach this
    /// through [`OcrClient::wait_for_result`], which does.
    pub async fn get_job_result(&self, job_id: &str) -> Result<JobResult, OcrError> {
        Ok(self.transport.get_result(job_id).await?)
    }

    // ── Polling ──────────────────────────────────────────────────────────

    /// Poll a job until it reaches a terminal status, then return its result.
    ///
    /// * `timeout` — wall-clock limit for the whole wait; `None` waits
    ///   indefinitely. Expiry raises [`OcrError::Timeout`] and does NOT
    ///   cancel the remote job.
    /// * `poll_interval` — fixed delay between status fetches.
    pub async fn wait_for_result(
        &self,
        job_id: &str,
        timeout: Option<Duration>,
        poll_interval: Duration,
    ) -> Result<JobResult, OcrError> {
        let start = Instant::now();
        info!(job_id, ?timeout, ?poll_interval, "waiting for job completion");

        loop {
            let status = self.get_job_status(job_id).await?;
            debug!(
                job_id,
                status = %status.status,
                progress = ?status.progress,
                "polled job status"
            );

            if status.status.is_terminal() {
                info!(job_id, status = %status.status, "job reached terminal status");
                return self.get_job_result(job_id).await;
            }

            if let Some(limit) = timeout {
                if start.elapsed() > limit {
                    warn!(job_id, ?limit, "gave up waiting for job");
                    return Err(OcrError::Timeout {
                        job_id: job_id.to_string(),
                        timeout: limit,
                    });
                }
            }

            sleep(poll_interval).await;
        }
    }

    /// [`wait_for_result`](Self::wait_for_result) with cadence and timeout
    /// taken from [`ProcessOptions`], falling back to the client defaults.
    pub async fn wait_with_options(
        &self,
        job_id: &str,
        options: &ProcessOptions,
        timeout_override: Option<Duration>,
    ) -> Result<JobResult, OcrError> {
        let timeout = timeout_override
            .or(options.timeout)
            .or(self.config.job_timeout);
        self.wait_for_result(job_id, timeout, options.poll_interval)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{
        SubmitResponse, TransportError, UploadTargetResponse,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal transport stub: canned responses, records upload attempts.
    #[derive(Default)]
    struct StubTransport {
        submit_status: Option<&'static str>,
        fail_put_with: Option<u16>,
        uploaded_bytes: Mutex<usize>,
    }

    #[async_trait]
    impl OcrTransport for StubTransport {
        async fn submit_from_url(
            &self,
            request: SubmitUrlRequest,
        ) -> Result<SubmitResponse, TransportError> {
            assert!(!request.url.is_empty());
            Ok(SubmitResponse {
                job_id: "job-stub".into(),
                status: self.submit_status.map(|s| JobStatus::parse(s)),
                created_at: None,
            })
        }

        async fn request_upload_target(
            &self,
            _request: UploadTargetRequest,
        ) -> Result<UploadTargetResponse, TransportError> {
            Ok(UploadTargetResponse {
                job_id: "job-upload".into(),
                upload_url: "https://bucket.example.com/put/abc".into(),
                headers: HashMap::from([("content-type".into(), "application/pdf".into())]),
            })
        }

        async fn upload_bytes(
            &self,
            _upload_url: &str,
            _headers: &HashMap<String, String>,
            bytes: Vec<u8>,
        ) -> Result<(), TransportError> {
            if let Some(status) = self.fail_put_with {
                return Err(TransportError::http(status, None));
            }
            *self.uploaded_bytes.lock().unwrap() += bytes.len();
            Ok(())
        }

        async fn get_status(&self, job_id: &str) -> Result<JobStatusInfo, TransportError> {
            Ok(JobStatusInfo {
                job_id: job_id.into(),
                status: JobStatus::Completed,
                progress: Some(100.0),
                error_message: None,
                created_at: None,
                updated_at: None,
            })
        }

        async fn get_result(&self, job_id: &str) -> Result<JobResult, TransportError> {
            Ok(JobResult {
                job_id: job_id.into(),
                status: JobStatus::Completed,
                data: Some(serde_json::json!({"text": "ok"})),
                pages: None,
                credits_used: Some(1),
                processing_time: None,
                error_message: None,
                created_at: None,
                completed_at: None,
            })
        }
    }

    fn client_with(transport: StubTransport) -> OcrClient {
        OcrClient::new(ClientConfig::new("key").unwrap(), Arc::new(transport))
    }

    #[tokio::test]
    async fn submit_without_status_defaults_to_pending() {
        let client = client_with(StubTransport::default());
        let job = client
            .process_url("https://example.com/a.pdf", &ProcessOptions::default())
            .await
            .unwrap();
        assert_eq!(job.id, "job-stub");
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn submit_keeps_reported_status() {
        let client = client_with(StubTransport {
            submit_status: Some("processing"),
            ..Default::default()
        });
        let job = client
            .process_url("https://example.com/a.pdf", &ProcessOptions::default())
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn upload_transfers_bytes_and_reports_uploaded() {
        let transport = Arc::new(StubTransport::default());
        let client = OcrClient::new(
            ClientConfig::new("key").unwrap(),
            Arc::clone(&transport) as Arc<dyn OcrTransport>,
        );
        let source = DocumentSource::Bytes(vec![0u8; 64]);
        let upload = client
            .upload_file(&source, &ProcessOptions::default())
            .await
            .unwrap();
        assert_eq!(upload.job_id, "job-upload");
        assert_eq!(upload.status, "uploaded");
        assert_eq!(*transport.uploaded_bytes.lock().unwrap(), 64);
    }

    #[tokio::test]
    async fn failed_put_surfaces_as_retryable_upload_error() {
        let client = client_with(StubTransport {
            fail_put_with: Some(503),
            ..Default::default()
        });
        let source = DocumentSource::Bytes(vec![0u8; 8]);
        let err = client
            .upload_file(&source, &ProcessOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Upload { status: Some(503), .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn url_source_rejected_for_upload() {
        let client = client_with(StubTransport::default());
        let source = DocumentSource::Url("https://example.com/a.pdf".into());
        let err = client
            .upload_file(&source, &ProcessOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Client { .. }));
    }

    #[tokio::test]
    async fn upload_reads_file_from_disk() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7 fake").unwrap();

        let client = client_with(StubTransport::default());
        let source = DocumentSource::Path(file.path().to_path_buf());
        let upload = client
            .upload_file(&source, &ProcessOptions::default())
            .await
            .unwrap();
        assert_eq!(upload.job_id, "job-upload");
    }

    #[tokio::test]
    async fn missing_file_wraps_into_client_error() {
        let client = client_with(StubTransport::default());
        let source = DocumentSource::Path("/nonexistent/doc.pdf".into());
        let err = client
            .upload_file(&source, &ProcessOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Client { .. }));
        assert!(err.to_string().contains("/nonexistent/doc.pdf"));
    }
}
