//! Blocking variants of the client and service.
//!
//! The async implementations are the single source of truth for every
//! algorithm — the poll loop, the upload phases, both batch shapes. The
//! types here own a private current-thread tokio runtime and drive those
//! same futures with `block_on`, so the two disciplines differ only in how
//! idle time is spent: a blocked thread here, a suspended task there.
//! Observable behaviour is identical.
//!
//! Do not use these types from inside an async context; blocking a runtime
//! worker thread deadlocks the runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::config::ClientConfig;
use crate::error::OcrError;
use crate::service::ProcessOutcome;
use crate::transport::OcrTransport;
use crate::types::{
    DocumentSource, FileUploadResult, Job, JobResult, JobStatusInfo, PageRecord, ProcessOptions,
};

fn new_runtime() -> Result<Runtime, OcrError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| OcrError::unexpected(format!("failed to create tokio runtime: {e}")))
}

/// Blocking counterpart of [`crate::OcrClient`].
///
/// # Example
/// ```rust,no_run
/// use leapocr::blocking::OcrClient;
/// use leapocr::{ClientConfig, ProcessOptions};
///
/// # fn main() -> Result<(), leapocr::OcrError> {
/// let client = OcrClient::from_config(ClientConfig::new("sk-key")?)?;
/// let job = client.process_url("https://example.com/doc.pdf", &ProcessOptions::default())?;
/// let result = client.wait_for_result(&job.id, None, std::time::Duration::from_secs(2))?;
/// # Ok(())
/// # }
/// ```
pub struct OcrClient {
    inner: crate::OcrClient,
    runtime: Runtime,
}

impl OcrClient {
    /// Build a blocking client over the production HTTP transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, OcrError> {
        Ok(Self {
            inner: crate::OcrClient::from_config(config)?,
            runtime: new_runtime()?,
        })
    }

    /// Build a blocking client over a caller-supplied transport.
    pub fn new(config: ClientConfig, transport: Arc<dyn OcrTransport>) -> Result<Self, OcrError> {
        Ok(Self {
            inner: crate::OcrClient::new(config, transport),
            runtime: new_runtime()?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    /// See [`crate::OcrClient::process_url`].
    pub fn process_url(&self, url: &str, options: &ProcessOptions) -> Result<Job, OcrError> {
        self.runtime.block_on(self.inner.process_url(url, options))
    }

    /// See [`crate::OcrClient::upload_file`].
    pub fn upload_file(
        &self,
        source: &DocumentSource,
        options: &ProcessOptions,
    ) -> Result<FileUploadResult, OcrError> {
        self.runtime
            .block_on(self.inner.upload_file(source, options))
    }

    /// See [`crate::OcrClient::get_job_status`].
    pub fn get_job_status(&self, job_id: &str) -> Result<JobStatusInfo, OcrError> {
        self.runtime.block_on(self.inner.get_job_status(job_id))
    }

    /// See [`crate::OcrClient::get_job_result`].
    pub fn get_job_result(&self, job_id: &str) -> Result<JobResult, OcrError> {
        self.runtime.block_on(self.inner.get_job_result(job_id))
    }

    /// See [`crate::OcrClient::wait_for_result`]. Blocks the calling thread
    /// between polls.
    pub fn wait_for_result(
        &self,
        job_id: &str,
        timeout: Option<Duration>,
        poll_interval: Duration,
    ) -> Result<JobResult, OcrError> {
        self.runtime
            .block_on(self.inner.wait_for_result(job_id, timeout, poll_interval))
    }
}

/// Blocking counterpart of [`crate::OcrService`].
pub struct OcrService {
    inner: crate::OcrService,
    runtime: Runtime,
}

impl OcrService {
    /// Build a blocking service over the production HTTP transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, OcrError> {
        let client = crate::OcrClient::from_config(config)?;
        Ok(Self {
            inner: crate::OcrService::new(client),
            runtime: new_runtime()?,
        })
    }

    /// Build a blocking service over a caller-supplied transport.
    pub fn new(config: ClientConfig, transport: Arc<dyn OcrTransport>) -> Result<Self, OcrError> {
        let client = crate::OcrClient::new(config, transport);
        Ok(Self {
            inner: crate::OcrService::new(client),
            runtime: new_runtime()?,
        })
    }

    /// See [`crate::OcrService::process_document`].
    pub fn process_document(
        &self,
        source: &DocumentSource,
        options: &ProcessOptions,
        wait_for_result: bool,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutcome, OcrError> {
        self.runtime.block_on(self.inner.process_document(
            source,
            options,
            wait_for_result,
            timeout,
        ))
    }

    /// See [`crate::OcrService::batch_process_chunked`]. The group-based
    /// shape is the natural blocking batch: one group in flight at a time,
    /// the calling thread blocked until it resolves.
    pub fn batch_process(
        &self,
        sources: &[DocumentSource],
        options: &ProcessOptions,
        max_concurrent: Option<usize>,
        wait_for_all: bool,
        timeout: Option<Duration>,
    ) -> Vec<ProcessOutcome> {
        self.runtime.block_on(self.inner.batch_process_chunked(
            sources,
            options,
            max_concurrent,
            wait_for_all,
            timeout,
        ))
    }

    /// See [`crate::OcrService::extract_text`].
    pub fn extract_text(
        &self,
        source: &DocumentSource,
        timeout: Option<Duration>,
    ) -> Result<String, OcrError> {
        self.runtime
            .block_on(self.inner.extract_text(source, timeout))
    }

    /// See [`crate::OcrService::extract_structured`].
    pub fn extract_structured(
        &self,
        source: &DocumentSource,
        schema_id: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value, OcrError> {
        self.runtime
            .block_on(self.inner.extract_structured(source, schema_id, timeout))
    }

    /// See [`crate::OcrService::page_results`].
    pub fn page_results(&self, result: &JobResult) -> Vec<PageRecord> {
        self.inner.page_results(result)
    }

    /// See [`crate::OcrService::validate_job_result`].
    pub fn validate_job_result(&self, result: &JobResult) -> bool {
        self.inner.validate_job_result(result)
    }
}
