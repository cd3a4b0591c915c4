//! High-level orchestration: source dispatch, batches, and convenience
//! extraction.
//!
//! [`OcrService`] composes the [`OcrClient`] operations into whole-document
//! workflows. The batch orchestrator comes in two shapes sharing one
//! per-item pipeline:
//!
//! * [`OcrService::batch_process`] — every item is scheduled at once and a
//!   counting semaphore keeps at most `max_concurrent` in flight. No group
//!   boundaries; a slot frees as soon as any item finishes.
//! * [`OcrService::batch_process_chunked`] — consecutive groups of at most
//!   `max_concurrent` items, each group fully submitted (and, when waiting,
//!   fully resolved) before the next begins. The natural shape when calls
//!   must not interleave across groups.
//!
//! Both variants isolate failures per item: an error becomes a failed
//! [`JobResult`] with a synthetic `error_{index}` id, and `output[i]`
//! always corresponds to `sources[i]` regardless of completion order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::client::OcrClient;
use crate::error::OcrError;
use crate::types::{
    DocumentSource, Job, JobResult, JobStatus, PageRecord, ProcessFormat, ProcessOptions,
};

/// What a processing call produced: a handle to watch, or a finished result.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Submission only — the job is still running server-side.
    Submitted(Job),
    /// The job was waited on and reached a terminal state.
    Finished(JobResult),
}

impl ProcessOutcome {
    /// The job handle, when this outcome is a bare submission.
    pub fn job(&self) -> Option<&Job> {
        match self {
            ProcessOutcome::Submitted(job) => Some(job),
            ProcessOutcome::Finished(_) => None,
        }
    }

    /// The terminal result, when this outcome finished.
    pub fn result(&self) -> Option<&JobResult> {
        match self {
            ProcessOutcome::Submitted(_) => None,
            ProcessOutcome::Finished(result) => Some(result),
        }
    }

    /// The job id, whichever side this outcome is on.
    pub fn job_id(&self) -> &str {
        match self {
            ProcessOutcome::Submitted(job) => &job.id,
            ProcessOutcome::Finished(result) => &result.job_id,
        }
    }
}

/// High-level OCR processing service over an [`OcrClient`].
///
/// # Example
/// ```rust,no_run
/// use leapocr::{ClientConfig, OcrClient, OcrService};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), leapocr::OcrError> {
/// let client = OcrClient::from_config(ClientConfig::new("sk-key")?)?;
/// let service = OcrService::new(client);
/// let text = service
///     .extract_text(&"https://example.com/receipt.png".into(), None)
///     .await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OcrService {
    client: OcrClient,
}

impl OcrService {
    pub fn new(client: OcrClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &OcrClient {
        &self.client
    }

    // ── Single document ──────────────────────────────────────────────────

    /// Process one document from any source.
    ///
    /// URLs are submitted by reference; paths and bytes go through the
    /// presigned upload. With `wait_for_result`, the call polls to a
    /// terminal state and returns [`ProcessOutcome::Finished`]; otherwise it
    /// returns the job handle immediately. `timeout` overrides the
    /// per-options and per-client defaults for this call only.
    pub async fn process_document(
        &self,
        source: &DocumentSource,
        options: &ProcessOptions,
        wait_for_result: bool,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutcome, OcrError> {
        let job = self.submit(source, options).await?;

        if wait_for_result {
            let result = self
                .client
                .wait_with_options(&job.id, options, timeout)
                .await?;
            Ok(ProcessOutcome::Finished(result))
        } else {
            Ok(ProcessOutcome::Submitted(job))
        }
    }

    /// Submit one document without waiting, whatever its source.
    async fn submit(
        &self,
        source: &DocumentSource,
        options: &ProcessOptions,
    ) -> Result<Job, OcrError> {
        match source {
            DocumentSource::Url(url) => self.client.process_url(url, options).await,
            DocumentSource::Path(_) | DocumentSource::Bytes(_) => {
                let upload = self.client.upload_file(source, options).await?;
                // The upload result bridges back into the job abstraction.
                Ok(Job {
                    id: upload.job_id,
                    status: JobStatus::Pending,
                    created_at: None,
                })
            }
        }
    }

    // ── Batch orchestration ──────────────────────────────────────────────

    /// Process many documents with cooperative concurrency.
    ///
    /// All items are scheduled at once; a semaphore of `max_concurrent`
    /// permits (default: the client config value) bounds how many are in
    /// flight, each permit held for the item's full processing — including
    /// polling when `wait_for_all` is set — and released on every exit
    /// path. A failed item never aborts the batch: it yields a failed
    /// [`JobResult`] whose synthetic `error_{index}` id distinguishes it
    /// from any real job.
    pub async fn batch_process(
        &self,
        sources: &[DocumentSource],
        options: &ProcessOptions,
        max_concurrent: Option<usize>,
        wait_for_all: bool,
        timeout: Option<Duration>,
    ) -> Vec<ProcessOutcome> {
        let cap = self.effective_cap(max_concurrent);
        info!(
            items = sources.len(),
            cap, wait_for_all, "starting cooperative batch"
        );
        let semaphore = Arc::new(Semaphore::new(cap));

        let tasks = sources.iter().enumerate().map(|(index, source)| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // Closing the semaphore is never done here, so acquire can
                // only fail if the semaphore is dropped — unreachable while
                // this future borrows it.
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                match self
                    .process_document(source, options, wait_for_all, timeout)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        warn!(index, %error, "batch item failed");
                        ProcessOutcome::Finished(JobResult::failed_placeholder(index, &error))
                    }
                }
            }
        });

        // join_all preserves input order regardless of completion order.
        join_all(tasks).await
    }

    /// Process many documents in consecutive groups.
    ///
    /// The input is partitioned into chunks of at most `max_concurrent`
    /// items. Each chunk is fully submitted, then — when `wait_for_all` —
    /// fully resolved, before the next chunk starts. Failures are isolated
    /// per item exactly as in [`OcrService::batch_process`].
    pub async fn batch_process_chunked(
        &self,
        sources: &[DocumentSource],
        options: &ProcessOptions,
        max_concurrent: Option<usize>,
        wait_for_all: bool,
        timeout: Option<Duration>,
    ) -> Vec<ProcessOutcome> {
        let cap = self.effective_cap(max_concurrent);
        info!(
            items = sources.len(),
            cap, wait_for_all, "starting chunked batch"
        );
        let mut outcomes = Vec::with_capacity(sources.len());

        for (chunk_index, chunk) in sources.chunks(cap).enumerate() {
            let base = chunk_index * cap;

            // Submit everything in the group first.
            let mut submitted: Vec<Result<Job, OcrError>> = Vec::with_capacity(chunk.len());
            for (offset, source) in chunk.iter().enumerate() {
                let index = base + offset;
                match self.submit(source, options).await {
                    Ok(job) => submitted.push(Ok(job)),
                    Err(error) => {
                        warn!(index, %error, "batch item failed at submission");
                        submitted.push(Err(error));
                    }
                }
            }

            // Then resolve the group before the next one starts.
            for (offset, entry) in submitted.into_iter().enumerate() {
                let index = base + offset;
                match entry {
                    Err(error) => outcomes.push(ProcessOutcome::Finished(
                        JobResult::failed_placeholder(index, &error),
                    )),
                    Ok(job) if !wait_for_all => outcomes.push(ProcessOutcome::Submitted(job)),
                    Ok(job) => {
                        match self.client.wait_with_options(&job.id, options, timeout).await {
                            Ok(result) => outcomes.push(ProcessOutcome::Finished(result)),
                            Err(error) => {
                                warn!(index, job_id = %job.id, %error, "batch item failed while waiting");
                                outcomes.push(ProcessOutcome::Finished(
                                    JobResult::failed_placeholder(index, &error),
                                ));
                            }
                        }
                    }
                }
            }
        }

        outcomes
    }

    // ── Convenience extraction ───────────────────────────────────────────

    /// Extract plain text from a document.
    ///
    /// Submits with `format=text`, waits for completion, and returns
    /// `data["text"]`. Missing or invalid results surface as a classified
    /// error rather than an empty success.
    pub async fn extract_text(
        &self,
        source: &DocumentSource,
        timeout: Option<Duration>,
    ) -> Result<String, OcrError> {
        let options = ProcessOptions::builder().format(ProcessFormat::Text).build();
        let outcome = self
            .process_document(source, &options, true, timeout)
            .await?;

        match outcome.result().and_then(|r| r.data.as_ref()) {
            Some(data) => Ok(data
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string()),
            None => Err(OcrError::unexpected(
                "failed to extract text from document: result carries no data",
            )),
        }
    }

    /// Extract structured data from a document, optionally against a
    /// caller-defined schema.
    pub async fn extract_structured(
        &self,
        source: &DocumentSource,
        schema_id: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value, OcrError> {
        let mut builder = ProcessOptions::builder().format(ProcessFormat::Structured);
        if let Some(id) = schema_id {
            builder = builder.schema_id(id);
        }
        let options = builder.build();

        let outcome = self
            .process_document(source, &options, true, timeout)
            .await?;
        match outcome.result().and_then(|r| r.data.clone()) {
            Some(data) => Ok(data),
            None => Err(OcrError::unexpected(
                "failed to extract structured data: result carries no data",
            )),
        }
    }

    /// Parse the per-page breakdown out of a result.
    ///
    /// Pages that do not decode cleanly become default records rather than
    /// dropping the whole breakdown.
    pub fn page_results(&self, result: &JobResult) -> Vec<PageRecord> {
        let Some(pages) = &result.pages else {
            return Vec::new();
        };
        pages
            .iter()
            .map(|page| serde_json::from_value(page.clone()).unwrap_or_default())
            .collect()
    }

    /// Whether a result is a usable, completed extraction.
    ///
    /// See [`JobResult::is_valid`] for the rule.
    pub fn validate_job_result(&self, result: &JobResult) -> bool {
        result.is_valid()
    }

    fn effective_cap(&self, max_concurrent: Option<usize>) -> usize {
        max_concurrent
            .unwrap_or(self.client.config().max_concurrent)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::{
        OcrTransport, SubmitResponse, SubmitUrlRequest, TransportError, UploadTargetRequest,
        UploadTargetResponse,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    struct NoopTransport;

    #[async_trait]
    impl OcrTransport for NoopTransport {
        async fn submit_from_url(
            &self,
            _request: SubmitUrlRequest,
        ) -> Result<SubmitResponse, TransportError> {
            Err(TransportError::network("noop"))
        }
        async fn request_upload_target(
            &self,
            _request: UploadTargetRequest,
        ) -> Result<UploadTargetResponse, TransportError> {
            Err(TransportError::network("noop"))
        }
        async fn upload_bytes(
            &self,
            _upload_url: &str,
            _headers: &HashMap<String, String>,
            _bytes: Vec<u8>,
        ) -> Result<(), TransportError> {
            Err(TransportError::network("noop"))
        }
        async fn get_status(
            &self,
            _job_id: &str,
        ) -> Result<crate::types::JobStatusInfo, TransportError> {
            Err(TransportError::network("noop"))
        }
        async fn get_result(&self, _job_id: &str) -> Result<JobResult, TransportError> {
            Err(TransportError::network("noop"))
        }
    }

    fn service() -> OcrService {
        let client = OcrClient::new(
            ClientConfig::new("key").unwrap(),
            std::sync::Arc::new(NoopTransport),
        );
        OcrService::new(client)
    }

    fn result_with_pages(pages: Vec<serde_json::Value>) -> JobResult {
        JobResult {
            job_id: "job-1".into(),
            status: JobStatus::Completed,
            data: None,
            pages: Some(pages),
            credits_used: None,
            processing_time: None,
            error_message: None,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn page_results_parse_typed_records() {
        let result = result_with_pages(vec![
            json!({"page_number": 1, "text": "hello", "confidence": 0.98}),
            json!({"page_number": 2, "tables": [{"rows": 3}]}),
        ]);
        let pages = service().page_results(&result);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].text.as_deref(), Some("hello"));
        assert_eq!(pages[1].tables.len(), 1);
    }

    #[test]
    fn undecodable_page_becomes_default_record() {
        let result = result_with_pages(vec![json!("not an object")]);
        let pages = service().page_results(&result);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], PageRecord::default());
    }

    #[test]
    fn page_results_empty_without_pages() {
        let mut result = result_with_pages(vec![]);
        result.pages = None;
        assert!(service().page_results(&result).is_empty());
    }

    #[test]
    fn outcome_accessors() {
        let job = Job {
            id: "job-7".into(),
            status: JobStatus::Pending,
            created_at: None,
        };
        let outcome = ProcessOutcome::Submitted(job);
        assert_eq!(outcome.job_id(), "job-7");
        assert!(outcome.job().is_some());
        assert!(outcome.result().is_none());
    }
}
