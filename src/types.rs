//! Data model for the LeapOCR job API.
//!
//! Everything here is a value object: constructed once from a server
//! response (or by the caller, for [`ProcessOptions`]) and never mutated
//! afterwards. A [`Job`] is a handle to a durable remote resource — its
//! `id` is assigned once by the service and every status/result call keys
//! exclusively on it.
//!
//! ## Status handling
//!
//! The API returns statuses as strings. Known values map onto the closed
//! [`JobStatus`] set; anything else is preserved verbatim in
//! [`JobStatus::Unrecognized`] so downstream code can detect new statuses
//! without data loss. The same keep-don't-reject rule applies to
//! [`ProcessFormat`] and [`ProcessTier`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ── Status ───────────────────────────────────────────────────────────────

/// Lifecycle state of a remote processing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    /// A status string the SDK does not recognise, preserved verbatim.
    Unrecognized(String),
}

impl JobStatus {
    /// Parse a status string. Matching is case-insensitive; unknown values
    /// are kept as-is rather than coerced.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Unrecognized(raw.to_string()),
        }
    }

    /// Whether no further state transitions can occur for this job.
    ///
    /// Terminal set: completed, failed, cancelled. Unrecognised statuses
    /// are treated as non-terminal so the poller keeps watching them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// The wire representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        JobStatus::parse(&raw)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Processing options ───────────────────────────────────────────────────

/// Output format requested from the OCR service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessFormat {
    /// Structured extraction keyed by schema. (default)
    #[default]
    Structured,
    /// Plain text extraction.
    Text,
    /// Table extraction only.
    Tables,
    /// Form-field extraction.
    Forms,
    /// A format string the SDK does not recognise, passed through as-is.
    Other(String),
}

impl ProcessFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ProcessFormat::Structured => "structured",
            ProcessFormat::Text => "text",
            ProcessFormat::Tables => "tables",
            ProcessFormat::Forms => "forms",
            ProcessFormat::Other(raw) => raw,
        }
    }
}

impl From<String> for ProcessFormat {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "structured" => ProcessFormat::Structured,
            "text" => ProcessFormat::Text,
            "tables" => ProcessFormat::Tables,
            "forms" => ProcessFormat::Forms,
            _ => ProcessFormat::Other(raw),
        }
    }
}

impl From<ProcessFormat> for String {
    fn from(format: ProcessFormat) -> Self {
        format.as_str().to_string()
    }
}

/// Processing tier controlling model quality and cost.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessTier {
    #[default]
    Core,
    Premium,
    Enterprise,
    /// A tier string the SDK does not recognise, passed through as-is.
    Other(String),
}

impl ProcessTier {
    pub fn as_str(&self) -> &str {
        match self {
            ProcessTier::Core => "core",
            ProcessTier::Premium => "premium",
            ProcessTier::Enterprise => "enterprise",
            ProcessTier::Other(raw) => raw,
        }
    }
}

impl From<String> for ProcessTier {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "core" => ProcessTier::Core,
            "premium" => ProcessTier::Premium,
            "enterprise" => ProcessTier::Enterprise,
            _ => ProcessTier::Other(raw),
        }
    }
}

impl From<ProcessTier> for String {
    fn from(tier: ProcessTier) -> Self {
        tier.as_str().to_string()
    }
}

/// Options applied to a single document submission.
///
/// Built via [`ProcessOptions::builder()`] or [`ProcessOptions::default()`].
///
/// # Example
/// ```rust
/// use leapocr::{ProcessFormat, ProcessOptions, ProcessTier};
/// use std::time::Duration;
///
/// let options = ProcessOptions::builder()
///     .format(ProcessFormat::Text)
///     .tier(ProcessTier::Premium)
///     .timeout(Duration::from_secs(120))
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOptions {
    pub format: ProcessFormat,
    pub tier: ProcessTier,
    /// Project to associate the job with.
    pub project_id: Option<String>,
    /// Custom schema for structured extraction.
    pub schema_id: Option<String>,
    /// Custom extraction instruction.
    pub instruction_id: Option<String>,
    /// Document category hint.
    pub category_id: Option<String>,
    /// Webhook notified on job completion.
    pub webhook_url: Option<String>,
    /// Per-job wall-clock limit when waiting for completion.
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Fixed delay between status polls. Default: 2 s.
    pub poll_interval: Duration,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            format: ProcessFormat::default(),
            tier: ProcessTier::default(),
            project_id: None,
            schema_id: None,
            instruction_id: None,
            category_id: None,
            webhook_url: None,
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ProcessOptions {
    /// Create a new builder for `ProcessOptions`.
    pub fn builder() -> ProcessOptionsBuilder {
        ProcessOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Builder for [`ProcessOptions`].
#[derive(Debug)]
pub struct ProcessOptionsBuilder {
    options: ProcessOptions,
}

impl ProcessOptionsBuilder {
    pub fn format(mut self, format: impl Into<ProcessFormat>) -> Self {
        self.options.format = format.into();
        self
    }

    pub fn tier(mut self, tier: impl Into<ProcessTier>) -> Self {
        self.options.tier = tier.into();
        self
    }

    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.options.project_id = Some(id.into());
        self
    }

    pub fn schema_id(mut self, id: impl Into<String>) -> Self {
        self.options.schema_id = Some(id.into());
        self
    }

    pub fn instruction_id(mut self, id: impl Into<String>) -> Self {
        self.options.instruction_id = Some(id.into());
        self
    }

    pub fn category_id(mut self, id: impl Into<String>) -> Self {
        self.options.category_id = Some(id.into());
        self
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.options.webhook_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    pub fn build(self) -> ProcessOptions {
        self.options
    }
}

// ── Document source ──────────────────────────────────────────────────────

/// Where a document comes from: a remote URL, a local file, or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// HTTP/HTTPS URL fetched by the service itself.
    Url(String),
    /// Local file read fully into memory and uploaded.
    Path(PathBuf),
    /// In-memory bytes uploaded directly.
    Bytes(Vec<u8>),
}

impl DocumentSource {
    /// Interpret a string as a URL when it carries an HTTP scheme, and as a
    /// local path otherwise.
    pub fn detect(input: &str) -> Self {
        if is_url(input) {
            DocumentSource::Url(input.to_string())
        } else {
            DocumentSource::Path(PathBuf::from(input))
        }
    }
}

impl From<&str> for DocumentSource {
    fn from(input: &str) -> Self {
        DocumentSource::detect(input)
    }
}

impl From<String> for DocumentSource {
    fn from(input: String) -> Self {
        DocumentSource::detect(&input)
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<Vec<u8>> for DocumentSource {
    fn from(bytes: Vec<u8>) -> Self {
        DocumentSource::Bytes(bytes)
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

// ── Results ──────────────────────────────────────────────────────────────

/// Handle to a submitted processing job.
///
/// Returned immediately on submission; the actual work happens server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// A point-in-time snapshot of job progress, returned by a status poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusInfo {
    pub job_id: String,
    pub status: JobStatus,
    /// Completion percentage in `0.0..=100.0`, when the service reports it.
    pub progress: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Final payload of a job that reached a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub status: JobStatus,
    /// Extracted payload; shape depends on the requested format.
    pub data: Option<serde_json::Value>,
    /// Per-page breakdown, in page order. See
    /// [`crate::service::OcrService::page_results`] for typed access.
    pub pages: Option<Vec<serde_json::Value>>,
    pub credits_used: Option<u64>,
    /// Server-side processing time in seconds.
    pub processing_time: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobResult {
    /// Whether this result represents a usable, completed extraction.
    ///
    /// True only when the job completed, reported no error, and carries a
    /// non-empty `data` or `pages` payload. An empty object, array, or null
    /// in `data` does not count as populated.
    pub fn is_valid(&self) -> bool {
        if self.status != JobStatus::Completed {
            return false;
        }
        if self.error_message.is_some() {
            return false;
        }
        let data_populated = self.data.as_ref().is_some_and(|d| match d {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::Array(items) => !items.is_empty(),
            _ => true,
        });
        data_populated || self.pages.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Build the failed placeholder result used by batch processing when an
    /// item errors. The synthetic id (`error_{index}`) is distinguishable
    /// from any real job id.
    pub(crate) fn failed_placeholder(index: usize, error: &crate::error::OcrError) -> Self {
        JobResult {
            job_id: format!("error_{index}"),
            status: JobStatus::Failed,
            data: None,
            pages: None,
            credits_used: None,
            processing_time: None,
            error_message: Some(error.to_string()),
            created_at: None,
            completed_at: None,
        }
    }
}

/// Outcome of the two-phase presigned upload: the job that will process the
/// bytes, plus the target they were transferred to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUploadResult {
    pub job_id: String,
    pub upload_url: String,
    pub headers: HashMap<String, String>,
    pub status: String,
}

/// Extraction results for a single page, parsed from [`JobResult::pages`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tables: Vec<serde_json::Value>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(JobStatus::parse("COMPLETED"), JobStatus::Completed);
        assert_eq!(JobStatus::parse("Pending"), JobStatus::Pending);
        assert_eq!(JobStatus::parse("cancelled"), JobStatus::Cancelled);
    }

    #[test]
    fn unknown_status_preserved_verbatim() {
        let status = JobStatus::parse("Quarantined");
        assert_eq!(status, JobStatus::Unrecognized("Quarantined".into()));
        assert_eq!(status.as_str(), "Quarantined");
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_set() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn status_serde_round_trip() {
        let status: JobStatus = serde_json::from_value(json!("processing")).unwrap();
        assert_eq!(status, JobStatus::Processing);
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("processing"));

        let odd: JobStatus = serde_json::from_value(json!("archived")).unwrap();
        assert_eq!(serde_json::to_value(&odd).unwrap(), json!("archived"));
    }

    #[test]
    fn format_and_tier_keep_raw_strings() {
        assert_eq!(ProcessFormat::from("TEXT".to_string()), ProcessFormat::Text);
        assert_eq!(
            ProcessFormat::from("handwriting".to_string()),
            ProcessFormat::Other("handwriting".into())
        );
        assert_eq!(ProcessTier::from("premium".to_string()), ProcessTier::Premium);
        assert_eq!(
            ProcessTier::from("gold".to_string()),
            ProcessTier::Other("gold".into())
        );
    }

    #[test]
    fn options_builder_defaults() {
        let options = ProcessOptions::builder().build();
        assert_eq!(options.format, ProcessFormat::Structured);
        assert_eq!(options.tier, ProcessTier::Core);
        assert_eq!(options.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(options.timeout.is_none());
        assert!(options.schema_id.is_none());
    }

    #[test]
    fn document_source_detection() {
        assert_eq!(
            DocumentSource::detect("https://example.com/doc.pdf"),
            DocumentSource::Url("https://example.com/doc.pdf".into())
        );
        assert_eq!(
            DocumentSource::detect("/tmp/doc.pdf"),
            DocumentSource::Path(PathBuf::from("/tmp/doc.pdf"))
        );
        assert!(matches!(
            DocumentSource::from(vec![1u8, 2, 3]),
            DocumentSource::Bytes(_)
        ));
    }

    fn completed_result() -> JobResult {
        JobResult {
            job_id: "job-1".into(),
            status: JobStatus::Completed,
            data: Some(json!({"x": 1})),
            pages: None,
            credits_used: Some(3),
            processing_time: Some(1.5),
            error_message: None,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn result_validity_rule() {
        assert!(completed_result().is_valid());

        let mut not_terminal = completed_result();
        not_terminal.status = JobStatus::Processing;
        assert!(!not_terminal.is_valid());

        let mut with_error = completed_result();
        with_error.error_message = Some("boom".into());
        assert!(!with_error.is_valid());

        let mut empty = completed_result();
        empty.data = None;
        empty.pages = None;
        assert!(!empty.is_valid());

        let mut pages_only = completed_result();
        pages_only.data = None;
        pages_only.pages = Some(vec![json!({"page_number": 1})]);
        assert!(pages_only.is_valid());
    }

    #[test]
    fn empty_data_payloads_are_not_populated() {
        let mut empty_object = completed_result();
        empty_object.data = Some(json!({}));
        assert!(!empty_object.is_valid());

        let mut null_data = completed_result();
        null_data.data = Some(json!(null));
        assert!(!null_data.is_valid());

        let mut empty_array = completed_result();
        empty_array.data = Some(json!([]));
        assert!(!empty_array.is_valid());

        // An empty data payload still validates when pages carry content.
        let mut pages_rescue = completed_result();
        pages_rescue.data = Some(json!({}));
        pages_rescue.pages = Some(vec![json!({"page_number": 1})]);
        assert!(pages_rescue.is_valid());
    }

    #[test]
    fn failed_placeholder_has_synthetic_id() {
        let err = crate::error::OcrError::unexpected("network down");
        let result = JobResult::failed_placeholder(4, &err);
        assert_eq!(result.job_id, "error_4");
        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.error_message.unwrap().contains("network down"));
    }
}
