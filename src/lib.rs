//! # leapocr
//!
//! Client SDK for the LeapOCR document-processing API.
//!
//! LeapOCR runs OCR jobs asynchronously: you submit a document, the
//! service hands back a job id, and the extraction happens server-side.
//! This crate wraps that lifecycle in typed requests and responses plus a
//! small orchestration layer — polling with a deadline, bounded-concurrency
//! batches, and a closed error taxonomy with a retryability flag.
//!
//! ## Job Lifecycle
//!
//! ```text
//! document (URL / file / bytes)
//!  │
//!  ├─ 1. Submit   POST by URL, or presigned-target upload for local bytes
//!  ├─ 2. Poll     fixed-interval status fetches until terminal or deadline
//!  └─ 3. Resolve  fetch JobResult (data, pages, credits, timings)
//! ```
//!
//! Batches run that pipeline per item under a concurrency cap, isolate
//! failures per item, and keep output order equal to input order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leapocr::{ClientConfig, OcrClient, OcrService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), leapocr::OcrError> {
//!     let config = ClientConfig::new(std::env::var("LEAPOCR_API_KEY").unwrap())?;
//!     let service = OcrService::new(OcrClient::from_config(config)?);
//!
//!     let text = service
//!         .extract_text(&"https://example.com/invoice.pdf".into(), None)
//!         .await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! ## Sync or async
//!
//! Every operation exists in both disciplines. The async types
//! ([`OcrClient`], [`OcrService`]) suspend cooperatively while waiting, so
//! many jobs can be awaited on one runtime; the [`blocking`] module offers
//! the same API for programs without an async runtime. Results are
//! identical either way.
//!
//! ## Errors & retries
//!
//! Every failure is an [`OcrError`] kind with a status code (when known)
//! and an [`OcrError::is_retryable`] answer. The SDK itself never retries;
//! wrap calls with [`retry`] when you want backoff.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod service;
pub mod transport;
pub mod types;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::OcrClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use error::OcrError;
pub use retry::{retry, RetryPolicy};
pub use service::{OcrService, ProcessOutcome};
pub use transport::{HttpTransport, OcrTransport, TransportError};
pub use types::{
    DocumentSource, FileUploadResult, Job, JobResult, JobStatus, JobStatusInfo, PageRecord,
    ProcessFormat, ProcessOptions, ProcessOptionsBuilder, ProcessTier,
};
