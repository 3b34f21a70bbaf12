//! Download resolution and retrieval.
//!
//! - [`endpoints`] - ordered candidate URLs per file
//! - [`RetryPolicy`] - exponential backoff around metadata resolution
//! - [`DriveDownloader`] - the retrieval engine
//! - [`DownloadError`] - error taxonomy shared by the whole crate
//!
//! # Example
//!
//! ```no_run
//! use drive_downloader::download::{DownloadOptions, DriveDownloader};
//! use drive_downloader::{DriveConfig, ExportFormat};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DriveDownloader::new(DriveConfig::default())?;
//! let options = DownloadOptions::default().with_export_format(ExportFormat::Pdf);
//! let result = downloader
//!     .download("https://docs.google.com/document/d/abc123/edit", &options)
//!     .await;
//! if let Some(error) = result.error() {
//!     eprintln!("failed: {error}");
//! }
//! # Ok(())
//! # }
//! ```

mod buffer;
mod confirm;
pub mod endpoints;
mod engine;
mod error;
mod retry;

pub use buffer::{drain_to_buffer, resolve_buffer_media_type, resolve_stream_media_type};
pub use confirm::extract_confirm_token;
pub use endpoints::{ServiceEndpoints, build_candidates};
pub use engine::{
    DEFAULT_REQUEST_TIMEOUT, DownloadOptions, DownloadResult, DownloadSuccess, DownloadedFile,
    DriveDownloader, FileContent,
};
pub use error::DownloadError;
pub use retry::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES, IsRetryable, RetryPolicy,
};

// Note: no module-local Result alias; signatures spell out
// `Result<T, DownloadError>`.
