//! Drive Downloader Library
//!
//! Retrieves publicly shared files given a sharing URL and returns the
//! content either fully buffered or as a live byte stream.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`identifier`] - sharing URL to file identifier
//! - [`format`] - export formats, media-type inference, file names
//! - [`metadata`] - name/type/size lookup with view-page fallback
//! - [`download`] - endpoint strategy, retry, retrieval engine
//! - [`transport`] - injected HTTP capability and its reqwest implementation
//! - [`persist`] - writing results to disk
//! - [`config`] - service origins, timeouts and limits
//!
//! # Example
//!
//! ```no_run
//! use drive_downloader::{DownloadOptions, DriveConfig, DriveDownloader, save_to_file};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DriveDownloader::new(DriveConfig::default())?;
//! let result = downloader
//!     .download("https://drive.google.com/file/d/abc123/view", &DownloadOptions::default())
//!     .await;
//! let bytes = save_to_file(result, Path::new("./downloads/report.pdf")).await?;
//! println!("saved {bytes} bytes");
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod format;
pub mod identifier;
pub mod metadata;
pub mod persist;
pub mod transport;
pub mod user_agent;

// Re-export commonly used types
pub use config::DriveConfig;
pub use download::{
    DEFAULT_MAX_RETRIES, DownloadError, DownloadOptions, DownloadResult, DownloadSuccess,
    DownloadedFile, DriveDownloader, FileContent, RetryPolicy, ServiceEndpoints,
    build_candidates,
};
pub use format::filename::sanitize_file_name;
pub use format::mime::{media_type_from_content, media_type_from_extension};
pub use format::{ExportFormat, available_formats};
pub use identifier::{IdentifierError, extract_file_id};
pub use metadata::{FileInfo, FileMetadata, MetadataSource};
pub use persist::save_to_file;
pub use transport::{HttpTransport, ReqwestTransport};
