//! Error types for the retrieval pipeline.
//!
//! Variants carry the URL, file identifier, or path they concern so that a
//! flattened `Failure { error }` string is still actionable.

use std::path::PathBuf;

use thiserror::Error;

use crate::identifier::IdentifierError;

/// Errors that can occur while resolving, fetching, or saving a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The sharing URL was empty or carried no recognizable identifier.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// Both metadata paths failed (only raised in strict metadata mode).
    #[error("metadata unavailable for {file_id}: {reason}")]
    MetadataUnavailable {
        /// Identifier whose metadata could not be resolved.
        file_id: String,
        /// Why the last path failed.
        reason: String,
    },

    /// Every candidate endpoint failed; carries the last candidate's error.
    #[error("all {attempted} download endpoints failed for {file_id}: {last_error}")]
    AllEndpointsFailed {
        /// Identifier being downloaded.
        file_id: String,
        /// Number of candidates tried.
        attempted: usize,
        /// Error returned by the final candidate.
        #[source]
        last_error: Box<DownloadError>,
    },

    /// The confirmation page carried no `confirm=` token.
    #[error("confirmation token not found in response from {url}")]
    ConfirmationTokenNotFound {
        /// Confirmation page URL.
        url: String,
    },

    /// The large-file confirmation flow failed.
    #[error("large file download failed for {file_id}: {source}")]
    LargeFile {
        /// Identifier being downloaded.
        file_id: String,
        /// The failure inside the confirmation flow.
        #[source]
        source: Box<DownloadError>,
    },

    /// Buffered content exceeded the configured ceiling.
    #[error("payload too large: exceeds the {limit_bytes}-byte buffer limit (use stream mode for large files)")]
    PayloadTooLarge {
        /// Configured ceiling in bytes.
        limit_bytes: u64,
    },

    /// A request or body drain did not finish in time.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Network-level error (DNS, connection refused, TLS, broken body, ...).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while saving.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// `save_to_file` was handed a failed result.
    #[error("download was not successful: {reason}")]
    DownloadNotSuccessful {
        /// The failure carried by the result.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a metadata-unavailable error.
    pub fn metadata_unavailable(file_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            file_id: file_id.into(),
            reason: reason.into(),
        }
    }

    /// Wraps the final candidate's error.
    pub fn all_endpoints_failed(
        file_id: impl Into<String>,
        attempted: usize,
        last_error: DownloadError,
    ) -> Self {
        Self::AllEndpointsFailed {
            file_id: file_id.into(),
            attempted,
            last_error: Box::new(last_error),
        }
    }

    /// Creates a missing-confirmation-token error.
    pub fn confirmation_token_not_found(url: impl Into<String>) -> Self {
        Self::ConfirmationTokenNotFound { url: url.into() }
    }

    /// Wraps a failure inside the large-file confirmation flow.
    pub fn large_file(file_id: impl Into<String>, source: DownloadError) -> Self {
        Self::LargeFile {
            file_id: file_id.into(),
            source: Box::new(source),
        }
    }

    /// Creates a payload-too-large error.
    #[must_use]
    pub fn payload_too_large(limit_bytes: u64) -> Self {
        Self::PayloadTooLarge { limit_bytes }
    }

    /// Creates a not-successful error for `save_to_file`.
    pub fn download_not_successful(reason: impl Into<String>) -> Self {
        Self::DownloadNotSuccessful {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true when repeating the operation may succeed.
    ///
    /// Input, configuration, local IO, and size-ceiling failures are final;
    /// network, timeout, server-side status, and metadata failures are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Identifier(_)
            | Self::Io { .. }
            | Self::PayloadTooLarge { .. }
            | Self::DownloadNotSuccessful { .. }
            | Self::InvalidConfig { .. }
            | Self::ConfirmationTokenNotFound { .. } => false,
            Self::HttpStatus { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            Self::MetadataUnavailable { .. }
            | Self::Timeout { .. }
            | Self::Network { .. } => true,
            Self::AllEndpointsFailed { last_error, .. } => last_error.is_retryable(),
            Self::LargeFile { source, .. } => source.is_retryable(),
        }
    }
}

// Note: there is no `From<reqwest::Error>` or `From<std::io::Error>`; both
// variants need a URL or path the source error does not carry.
