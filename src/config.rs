//! Library configuration: service origins, timeouts and limits.
//!
//! [`DriveConfig`] is fixed for the lifetime of a
//! [`DriveDownloader`](crate::DriveDownloader); per-call knobs live in
//! [`DownloadOptions`](crate::DownloadOptions).

use std::time::Duration;

use crate::download::{DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DownloadError, ServiceEndpoints};
use crate::user_agent::BROWSER_USER_AGENT;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for metadata API and view page requests.
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for the confirmed large-file request.
pub const DEFAULT_LARGE_FILE_TIMEOUT: Duration = Duration::from_secs(300);
/// Default ceiling for buffered downloads (100 MiB).
pub const DEFAULT_MAX_BUFFER_BYTES: u64 = 100 * 1024 * 1024;
/// Default time allowed to drain a buffered body.
pub const DEFAULT_BUFFER_DRAIN_TIMEOUT: Duration = Duration::from_secs(60);
/// Default redirect cap per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

const MAX_REDIRECT_CAP: usize = 20;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    /// Service origins.
    pub endpoints: ServiceEndpoints,
    /// Declared `User-Agent`.
    pub user_agent: String,
    /// Optional metadata API key, sent as `key=`.
    pub api_key: Option<String>,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Header timeout for metadata lookups.
    pub metadata_timeout: Duration,
    /// Header timeout for the confirmed large-file request.
    pub large_file_timeout: Duration,
    /// Buffer-mode size ceiling.
    pub max_buffer_bytes: u64,
    /// Buffer-mode drain timeout.
    pub buffer_drain_timeout: Duration,
    /// First backoff delay of the metadata retry loop.
    pub retry_base_delay: Duration,
    /// Upper bound of any single backoff delay.
    pub retry_max_delay: Duration,
    /// Random delay added to each backoff sleep, up to this much.
    pub retry_max_jitter: Duration,
    /// Redirect hops followed per request.
    pub max_redirects: usize,
    /// Fail with `MetadataUnavailable` instead of synthesizing `file_<id>`.
    pub strict_metadata: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            endpoints: ServiceEndpoints::default(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            api_key: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            large_file_timeout: DEFAULT_LARGE_FILE_TIMEOUT,
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
            buffer_drain_timeout: DEFAULT_BUFFER_DRAIN_TIMEOUT,
            retry_base_delay: DEFAULT_BASE_DELAY,
            retry_max_delay: DEFAULT_MAX_DELAY,
            retry_max_jitter: Duration::ZERO,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            strict_metadata: false,
        }
    }
}

impl DriveConfig {
    /// Default configuration with every service origin at `base`.
    #[must_use]
    pub fn with_service_base(base: &str) -> Self {
        Self {
            endpoints: ServiceEndpoints::with_single_base(base),
            ..Self::default()
        }
    }

    /// Checks that timeouts and limits are usable.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), DownloadError> {
        let timeouts = [
            ("connect_timeout", self.connect_timeout),
            ("metadata_timeout", self.metadata_timeout),
            ("large_file_timeout", self.large_file_timeout),
            ("buffer_drain_timeout", self.buffer_drain_timeout),
        ];
        for (field, value) in timeouts {
            if value.is_zero() {
                return Err(DownloadError::invalid_config(field, "must be greater than zero"));
            }
        }
        if self.max_buffer_bytes == 0 {
            return Err(DownloadError::invalid_config(
                "max_buffer_bytes",
                "must be greater than zero",
            ));
        }
        if self.retry_max_delay < self.retry_base_delay {
            return Err(DownloadError::invalid_config(
                "retry_max_delay",
                "must not be shorter than retry_base_delay",
            ));
        }
        if self.max_redirects > MAX_REDIRECT_CAP {
            return Err(DownloadError::invalid_config(
                "max_redirects",
                format!("{} exceeds the cap of {MAX_REDIRECT_CAP}", self.max_redirects),
            ));
        }

        let origins = [
            ("endpoints.drive_base", &self.endpoints.drive_base),
            ("endpoints.docs_base", &self.endpoints.docs_base),
            ("endpoints.usercontent_base", &self.endpoints.usercontent_base),
            ("endpoints.api_base", &self.endpoints.api_base),
        ];
        for (field, value) in origins {
            url::Url::parse(value)
                .map_err(|e| DownloadError::invalid_config(field, format!("'{value}': {e}")))?;
        }
        Ok(())
    }
}
