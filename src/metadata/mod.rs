//! File metadata resolution.
//!
//! The metadata API is tried first. Any failure there (network, status,
//! malformed JSON) falls over to scraping the public view page, and when
//! that fails too a synthetic `file_<id>` name is returned so that a blind
//! download can still be attempted. In strict mode the last step raises
//! [`DownloadError::MetadataUnavailable`] instead.

mod page;

pub use page::extract_display_name;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::download::{DownloadError, ServiceEndpoints};
use crate::format::mime::media_type_from_extension;
use crate::transport::{HttpTransport, TransportRequest};

/// Largest metadata JSON document read.
const MAX_API_BODY_BYTES: u64 = 1024 * 1024;

/// Largest view page read.
const MAX_VIEW_PAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Which lookup produced a [`FileInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// Metadata API.
    Api,
    /// Public view page title.
    ViewPage,
    /// Both lookups failed; the name is `file_<id>`.
    Synthetic,
}

/// Best-known metadata for a file before its content is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Display name.
    pub name: String,
    /// Media type, when known.
    pub media_type: Option<String>,
    /// Size in bytes, when known.
    pub size: Option<u64>,
    /// Where this info came from.
    pub source: MetadataSource,
}

impl FileInfo {
    /// Placeholder info used when nothing could be resolved.
    #[must_use]
    pub fn synthetic(file_id: &str) -> Self {
        Self {
            name: format!("file_{file_id}"),
            media_type: None,
            size: None,
            source: MetadataSource::Synthetic,
        }
    }
}

/// Metadata summary returned by
/// [`DriveDownloader::get_file_metadata`](crate::DriveDownloader::get_file_metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    /// File identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Media type, when known.
    pub media_type: Option<String>,
    /// Size in bytes, when known.
    pub size: Option<u64>,
    /// True for native Workspace documents (convertible on export).
    pub is_workspace_doc: bool,
    /// Export menu for the media type.
    pub available_formats: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiSize {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    size: Option<ApiSize>,
}

impl From<ApiFile> for FileInfo {
    fn from(file: ApiFile) -> Self {
        let size = match file.size {
            Some(ApiSize::Number(n)) => Some(n),
            Some(ApiSize::Text(text)) => text.trim().parse().ok(),
            None => None,
        };
        Self {
            name: file.name,
            media_type: file.mime_type.filter(|m| !m.is_empty()),
            size,
            source: MetadataSource::Api,
        }
    }
}

/// Resolves [`FileInfo`] through the metadata API and the view page.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    transport: Arc<dyn HttpTransport>,
    endpoints: ServiceEndpoints,
    api_key: Option<String>,
    timeout: Duration,
    strict: bool,
}

impl MetadataResolver {
    /// Creates a resolver. `strict` turns the synthetic fallback into an error.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        endpoints: ServiceEndpoints,
        api_key: Option<String>,
        timeout: Duration,
        strict: bool,
    ) -> Self {
        Self {
            transport,
            endpoints,
            api_key,
            timeout,
            strict,
        }
    }

    /// Resolves metadata for `file_id`.
    ///
    /// # Errors
    ///
    /// Only in strict mode: [`DownloadError::MetadataUnavailable`] when both
    /// lookups fail.
    #[instrument(skip(self), fields(strict = self.strict))]
    pub async fn get_file_info(&self, file_id: &str) -> Result<FileInfo, DownloadError> {
        let api_error = match self.from_api(file_id).await {
            Ok(info) => return Ok(info),
            Err(e) => e,
        };
        debug!(error = %api_error, "metadata API failed, trying view page");

        let page_error = match self.from_view_page(file_id).await {
            Ok(info) => return Ok(info),
            Err(e) => e,
        };

        if self.strict {
            warn!(api_error = %api_error, page_error = %page_error, "metadata unavailable");
            return Err(DownloadError::metadata_unavailable(
                file_id,
                format!("api: {api_error}; view page: {page_error}"),
            ));
        }
        debug!(error = %page_error, "view page failed, using synthetic name");
        Ok(FileInfo::synthetic(file_id))
    }

    async fn from_api(&self, file_id: &str) -> Result<FileInfo, DownloadError> {
        let url = self.endpoints.metadata_url(file_id, self.api_key.as_deref());
        let request = TransportRequest::get(url.clone(), self.timeout).accept("application/json");
        let body = self
            .transport
            .get(request)
            .await?
            .ensure_success()?
            .text(MAX_API_BODY_BYTES, self.timeout)
            .await?;

        let file: ApiFile = serde_json::from_str(&body).map_err(|e| {
            DownloadError::metadata_unavailable(file_id, format!("malformed API response from {url}: {e}"))
        })?;
        Ok(file.into())
    }

    async fn from_view_page(&self, file_id: &str) -> Result<FileInfo, DownloadError> {
        let url = self.endpoints.view_page_url(file_id);
        let request = TransportRequest::get(url.clone(), self.timeout).accept("text/html");
        let html = self
            .transport
            .get(request)
            .await?
            .ensure_success()?
            .text(MAX_VIEW_PAGE_BYTES, self.timeout)
            .await?;

        let name = extract_display_name(&html).ok_or_else(|| {
            DownloadError::metadata_unavailable(file_id, format!("no title found in {url}"))
        })?;
        let media_type = media_type_from_extension(&name).map(str::to_string);
        Ok(FileInfo {
            name,
            media_type,
            size: None,
            source: MetadataSource::ViewPage,
        })
    }
}
