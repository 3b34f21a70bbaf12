//! Retrieval engine: metadata, endpoint fallback, confirmation, materialize.
//!
//! One call walks `ResolveMetadata -> SelectEndpoint -> Fetch -> Classify ->
//! (LargeFileConfirm)? -> Materialize`. The engine holds no per-call state,
//! so a single [`DriveDownloader`] can serve concurrent calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use super::buffer::{drain_to_buffer, resolve_buffer_media_type, resolve_stream_media_type};
use super::confirm::extract_confirm_token;
use super::endpoints::build_candidates;
use super::retry::{DEFAULT_MAX_RETRIES, RetryPolicy};
use super::DownloadError;
use crate::config::DriveConfig;
use crate::format::filename::replace_extension;
use crate::format::mime::media_type_from_extension;
use crate::format::{ExportFormat, available_formats, is_workspace_media_type};
use crate::identifier::extract_file_id;
use crate::metadata::{FileInfo, FileMetadata, MetadataResolver, MetadataSource};
use crate::transport::{ByteStream, HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};

/// Default per-request timeout (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Largest confirmation page read while looking for the token.
const MAX_CONFIRM_PAGE_BYTES: u64 = 2 * 1024 * 1024;

/// Per-call download options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Time allowed for each candidate request to return headers.
    pub timeout: Duration,
    /// Additional metadata attempts after the first.
    pub max_retries: u32,
    /// Requested representation.
    pub export_format: ExportFormat,
    /// Buffer the content (true) or hand back the live stream (false).
    pub as_buffer: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            export_format: ExportFormat::Original,
            as_buffer: true,
        }
    }
}

impl DownloadOptions {
    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the metadata retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the requested export format.
    #[must_use]
    pub fn with_export_format(mut self, export_format: ExportFormat) -> Self {
        self.export_format = export_format;
        self
    }

    /// Chooses buffer (true) or stream (false) output.
    #[must_use]
    pub fn with_buffer(mut self, as_buffer: bool) -> Self {
        self.as_buffer = as_buffer;
        self
    }
}

/// Downloaded content: a complete buffer or a live stream, never both.
pub enum FileContent {
    /// Fully drained body.
    Buffer(Bytes),
    /// Unread body plus its declared length (0 when not declared).
    Stream {
        /// Live body.
        stream: ByteStream,
        /// Declared `Content-Length`, not a guarantee.
        total_bytes: u64,
    },
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Self::Stream { total_bytes, .. } => f
                .debug_struct("Stream")
                .field("total_bytes", total_bytes)
                .finish_non_exhaustive(),
        }
    }
}

/// A downloaded file with its resolved name and media type.
#[derive(Debug)]
pub struct DownloadedFile {
    /// Buffer or stream.
    pub content: FileContent,
    /// Resolved media type.
    pub media_type: String,
    /// Resolved display name (not sanitized for disk).
    pub file_name: String,
    /// Exact length for buffers, declared length for streams.
    pub size: Option<u64>,
}

impl DownloadedFile {
    /// The buffered bytes, if this is a buffer result.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.content {
            FileContent::Buffer(bytes) => Some(bytes),
            FileContent::Stream { .. } => None,
        }
    }

    /// Declared total for streams, `None` for buffers.
    #[must_use]
    pub fn total_bytes(&self) -> Option<u64> {
        match &self.content {
            FileContent::Buffer(_) => None,
            FileContent::Stream { total_bytes, .. } => Some(*total_bytes),
        }
    }
}

/// Successful download.
#[derive(Debug)]
pub struct DownloadSuccess {
    /// The file.
    pub file: DownloadedFile,
    /// Identifier extracted from the input URL.
    pub file_id: String,
}

impl DownloadSuccess {
    /// Resolved display name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    /// Resolved media type.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.file.media_type
    }

    /// Exact (buffer) or declared (stream) size.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.file.size
    }

    /// Declared total for stream results.
    #[must_use]
    pub fn total_bytes(&self) -> Option<u64> {
        self.file.total_bytes()
    }
}

/// Terminal value of a download call. Download operations never fail
/// outside of this type.
#[derive(Debug)]
pub enum DownloadResult {
    /// The file was retrieved.
    Success(DownloadSuccess),
    /// The call failed; `error` is the display text of the cause.
    Failure {
        /// Human-readable cause.
        error: String,
    },
}

impl DownloadResult {
    /// True for `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Failure text, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Converts into a `Result` for `?`-style callers.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::DownloadNotSuccessful`] carrying the failure text.
    pub fn into_result(self) -> Result<DownloadSuccess, DownloadError> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure { error } => Err(DownloadError::download_not_successful(error)),
        }
    }
}

/// Downloads publicly shared files.
///
/// # Example
///
/// ```no_run
/// use drive_downloader::{DownloadOptions, DriveConfig, DriveDownloader};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = DriveDownloader::new(DriveConfig::default())?;
/// let result = downloader
///     .download("https://drive.google.com/file/d/abc123/view", &DownloadOptions::default())
///     .await;
/// let success = result.into_result()?;
/// println!("{} ({})", success.file_name(), success.media_type());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DriveDownloader {
    transport: Arc<dyn HttpTransport>,
    config: DriveConfig,
    metadata: MetadataResolver,
}

impl DriveDownloader {
    /// Builds a downloader backed by [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidConfig`] for an invalid configuration.
    pub fn new(config: DriveConfig) -> Result<Self, DownloadError> {
        config.validate()?;
        let transport = ReqwestTransport::new(
            config.connect_timeout,
            &config.user_agent,
            config.max_redirects,
        )?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Builds a downloader on an injected transport.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidConfig`] for an invalid configuration.
    pub fn with_transport(
        config: DriveConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, DownloadError> {
        config.validate()?;
        let metadata = MetadataResolver::new(
            Arc::clone(&transport),
            config.endpoints.clone(),
            config.api_key.clone(),
            config.metadata_timeout,
            config.strict_metadata,
        );
        Ok(Self {
            transport,
            config,
            metadata,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// Downloads the file behind `url`.
    ///
    /// Never fails: every error becomes [`DownloadResult::Failure`].
    #[instrument(skip(self, options), fields(format = %options.export_format, as_buffer = options.as_buffer))]
    pub async fn download(&self, url: &str, options: &DownloadOptions) -> DownloadResult {
        match self.try_download(url, options).await {
            Ok(success) => {
                info!(
                    file_id = %success.file_id,
                    file_name = %success.file_name(),
                    media_type = %success.media_type(),
                    size = ?success.size(),
                    "download complete"
                );
                DownloadResult::Success(success)
            }
            Err(e) => {
                warn!(error = %e, "download failed");
                DownloadResult::Failure {
                    error: e.to_string(),
                }
            }
        }
    }

    /// [`download`](Self::download) with buffer output forced.
    pub async fn download_as_buffer(&self, url: &str, options: &DownloadOptions) -> DownloadResult {
        self.download(url, &options.with_buffer(true)).await
    }

    /// [`download`](Self::download) with stream output forced.
    pub async fn download_as_stream(&self, url: &str, options: &DownloadOptions) -> DownloadResult {
        self.download(url, &options.with_buffer(false)).await
    }

    /// Resolves metadata and the export menu without downloading.
    ///
    /// # Errors
    ///
    /// Identifier errors, and `MetadataUnavailable` in strict mode.
    #[instrument(skip(self))]
    pub async fn get_file_metadata(&self, url: &str) -> Result<FileMetadata, DownloadError> {
        let file_id = extract_file_id(url)?;
        let info = self.resolve_metadata(&file_id, DEFAULT_MAX_RETRIES).await?;
        let is_workspace_doc = info.media_type.as_deref().is_some_and(is_workspace_media_type);
        let available_formats = available_formats(info.media_type.as_deref());

        Ok(FileMetadata {
            id: file_id,
            name: info.name,
            media_type: info.media_type,
            size: info.size,
            is_workspace_doc,
            available_formats,
        })
    }

    async fn try_download(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<DownloadSuccess, DownloadError> {
        let file_id = extract_file_id(url)?;
        let info = self.resolve_metadata(&file_id, options.max_retries).await?;
        debug!(
            file_id = %file_id,
            name = %info.name,
            media_type = ?info.media_type,
            source = ?info.source,
            "metadata resolved"
        );

        let candidates = build_candidates(
            &self.config.endpoints,
            &file_id,
            info.media_type.as_deref(),
            options.export_format,
        );
        let response = self.fetch_candidates(&file_id, &candidates, options.timeout).await?;
        let file = self.materialize(&info, response, options).await?;

        Ok(DownloadSuccess { file, file_id })
    }

    async fn resolve_metadata(&self, file_id: &str, max_retries: u32) -> Result<FileInfo, DownloadError> {
        let policy = RetryPolicy::new(max_retries, self.config.retry_base_delay)
            .with_max_delay(self.config.retry_max_delay)
            .with_jitter(self.config.retry_max_jitter);
        let metadata = &self.metadata;
        policy
            .run("resolve_metadata", move || metadata.get_file_info(file_id))
            .await
    }

    /// Walks the candidates in order and returns the first non-HTML response.
    ///
    /// HTML on the last candidate switches to the confirmation flow; an error
    /// on the last candidate is surfaced.
    async fn fetch_candidates(
        &self,
        file_id: &str,
        candidates: &[String],
        timeout: Duration,
    ) -> Result<TransportResponse, DownloadError> {
        let total = candidates.len();
        let mut last_error = None;

        for (index, url) in candidates.iter().enumerate() {
            let is_last = index + 1 == total;
            match self.fetch(url, timeout).await {
                Ok(response) if response.is_html() => {
                    if is_last {
                        debug!(url = %url, "every candidate returned HTML, confirming large file");
                        return self.confirm_large_file(file_id, timeout).await;
                    }
                    debug!(url = %url, "HTML response, trying next candidate");
                }
                Ok(response) => {
                    debug!(url = %url, candidate = index + 1, "candidate accepted");
                    return Ok(response);
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "candidate failed");
                    last_error = Some(e);
                    if is_last {
                        break;
                    }
                }
            }
        }

        let last_error = last_error
            .unwrap_or_else(|| DownloadError::download_not_successful("no candidate endpoints"));
        Err(DownloadError::all_endpoints_failed(file_id, total, last_error))
    }

    async fn confirm_large_file(
        &self,
        file_id: &str,
        timeout: Duration,
    ) -> Result<TransportResponse, DownloadError> {
        self.confirmed_download(file_id, timeout)
            .await
            .map_err(|e| DownloadError::large_file(file_id, e))
    }

    async fn confirmed_download(
        &self,
        file_id: &str,
        timeout: Duration,
    ) -> Result<TransportResponse, DownloadError> {
        let endpoints = &self.config.endpoints;
        let page_url = endpoints.confirm_page_url(file_id);
        let body = self
            .fetch(&page_url, timeout)
            .await?
            .text(MAX_CONFIRM_PAGE_BYTES, timeout)
            .await?;
        let token = extract_confirm_token(&body)
            .ok_or_else(|| DownloadError::confirmation_token_not_found(&page_url))?;

        debug!(file_id, "confirmation token found");
        let confirmed_url = endpoints.confirmed_download_url(file_id, &token);
        self.fetch(&confirmed_url, self.config.large_file_timeout).await
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<TransportResponse, DownloadError> {
        self.transport
            .get(TransportRequest::get(url, timeout))
            .await?
            .ensure_success()
    }

    async fn materialize(
        &self,
        info: &FileInfo,
        response: TransportResponse,
        options: &DownloadOptions,
    ) -> Result<DownloadedFile, DownloadError> {
        let mut file_name = info.name.clone();
        let mut media_type = info.media_type.clone();

        if let Some(extension) = options.export_format.extension()
            && media_type.as_deref().is_some_and(is_workspace_media_type)
        {
            file_name = replace_extension(&file_name, extension);
            media_type = media_type_from_extension(&file_name).map(str::to_string);
        }

        if info.source == MetadataSource::Synthetic
            && let Some(served_name) = response.content_disposition_filename()
        {
            debug!(served_name = %served_name, "using server-provided file name");
            file_name = served_name;
            if media_type.is_none() {
                media_type = media_type_from_extension(&file_name).map(str::to_string);
            }
        }

        let declared = response.content_length();
        if options.as_buffer {
            let limit = self.config.max_buffer_bytes;
            if declared.is_some_and(|len| len > limit) {
                return Err(DownloadError::payload_too_large(limit));
            }
            let bytes = drain_to_buffer(
                response.body,
                limit,
                self.config.buffer_drain_timeout,
                &response.url,
            )
            .await?;
            let media_type = resolve_buffer_media_type(&bytes, media_type.as_deref(), &file_name);
            let size = Some(bytes.len() as u64);
            Ok(DownloadedFile {
                content: FileContent::Buffer(bytes),
                media_type,
                file_name,
                size,
            })
        } else {
            let media_type = resolve_stream_media_type(media_type.as_deref(), &file_name);
            Ok(DownloadedFile {
                content: FileContent::Stream {
                    stream: response.body,
                    total_bytes: declared.unwrap_or(0),
                },
                media_type,
                file_name,
                size: declared,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures_util::{StreamExt, stream};
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

    const BASE: &str = "https://drive.test";

    enum Scripted {
        Respond {
            status: u16,
            headers: Vec<(&'static str, &'static str)>,
            body: &'static [u8],
        },
        /// Headers arrive but the body never yields.
        Stalled { headers: Vec<(&'static str, &'static str)> },
        Fail,
    }

    #[derive(Default)]
    struct FakeTransport {
        routes: HashMap<String, Scripted>,
        requested: Mutex<Vec<String>>,
    }

    impl fmt::Debug for FakeTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FakeTransport").finish_non_exhaustive()
        }
    }

    impl FakeTransport {
        fn route(mut self, url: String, scripted: Scripted) -> Self {
            self.routes.insert(url, scripted);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    fn header_map(headers: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        map
    }

    fn body_once(body: &'static [u8]) -> ByteStream {
        let chunks: Vec<Result<Bytes, DownloadError>> = vec![Ok(Bytes::from_static(body))];
        Box::pin(stream::iter(chunks))
    }

    fn body_stalled() -> ByteStream {
        Box::pin(stream::pending::<Result<Bytes, DownloadError>>())
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, request: TransportRequest) -> Result<TransportResponse, DownloadError> {
            self.requested.lock().unwrap().push(request.url.clone());
            let (status, headers, body) = match self.routes.get(&request.url) {
                Some(Scripted::Respond { status, headers, body }) => {
                    (*status, header_map(headers), body_once(*body))
                }
                Some(Scripted::Stalled { headers }) => (200, header_map(headers), body_stalled()),
                Some(Scripted::Fail) => return Err(DownloadError::timeout(request.url)),
                None => (404, HeaderMap::new(), body_once(b"")),
            };
            Ok(TransportResponse {
                status,
                url: request.url,
                headers,
                body,
            })
        }
    }

    fn config() -> DriveConfig {
        DriveConfig::with_service_base(BASE)
    }

    fn api_url(id: &str) -> String {
        config().endpoints.metadata_url(id, None)
    }

    fn json(body: &'static [u8]) -> Scripted {
        Scripted::Respond {
            status: 200,
            headers: vec![("content-type", "application/json")],
            body,
        }
    }

    fn html() -> Scripted {
        Scripted::Respond {
            status: 200,
            headers: vec![("content-type", "text/html; charset=utf-8")],
            body: b"<html>interstitial</html>",
        }
    }

    fn pdf() -> Scripted {
        Scripted::Respond {
            status: 200,
            headers: vec![("content-type", "application/pdf")],
            body: b"%PDF-1.7 body",
        }
    }

    fn downloader(transport: FakeTransport) -> (DriveDownloader, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let downloader =
            DriveDownloader::with_transport(config(), Arc::clone(&transport) as Arc<dyn HttpTransport>)
                .unwrap();
        (downloader, transport)
    }

    fn candidates(id: &str) -> Vec<String> {
        build_candidates(&config().endpoints, id, Some("application/pdf"), ExportFormat::Original)
    }

    #[tokio::test]
    async fn test_invalid_url_becomes_failure() {
        let (downloader, transport) = downloader(FakeTransport::default());
        let result = downloader
            .download("https://example.com/nothing-here", &DownloadOptions::default())
            .await;

        let error = result.error().unwrap();
        assert!(error.contains("no file identifier found"), "{error}");
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn test_empty_url_becomes_failure() {
        let (downloader, _) = downloader(FakeTransport::default());
        let result = downloader.download("   ", &DownloadOptions::default()).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_html_on_earlier_candidate_is_skipped() {
        let urls = candidates("PDF1");
        let transport = FakeTransport::default()
            .route(api_url("PDF1"), json(br#"{"name":"a.pdf","mimeType":"application/pdf"}"#))
            .route(urls[0].clone(), html())
            .route(urls[1].clone(), pdf());
        let (downloader, transport) = downloader(transport);

        let success = downloader
            .download(&format!("{BASE}/file/d/PDF1/view"), &DownloadOptions::default())
            .await
            .into_result()
            .unwrap();

        assert_eq!(success.file_name(), "a.pdf");
        assert_eq!(success.media_type(), "application/pdf");
        assert_eq!(success.file.bytes().unwrap().as_ref(), b"%PDF-1.7 body");
        assert_eq!(success.size(), Some(13));
        let requested = transport.requested();
        assert_eq!(&requested[1..], &urls[..2]);
    }

    #[tokio::test]
    async fn test_last_candidate_error_is_surfaced() {
        let transport = FakeTransport::default()
            .route(api_url("GONE"), json(br#"{"name":"gone.bin"}"#));
        let (downloader, transport) = downloader(transport);

        let result = downloader
            .download("https://drive.google.com/open?id=GONE", &DownloadOptions::default())
            .await;

        let error = result.error().unwrap();
        assert!(error.contains("all 5 download endpoints failed for GONE"), "{error}");
        assert!(error.contains("HTTP 404"), "{error}");
        // Metadata plus every candidate, no confirmation flow.
        assert_eq!(transport.requested().len(), 6);
    }

    #[tokio::test]
    async fn test_transport_error_on_last_candidate() {
        let urls = candidates("ERR");
        let transport = FakeTransport::default()
            .route(api_url("ERR"), json(br#"{"name":"e.bin"}"#))
            .route(urls[4].clone(), Scripted::Fail);
        let (downloader, _) = downloader(transport);

        let error = downloader
            .download("https://drive.google.com/uc?id=ERR", &DownloadOptions::default())
            .await
            .error()
            .map(str::to_string)
            .unwrap();
        assert!(error.contains("timeout"), "{error}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_metadata_bodies_fall_back_to_synthetic_name() {
        let urls = candidates("STALL");
        let stalled = || Scripted::Stalled {
            headers: vec![("content-type", "application/json")],
        };
        let transport = FakeTransport::default()
            .route(api_url("STALL"), stalled())
            .route(config().endpoints.view_page_url("STALL"), stalled())
            .route(urls[0].clone(), pdf());
        let (downloader, transport) = downloader(transport);

        let result = tokio::time::timeout(
            Duration::from_secs(3600),
            downloader.download(
                "https://drive.google.com/file/d/STALL/view",
                &DownloadOptions::default(),
            ),
        )
        .await
        .unwrap();

        let success = result.into_result().unwrap();
        assert_eq!(success.file_name(), "file_STALL");
        assert_eq!(success.media_type(), "application/pdf");
        let requested = transport.requested();
        assert_eq!(requested[1], config().endpoints.view_page_url("STALL"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_backoff_uses_configured_cap_and_jitter() {
        let config = DriveConfig {
            strict_metadata: true,
            retry_base_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(1),
            retry_max_jitter: Duration::from_millis(400),
            ..config()
        };
        let transport = Arc::new(FakeTransport::default());
        let downloader =
            DriveDownloader::with_transport(config, Arc::clone(&transport) as Arc<dyn HttpTransport>)
                .unwrap();
        let start = tokio::time::Instant::now();

        let result = downloader
            .download(
                "https://drive.google.com/file/d/NOMETA/view",
                &DownloadOptions::default().with_max_retries(2),
            )
            .await;

        let error = result.error().unwrap();
        assert!(error.contains("metadata unavailable for NOMETA"), "{error}");
        // Two capped 1s sleeps plus at most 400ms of jitter each; uncapped
        // backoff would need 3s.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
        assert!(elapsed <= Duration::from_millis(2800), "{elapsed:?}");
        // API and view page per attempt.
        assert_eq!(transport.requested().len(), 6);
    }

    #[tokio::test]
    async fn test_stream_without_content_length_reports_zero_total() {
        let urls = candidates("STR");
        let transport = FakeTransport::default()
            .route(api_url("STR"), json(br#"{"name":"clip.mp4","mimeType":"video/mp4"}"#))
            .route(
                urls[0].clone(),
                Scripted::Stalled {
                    headers: vec![("content-type", "video/mp4")],
                },
            );
        let (downloader, _) = downloader(transport);

        let success = downloader
            .download_as_stream("https://drive.google.com/file/d/STR/view", &DownloadOptions::default())
            .await
            .into_result()
            .unwrap();

        assert_eq!(success.total_bytes(), Some(0));
        assert_eq!(success.size(), None);
        assert_eq!(success.media_type(), "video/mp4");
        assert!(matches!(success.file.content, FileContent::Stream { .. }));
    }

    #[tokio::test]
    async fn test_stream_body_is_readable_by_caller() {
        let urls = candidates("STR2");
        let transport = FakeTransport::default()
            .route(api_url("STR2"), json(br#"{"name":"a.pdf","mimeType":"application/pdf"}"#))
            .route(urls[0].clone(), pdf());
        let (downloader, _) = downloader(transport);

        let success = downloader
            .download_as_stream("https://drive.google.com/file/d/STR2/view", &DownloadOptions::default())
            .await
            .into_result()
            .unwrap();

        let FileContent::Stream { mut stream, .. } = success.file.content else {
            panic!("expected stream content");
        };
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"%PDF-1.7 body");
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_rejected_before_drain() {
        let urls = candidates("HUGE");
        let transport = FakeTransport::default()
            .route(api_url("HUGE"), json(br#"{"name":"huge.iso"}"#))
            .route(
                urls[0].clone(),
                Scripted::Stalled {
                    headers: vec![
                        ("content-type", "application/octet-stream"),
                        ("content-length", "999999999999"),
                    ],
                },
            );
        let (downloader, _) = downloader(transport);

        let error = downloader
            .download("https://drive.google.com/file/d/HUGE/view", &DownloadOptions::default())
            .await
            .error()
            .map(str::to_string)
            .unwrap();
        assert!(error.contains("payload too large"), "{error}");
    }

    #[tokio::test]
    async fn test_synthetic_name_replaced_by_content_disposition() {
        let urls = candidates("SYN");
        let transport = FakeTransport::default().route(
            urls[0].clone(),
            Scripted::Respond {
                status: 200,
                headers: vec![
                    ("content-type", "application/octet-stream"),
                    ("content-disposition", "attachment; filename=\"report.csv\""),
                ],
                body: b"a,b\n1,2\n",
            },
        );
        let (downloader, _) = downloader(transport);

        let success = downloader
            .download("https://drive.google.com/file/d/SYN/view", &DownloadOptions::default())
            .await
            .into_result()
            .unwrap();

        assert_eq!(success.file_name(), "report.csv");
        assert_eq!(success.media_type(), "text/csv");
    }

    #[tokio::test]
    async fn test_workspace_export_renames_and_retypes() {
        let export = config().endpoints.export_url(
            crate::format::WorkspaceKind::Spreadsheet,
            "SHEET",
            ExportFormat::Xlsx,
        );
        let transport = FakeTransport::default()
            .route(
                api_url("SHEET"),
                json(br#"{"name":"Budget","mimeType":"application/vnd.google-apps.spreadsheet"}"#),
            )
            .route(
                export,
                Scripted::Respond {
                    status: 200,
                    headers: vec![("content-type", "application/octet-stream")],
                    body: b"not really a zip",
                },
            );
        let (downloader, _) = downloader(transport);

        let options = DownloadOptions::default().with_export_format(ExportFormat::Xlsx);
        let success = downloader
            .download("https://docs.google.com/spreadsheets/d/SHEET/edit", &options)
            .await
            .into_result()
            .unwrap();

        assert_eq!(success.file_name(), "Budget.xlsx");
        assert_eq!(
            success.media_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[tokio::test]
    async fn test_get_file_metadata_reports_formats() {
        let transport = FakeTransport::default().route(
            api_url("DOC"),
            json(br#"{"name":"Plan","mimeType":"application/vnd.google-apps.document"}"#),
        );
        let (downloader, _) = downloader(transport);

        let metadata = downloader
            .get_file_metadata("https://docs.google.com/document/d/DOC/edit")
            .await
            .unwrap();

        assert_eq!(metadata.id, "DOC");
        assert!(metadata.is_workspace_doc);
        assert_eq!(metadata.available_formats.first(), Some(&"pdf"));
        assert!(metadata.available_formats.contains(&"docx"));
    }

    #[test]
    fn test_options_defaults_and_builders() {
        let options = DownloadOptions::default();
        assert_eq!(options.timeout, Duration::from_millis(30_000));
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.export_format, ExportFormat::Original);
        assert!(options.as_buffer);

        let custom = options
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(0)
            .with_buffer(false);
        assert_eq!(custom.timeout, Duration::from_secs(5));
        assert_eq!(custom.max_retries, 0);
        assert!(!custom.as_buffer);
    }

    #[test]
    fn test_failure_into_result() {
        let result = DownloadResult::Failure {
            error: "boom".to_string(),
        };
        assert!(!result.is_success());
        let err = result.into_result().unwrap_err();
        assert!(matches!(err, DownloadError::DownloadNotSuccessful { reason } if reason == "boom"));
    }
}
