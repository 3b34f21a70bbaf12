//! HTTP transport capability used by the metadata resolver and the engine.
//!
//! The pipeline only needs streaming GETs with a per-call timeout, so the
//! seam is a single-method trait. [`ReqwestTransport`] is the production
//! implementation; tests can inject scripted transports.

mod client;

pub use client::ReqwestTransport;

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};

use crate::download::DownloadError;
use crate::format::filename::parse_content_disposition;

/// Response body as a stream of chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DownloadError>> + Send>>;

/// A GET request issued through an [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Absolute URL.
    pub url: String,
    /// Time allowed until response headers arrive.
    pub timeout: Duration,
    /// Optional `Accept` header value.
    pub accept: Option<&'static str>,
}

impl TransportRequest {
    /// Creates a GET request with the given header timeout.
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            accept: None,
        }
    }

    /// Sets the `Accept` header.
    #[must_use]
    pub fn accept(mut self, accept: &'static str) -> Self {
        self.accept = Some(accept);
        self
    }
}

/// Response head plus a body that has not been read yet.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Unread body.
    pub body: ByteStream,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl TransportResponse {
    /// Declared `Content-Type`, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// True when the declared content type is HTML.
    ///
    /// The service never serves stored files as HTML, so an HTML response
    /// on a download endpoint is an error page or a confirmation page.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type()
            .is_some_and(|value| value.to_ascii_lowercase().contains("text/html"))
    }

    /// Declared `Content-Length`, if present and parseable.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
    }

    /// File name from `Content-Disposition`, if any.
    #[must_use]
    pub fn content_disposition_filename(&self) -> Option<String> {
        self.headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition)
    }

    /// Turns a non-2xx status into [`DownloadError::HttpStatus`].
    ///
    /// # Errors
    ///
    /// Returns `HttpStatus` for any status outside `200..300`.
    pub fn ensure_success(self) -> Result<Self, DownloadError> {
        if (200..300).contains(&self.status) {
            Ok(self)
        } else {
            Err(DownloadError::http_status(self.url, self.status))
        }
    }

    /// Reads the body as (lossy) UTF-8 text, failing past `limit_bytes` or
    /// when the whole read takes longer than `read_timeout`.
    ///
    /// # Errors
    ///
    /// Propagates body stream errors, returns `PayloadTooLarge` past the
    /// limit and `Timeout` for a body that stalls.
    pub async fn text(self, limit_bytes: u64, read_timeout: Duration) -> Result<String, DownloadError> {
        let Self { url, mut body, .. } = self;
        let read = async move {
            let mut buffer = BytesMut::new();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                if (buffer.len() + chunk.len()) as u64 > limit_bytes {
                    return Err(DownloadError::payload_too_large(limit_bytes));
                }
                buffer.extend_from_slice(&chunk);
            }
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        };

        tokio::time::timeout(read_timeout, read)
            .await
            .map_err(|_| DownloadError::timeout(url))?
    }
}

/// Capability for issuing streaming HTTP GETs.
///
/// Implementations follow redirects and apply [`TransportRequest::timeout`]
/// to the wait for response headers. Non-2xx statuses are returned as
/// responses, not errors.
///
/// # Object Safety
///
/// Uses `async_trait` so the engine can hold an `Arc<dyn HttpTransport>`.
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Issues a GET request.
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, DownloadError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn response(headers: &[(&'static str, &'static str)], body: &'static [u8]) -> TransportResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(value));
        }
        let chunks: Vec<Result<Bytes, DownloadError>> = vec![Ok(Bytes::from_static(body))];
        TransportResponse {
            status: 200,
            url: "https://example.com/uc".to_string(),
            headers: map,
            body: Box::pin(futures_util::stream::iter(chunks)),
        }
    }

    #[test]
    fn test_is_html_matches_charset_variants() {
        assert!(response(&[("content-type", "text/html; charset=utf-8")], b"").is_html());
        assert!(response(&[("content-type", "TEXT/HTML")], b"").is_html());
        assert!(!response(&[("content-type", "application/pdf")], b"").is_html());
        assert!(!response(&[], b"").is_html());
    }

    #[test]
    fn test_content_length_parsing() {
        assert_eq!(response(&[("content-length", "1234")], b"").content_length(), Some(1234));
        assert_eq!(response(&[("content-length", "abc")], b"").content_length(), None);
        assert_eq!(response(&[], b"").content_length(), None);
    }

    #[test]
    fn test_content_disposition_filename() {
        let resp = response(&[("content-disposition", "attachment; filename=\"a.pdf\"")], b"");
        assert_eq!(resp.content_disposition_filename(), Some("a.pdf".to_string()));
    }

    #[test]
    fn test_ensure_success_rejects_error_status() {
        let mut resp = response(&[], b"");
        resp.status = 404;
        let err = resp.ensure_success().unwrap_err();
        assert!(matches!(err, DownloadError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_text_reads_body_within_limit() {
        let text = response(&[], b"<html>hi</html>")
            .text(1024, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "<html>hi</html>");
    }

    #[tokio::test]
    async fn test_text_rejects_oversized_body() {
        let err = response(&[], b"0123456789")
            .text(4, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::PayloadTooLarge { limit_bytes: 4 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_stalled_body_times_out() {
        let resp = TransportResponse {
            status: 200,
            url: "https://example.com/view".to_string(),
            headers: HeaderMap::new(),
            body: Box::pin(futures_util::stream::pending::<Result<Bytes, DownloadError>>()),
        };
        let err = resp.text(1024, Duration::from_secs(30)).await.unwrap_err();
        assert!(matches!(err, DownloadError::Timeout { url } if url == "https://example.com/view"));
    }
}
