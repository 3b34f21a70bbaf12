//! Bounded in-memory drain and media-type precedence for buffered results.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::debug;

use super::DownloadError;
use crate::format::mime::{OCTET_STREAM, media_type_from_content, media_type_from_extension};
use crate::transport::ByteStream;

/// Drains `body` into memory.
///
/// Fails with `PayloadTooLarge` as soon as more than `max_bytes` have
/// arrived (no partial buffer is returned), and with `Timeout` when the
/// whole drain takes longer than `drain_timeout`.
///
/// # Errors
///
/// `PayloadTooLarge`, `Timeout` for `url`, or the body stream's own error.
pub async fn drain_to_buffer(
    mut body: ByteStream,
    max_bytes: u64,
    drain_timeout: Duration,
    url: &str,
) -> Result<Bytes, DownloadError> {
    let drain = async move {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if (buffer.len() + chunk.len()) as u64 > max_bytes {
                debug!(received = buffer.len() + chunk.len(), max_bytes, "buffer ceiling exceeded");
                return Err(DownloadError::payload_too_large(max_bytes));
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    };

    tokio::time::timeout(drain_timeout, drain)
        .await
        .map_err(|_| DownloadError::timeout(url))?
}

/// Picks the media type of a drained buffer.
///
/// A content signature other than octet-stream wins; otherwise the prior
/// guess (metadata or export adjustment), then the name's extension, then
/// octet-stream.
#[must_use]
pub fn resolve_buffer_media_type(content: &[u8], prior: Option<&str>, file_name: &str) -> String {
    let sniffed = media_type_from_content(content);
    if sniffed != OCTET_STREAM {
        return sniffed.to_string();
    }
    resolve_stream_media_type(prior, file_name)
}

/// Picks the media type of a streamed result, where no bytes have been read.
#[must_use]
pub fn resolve_stream_media_type(prior: Option<&str>, file_name: &str) -> String {
    prior
        .map(str::to_string)
        .or_else(|| media_type_from_extension(file_name).map(str::to_string))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}
