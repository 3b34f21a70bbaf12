//! Writing a finished download to local storage.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};

use crate::download::{DownloadError, DownloadResult, FileContent};
use crate::transport::ByteStream;

/// Saves a successful result to `path`, creating parent directories.
///
/// Buffers are written in one call; streams are piped chunk by chunk and a
/// partial file is removed when the stream or a write fails. Returns the
/// number of bytes written.
///
/// # Errors
///
/// - [`DownloadError::DownloadNotSuccessful`] when `result` is a failure
/// - [`DownloadError::Io`] for directory, create or write failures
/// - the stream's own error when a streamed body breaks
#[instrument(skip(result, path), fields(path = %path.display()))]
pub async fn save_to_file(result: DownloadResult, path: &Path) -> Result<u64, DownloadError> {
    let success = result.into_result()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }

    let written = match success.file.content {
        FileContent::Buffer(bytes) => {
            fs::write(path, &bytes)
                .await
                .map_err(|e| DownloadError::io(path, e))?;
            bytes.len() as u64
        }
        FileContent::Stream { stream, .. } => {
            let file = File::create(path)
                .await
                .map_err(|e| DownloadError::io(path, e))?;
            let outcome = stream_to_file(file, stream, path).await;
            if outcome.is_err() {
                debug!("cleaning up partial file after error");
                if let Err(e) = fs::remove_file(path).await {
                    warn!(error = %e, "failed to remove partial file");
                }
            }
            outcome?
        }
    };

    debug!(bytes = written, "file saved");
    Ok(written)
}

async fn stream_to_file(file: File, mut stream: ByteStream, path: &Path) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;
    Ok(bytes_written)
}
