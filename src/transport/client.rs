//! reqwest-backed [`HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, redirect};
use tracing::{debug, instrument};

use super::{HttpTransport, TransportRequest, TransportResponse};
use crate::download::DownloadError;

/// Production transport built on a pooled [`reqwest::Client`].
///
/// Create once and share; the client reuses connections across calls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport with the given connect timeout, user agent and
    /// redirect cap.
    ///
    /// No overall request timeout is set on the client: per-call timeouts
    /// cover the wait for headers, and streamed bodies may outlive them.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidConfig`] when the client cannot be
    /// built (for example, a user agent that is not a valid header value).
    pub fn new(
        connect_timeout: Duration,
        user_agent: &str,
        max_redirects: usize,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(redirect::Policy::limited(max_redirects))
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                DownloadError::invalid_config("http_client", format!("client build failed: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client (custom TLS, proxies).
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(level = "debug", skip(self, request), fields(url = %request.url))]
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, DownloadError> {
        let mut builder = self.client.get(&request.url);
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }

        let response = tokio::time::timeout(request.timeout, builder.send())
            .await
            .map_err(|_| DownloadError::timeout(&request.url))?
            .map_err(|e| {
                if e.is_timeout() {
                    DownloadError::timeout(&request.url)
                } else {
                    DownloadError::network(&request.url, e)
                }
            })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        debug!(status, final_url = %final_url, "response headers received");

        let body_url = final_url.clone();
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| DownloadError::network(body_url.clone(), e)));

        Ok(TransportResponse {
            status,
            url: final_url,
            headers,
            body: Box::pin(body),
        })
    }
}
