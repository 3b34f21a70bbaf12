//! User-Agent strings for service requests.
//!
//! The hosting service serves interstitial pages to unknown clients more
//! often than to browsers, so the default declared agent is browser-like.

/// Browser User-Agent declared on every request by default.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Tool-identifying User-Agent, for deployments that prefer to announce
/// themselves.
#[must_use]
pub fn tool_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("drive-downloader/{version}")
}
