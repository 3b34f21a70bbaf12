//! Share-URL parsing into opaque file identifiers.
//!
//! Sharing links come in several shapes (direct file links, `open?id=`
//! query links, `/d/<id>/view` links and the per-app Workspace paths).
//! [`extract_file_id`] tries a fixed, ordered pattern list and returns the
//! first capture.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors produced while extracting a file identifier from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The input was empty or whitespace-only.
    #[error("invalid input: {reason}\n  Suggestion: Pass a sharing URL such as https://drive.google.com/file/d/<id>/view")]
    InvalidInput {
        /// Why the input was rejected.
        reason: String,
    },

    /// None of the known URL shapes matched.
    #[error("no file identifier found in '{url}'\n  Suggestion: Copy the link from the service's Share dialog")]
    NotFound {
        /// The URL that was inspected (trimmed).
        url: String,
    },
}

/// Identifier alphabet used by every pattern below.
const ID_CHARS: &str = r"[A-Za-z0-9_-]+";

/// Ordered pattern list; first match wins.
static ID_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("file", format!(r"/file/d/({ID_CHARS})")),
        ("id-query", format!(r"[?&]id=({ID_CHARS})")),
        ("view-or-edit", format!(r"/d/({ID_CHARS})/(?:view|edit)")),
        ("document", format!(r"/document/d/({ID_CHARS})")),
        ("spreadsheet", format!(r"/spreadsheets/d/({ID_CHARS})")),
        ("presentation", format!(r"/presentation/d/({ID_CHARS})")),
        ("form", format!(r"/forms/d/({ID_CHARS})")),
        ("drawing", format!(r"/drawings/d/({ID_CHARS})")),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        let regex = Regex::new(&pattern)
            .unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"));
        (name, regex)
    })
    .collect()
});

/// Extracts the file identifier from a sharing URL.
///
/// Surrounding whitespace is trimmed from the URL before matching; the
/// captured identifier itself is returned as matched.
///
/// # Errors
///
/// - [`IdentifierError::InvalidInput`] when the URL is empty
/// - [`IdentifierError::NotFound`] when no pattern matches
///
/// # Examples
///
/// ```
/// use drive_downloader::extract_file_id;
///
/// let id = extract_file_id("https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing").unwrap();
/// assert_eq!(id, "1AbC_d-9");
/// ```
#[tracing::instrument(level = "debug")]
pub fn extract_file_id(url: &str) -> Result<String, IdentifierError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(IdentifierError::InvalidInput {
            reason: "URL is empty".to_string(),
        });
    }

    for (name, pattern) in ID_PATTERNS.iter() {
        trace!(pattern = name, "trying identifier pattern");
        if let Some(id) = pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        {
            debug!(pattern = name, id = %id, "file identifier extracted");
            return Ok(id);
        }
    }

    Err(IdentifierError::NotFound {
        url: url.to_string(),
    })
}
