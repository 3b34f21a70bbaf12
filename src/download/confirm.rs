//! Large-file confirmation token extraction.
//!
//! Files above the service's virus-scan size are answered with an HTML
//! interstitial instead of content. The page links to the real download
//! with a `confirm=<token>` query parameter; newer variants put the token
//! in a hidden form input instead.

use std::sync::LazyLock;

use regex::Regex;

static CONFIRM_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"confirm=([0-9A-Za-z_-]+)")
        .unwrap_or_else(|e| panic!("invalid confirm query regex: {e}"))
});

static CONFIRM_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="confirm"\s+value="([0-9A-Za-z_-]+)""#)
        .unwrap_or_else(|e| panic!("invalid confirm input regex: {e}"))
});

/// Finds the confirmation token in an interstitial page body.
///
/// `confirm=<token>` anywhere in the body wins; a hidden
/// `<input name="confirm" value="...">` is the fallback.
#[must_use]
pub fn extract_confirm_token(body: &str) -> Option<String> {
    CONFIRM_QUERY
        .captures(body)
        .or_else(|| CONFIRM_INPUT.captures(body))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_download_link() {
        let body = r#"<a id="uc-download-link" href="/uc?export=download&amp;confirm=Xy_9-z&amp;id=BIG">Download anyway</a>"#;
        assert_eq!(extract_confirm_token(body), Some("Xy_9-z".to_string()));
    }

    #[test]
    fn test_token_from_hidden_input() {
        let body = r#"<form action="https://drive.usercontent.google.com/download">
            <input type="hidden" name="id" value="BIG">
            <input type="hidden" name="confirm" value="t0k3n">
        </form>"#;
        assert_eq!(extract_confirm_token(body), Some("t0k3n".to_string()));
    }

    #[test]
    fn test_query_token_wins_over_input() {
        let body = r#"<input name="confirm" value="fromform"><a href="?confirm=fromlink">"#;
        assert_eq!(extract_confirm_token(body), Some("fromlink".to_string()));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_confirm_token("<html><title>Error 404</title></html>"), None);
        assert_eq!(extract_confirm_token(""), None);
        assert_eq!(extract_confirm_token("confirm="), None);
    }
}
