//! Display-name extraction from a public view page.

use std::sync::LazyLock;

use regex::Regex;

/// `og:title` values the service uses when it hides the real name.
const PLACEHOLDER_TITLES: [&str; 4] = ["Google Drive", "Google Docs", "Google Sheets", "Google Slides"];

/// Suffixes appended to `<title>` by each app.
const TITLE_SUFFIXES: [&str; 4] = [
    " - Google Drive",
    " - Google Docs",
    " - Google Sheets",
    " - Google Slides",
];

fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static OG_TITLE_PROPERTY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    static_regex(r#"(?is)<meta[^>]+property=["']og:title["'][^>]*content=["']([^"']*)["']"#)
});

static OG_TITLE_CONTENT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    static_regex(r#"(?is)<meta[^>]+content=["']([^"']*)["'][^>]*property=["']og:title["']"#)
});

static TITLE_TAG: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?is)<title[^>]*>(.*?)</title>"));

/// Extracts the file's display name from view page HTML.
///
/// A non-placeholder `og:title` takes precedence over `<title>`; the
/// `<title>` text has its " - Google Drive" style suffix removed.
#[must_use]
pub fn extract_display_name(html: &str) -> Option<String> {
    og_title(html).or_else(|| title_tag(html))
}

fn og_title(html: &str) -> Option<String> {
    let raw = OG_TITLE_PROPERTY_FIRST
        .captures(html)
        .or_else(|| OG_TITLE_CONTENT_FIRST.captures(html))?
        .get(1)?
        .as_str();
    let title = decode_entities(raw.trim());
    if title.is_empty() || PLACEHOLDER_TITLES.contains(&title.as_str()) {
        return None;
    }
    Some(title)
}

fn title_tag(html: &str) -> Option<String> {
    let raw = TITLE_TAG.captures(html)?.get(1)?.as_str();
    let mut title = decode_entities(raw.trim());
    for suffix in TITLE_SUFFIXES {
        if let Some(stripped) = title.strip_suffix(suffix.trim_start()) {
            title = stripped.trim_end().to_string();
            break;
        }
    }
    if title.is_empty() || PLACEHOLDER_TITLES.contains(&title.as_str()) {
        return None;
    }
    Some(title)
}

/// Decodes the handful of entities page titles actually use.
fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
