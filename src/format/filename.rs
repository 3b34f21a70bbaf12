//! File name handling: on-disk sanitization, extension replacement, and
//! Content-Disposition parsing.

/// Name used when sanitization leaves nothing usable.
pub const PLACEHOLDER_FILE_NAME: &str = "unnamed_file";

/// Maximum sanitized name length, in characters.
pub const MAX_FILE_NAME_CHARS: usize = 200;

/// Longest suffix treated as an extension by [`replace_extension`].
const MAX_EXTENSION_CHARS: usize = 5;

/// Produces a name that is safe to create on common filesystems.
///
/// Trims the input, turns whitespace runs into `_`, drops characters that
/// are unsafe on Windows/Unix (`< > : " / \ | ? *`) and control characters,
/// collapses repeated `_`, strips leading/trailing `_` and `.`, and
/// truncates to [`MAX_FILE_NAME_CHARS`]. Returns [`PLACEHOLDER_FILE_NAME`]
/// when nothing remains.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_sep = false;
    for ch in name.trim().chars() {
        match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => {}
            c if c.is_whitespace() || c == '_' => {
                if !prev_sep {
                    out.push('_');
                    prev_sep = true;
                }
            }
            c if c.is_control() => {}
            c => {
                out.push(c);
                prev_sep = false;
            }
        }
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    let truncated: String = trimmed.chars().take(MAX_FILE_NAME_CHARS).collect();
    let truncated = truncated.trim_end_matches(|c| c == '_' || c == '.');
    if truncated.is_empty() {
        PLACEHOLDER_FILE_NAME.to_string()
    } else {
        truncated.to_string()
    }
}

/// Replaces the extension of `name` with `extension`, or appends it when
/// the name has none.
///
/// Only a short alphanumeric suffix after the last `.` counts as an
/// extension, so titles like `Plan v1.2 final` keep their text.
#[must_use]
pub fn replace_extension(name: &str, extension: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=MAX_EXTENSION_CHARS).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => name,
    };
    format!("{stem}.{extension}")
}

/// Parses a Content-Disposition header to extract the file name.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987, preferred)
#[must_use]
pub fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + "filename*=".len()..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded = encoded[..end].trim().trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded)
                && !decoded.is_empty()
            {
                return Some(decoded.into_owned());
            }
        }
    }

    if let Some(pos) = header.find("filename=") {
        let value = header[pos + "filename=".len()..].trim();
        if let Some(stripped) = value.strip_prefix('"') {
            if let Some(end) = stripped.find('"') {
                let name = &stripped[..end];
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        } else {
            let end = value.find(';').unwrap_or(value.len());
            let name = value[..end].trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }

    None
}
