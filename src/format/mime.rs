//! Media-type inference from file extensions and leading content bytes.

/// Generic binary media type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Office Open XML media types.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Office Open XML spreadsheet.
pub const XLSX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// Office Open XML presentation.
pub const PPTX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Number of leading archive bytes inspected to tell OOXML flavors apart.
const ZIP_LISTING_PROBE: usize = 100;

const EXTENSION_TABLE: &[(&str, &str)] = &[
    // Documents
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", DOCX_MEDIA_TYPE),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", XLSX_MEDIA_TYPE),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", PPTX_MEDIA_TYPE),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
    ("rtf", "application/rtf"),
    ("epub", "application/epub+zip"),
    // Images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    // Audio / video
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    // Archives
    ("zip", "application/zip"),
    ("rar", "application/vnd.rar"),
    ("7z", "application/x-7z-compressed"),
    ("tar", "application/x-tar"),
    ("gz", "application/gzip"),
    // Text and code
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("tsv", "text/tab-separated-values"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("md", "text/markdown"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("py", "text/x-python"),
];

/// Looks up the media type for a file name's extension.
///
/// The extension is the lower-cased text after the last `.`; names without
/// one, or with an unknown one, return `None`.
#[must_use]
pub fn media_type_from_extension(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media)| *media)
}

/// Guesses a media type from leading bytes.
///
/// Recognizes pdf, jpeg, png, gif, webp and zip, splitting zip archives into
/// docx/xlsx/pptx by looking for `word/`, `xl/` or `ppt/` within the first
/// 100 bytes of the archive. Anything else, including inputs shorter than
/// four bytes, yields [`OCTET_STREAM`].
#[must_use]
pub fn media_type_from_content(bytes: &[u8]) -> &'static str {
    if bytes.len() < 4 {
        return OCTET_STREAM;
    }

    if bytes.starts_with(b"%PDF") {
        return "application/pdf";
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return "image/png";
    }
    if bytes.starts_with(b"GIF8") {
        return "image/gif";
    }
    if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        return "image/webp";
    }
    if bytes.starts_with(&[b'P', b'K', 0x03, 0x04]) {
        let probe = &bytes[..bytes.len().min(ZIP_LISTING_PROBE)];
        let listing = String::from_utf8_lossy(probe);
        return if listing.contains("word/") {
            DOCX_MEDIA_TYPE
        } else if listing.contains("xl/") {
            XLSX_MEDIA_TYPE
        } else if listing.contains("ppt/") {
            PPTX_MEDIA_TYPE
        } else {
            "application/zip"
        };
    }

    OCTET_STREAM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zip_with_entry(entry: &str) -> Vec<u8> {
        let mut bytes = vec![b'P', b'K', 0x03, 0x04];
        bytes.extend_from_slice(&[0u8; 26]);
        bytes.extend_from_slice(entry.as_bytes());
        bytes
    }

    #[test]
    fn test_extension_lookup_recovers_table_entries() {
        for (ext, media) in EXTENSION_TABLE {
            let name = format!("report.{ext}");
            assert_eq!(media_type_from_extension(&name), Some(*media), "{name}");
        }
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        assert_eq!(media_type_from_extension("SCAN.PDF"), Some("application/pdf"));
        assert_eq!(media_type_from_extension("photo.JpEg"), Some("image/jpeg"));
    }

    #[test]
    fn test_extension_lookup_uses_last_dot() {
        assert_eq!(media_type_from_extension("archive.tar.gz"), Some("application/gzip"));
    }

    #[test]
    fn test_extension_lookup_unknown_or_missing() {
        assert_eq!(media_type_from_extension("notes.xyz"), None);
        assert_eq!(media_type_from_extension("README"), None);
        assert_eq!(media_type_from_extension("trailing."), None);
    }

    #[test]
    fn test_content_sniffing_signatures() {
        assert_eq!(media_type_from_content(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(media_type_from_content(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), "image/jpeg");
        assert_eq!(
            media_type_from_content(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            "image/png"
        );
        assert_eq!(media_type_from_content(b"GIF89a...."), "image/gif");
        assert_eq!(media_type_from_content(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_content_sniffing_riff_without_webp_is_generic() {
        assert_eq!(media_type_from_content(b"RIFF\x24\x00\x00\x00WAVEfmt "), OCTET_STREAM);
    }

    #[test]
    fn test_content_sniffing_office_open_xml() {
        assert_eq!(media_type_from_content(&zip_with_entry("word/document.xml")), DOCX_MEDIA_TYPE);
        assert_eq!(media_type_from_content(&zip_with_entry("xl/workbook.xml")), XLSX_MEDIA_TYPE);
        assert_eq!(media_type_from_content(&zip_with_entry("ppt/slides/slide1.xml")), PPTX_MEDIA_TYPE);
        assert_eq!(media_type_from_content(&zip_with_entry("data/readme.txt")), "application/zip");
    }

    #[test]
    fn test_content_sniffing_ignores_markers_beyond_probe_window() {
        let mut bytes = zip_with_entry(&"a".repeat(120));
        bytes.extend_from_slice(b"word/document.xml");
        assert_eq!(media_type_from_content(&bytes), "application/zip");
    }

    #[test]
    fn test_content_sniffing_short_buffers_fall_back() {
        assert_eq!(media_type_from_content(b""), OCTET_STREAM);
        assert_eq!(media_type_from_content(b"%PD"), OCTET_STREAM);
        assert_eq!(media_type_from_content(b"PK"), OCTET_STREAM);
    }

    #[test]
    fn test_content_sniffing_plain_text_is_generic() {
        assert_eq!(media_type_from_content(b"hello world"), OCTET_STREAM);
    }
}
