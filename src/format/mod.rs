//! Export formats, Workspace document kinds, and media-type inference.
//!
//! - [`ExportFormat`] - target representation requested by the caller
//! - [`WorkspaceKind`] - convertible Workspace document families
//! - [`available_formats`] - export menu for a media type
//! - [`mime`] - media type from file extension or leading bytes
//! - [`filename`] - on-disk name sanitization and extension handling

pub mod filename;
pub mod mime;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Media-type prefix shared by every native Workspace file.
pub const WORKSPACE_MEDIA_PREFIX: &str = "application/vnd.google-apps.";

/// Requested target representation of a download.
///
/// `Original` keeps the file as stored; for Workspace documents the engine
/// then tries the native Office format first and pdf as fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Keep the stored representation.
    #[default]
    Original,
    /// Portable Document Format.
    Pdf,
    /// Word document.
    Docx,
    /// Excel workbook.
    Xlsx,
    /// PowerPoint deck.
    Pptx,
}

impl ExportFormat {
    /// Returns the lowercase label, which is also the file extension for
    /// every format except `Original`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
        }
    }

    /// File extension for converted output, `None` for `Original`.
    #[must_use]
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Original => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            "pptx" => Ok(Self::Pptx),
            other => Err(format!(
                "unknown export format '{other}' (expected original, pdf, docx, xlsx or pptx)"
            )),
        }
    }
}

/// Workspace document families that support format-specific export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceKind {
    /// Docs.
    Document,
    /// Sheets.
    Spreadsheet,
    /// Slides.
    Presentation,
}

impl WorkspaceKind {
    /// Classifies a Workspace media type (`application/vnd.google-apps.*`).
    ///
    /// Office or other third-party media types return `None` even when they
    /// contain the word "document".
    #[must_use]
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim().strip_prefix(WORKSPACE_MEDIA_PREFIX)? {
            "document" => Some(Self::Document),
            "spreadsheet" => Some(Self::Spreadsheet),
            "presentation" => Some(Self::Presentation),
            _ => None,
        }
    }

    /// The Office format this kind exports to natively.
    #[must_use]
    pub fn native_format(self) -> ExportFormat {
        match self {
            Self::Document => ExportFormat::Docx,
            Self::Spreadsheet => ExportFormat::Xlsx,
            Self::Presentation => ExportFormat::Pptx,
        }
    }

    /// Path segment of the per-app export endpoint.
    #[must_use]
    pub fn app_path(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Spreadsheet => "spreadsheets",
            Self::Presentation => "presentation",
        }
    }
}

/// Returns true for any native Workspace media type (docs, sheets, slides,
/// forms, drawings, ...).
#[must_use]
pub fn is_workspace_media_type(media_type: &str) -> bool {
    media_type.trim().starts_with(WORKSPACE_MEDIA_PREFIX)
}

const DOCUMENT_FORMATS: &[&str] = &["pdf", "docx", "odt", "rtf", "txt", "html", "epub"];
const SPREADSHEET_FORMATS: &[&str] = &["pdf", "xlsx", "ods", "csv", "tsv", "html", "zip"];
const PRESENTATION_FORMATS: &[&str] = &["pdf", "pptx", "odp", "txt", "jpeg", "png", "svg"];
const DRAWING_FORMATS: &[&str] = &["pdf", "svg", "png", "jpeg"];
const DEFAULT_FORMATS: &[&str] = &["pdf"];

/// Export menu for a media type, keyed by substring match.
///
/// Absent media type yields an empty list; unrecognized types get `["pdf"]`.
#[must_use]
pub fn available_formats(media_type: Option<&str>) -> Vec<&'static str> {
    let Some(media_type) = media_type else {
        return Vec::new();
    };
    let menu = if media_type.contains("document") {
        DOCUMENT_FORMATS
    } else if media_type.contains("spreadsheet") {
        SPREADSHEET_FORMATS
    } else if media_type.contains("presentation") {
        PRESENTATION_FORMATS
    } else if media_type.contains("drawing") {
        DRAWING_FORMATS
    } else {
        DEFAULT_FORMATS
    };
    menu.to_vec()
}
