//! Candidate download endpoints, in the order they are tried.
//!
//! The service changes which endpoint variant succeeds for a given file
//! depending on size, sharing settings and rollout, so the engine walks a
//! prioritized list instead of relying on one URL:
//!
//! 1. Workspace export URLs (native format, then pdf) when applicable
//! 2. Usercontent download: default, `authuser=0`, `confirm=t`
//! 3. Two legacy `uc?export=download` URLs

use crate::format::{ExportFormat, WorkspaceKind};

/// Production origin of the file viewer and legacy download endpoint.
pub const DEFAULT_DRIVE_BASE: &str = "https://drive.google.com";
/// Production origin of the Workspace apps.
pub const DEFAULT_DOCS_BASE: &str = "https://docs.google.com";
/// Production origin of the usercontent download endpoint.
pub const DEFAULT_USERCONTENT_BASE: &str = "https://drive.usercontent.google.com";
/// Production metadata API root.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Service origins used to build every request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Viewer pages and legacy `uc` downloads.
    pub drive_base: String,
    /// Workspace app export endpoints.
    pub docs_base: String,
    /// Usercontent `download` endpoint.
    pub usercontent_base: String,
    /// Metadata API root (the `files` collection lives below it).
    pub api_base: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            drive_base: DEFAULT_DRIVE_BASE.to_string(),
            docs_base: DEFAULT_DOCS_BASE.to_string(),
            usercontent_base: DEFAULT_USERCONTENT_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ServiceEndpoints {
    /// Points every endpoint at one origin, keeping the production paths.
    ///
    /// Used for mirrors and mock servers.
    #[must_use]
    pub fn with_single_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            drive_base: base.to_string(),
            docs_base: base.to_string(),
            usercontent_base: base.to_string(),
            api_base: format!("{base}/drive/v3"),
        }
    }

    /// Metadata API URL for `file_id`, with the API key when configured.
    #[must_use]
    pub fn metadata_url(&self, file_id: &str, api_key: Option<&str>) -> String {
        let mut url = format!(
            "{}/files/{file_id}?fields=name,mimeType,size&supportsAllDrives=true",
            self.api_base
        );
        if let Some(key) = api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }

    /// Public view page for `file_id`.
    #[must_use]
    pub fn view_page_url(&self, file_id: &str) -> String {
        format!("{}/file/d/{file_id}/view", self.drive_base)
    }

    /// Per-app export URL.
    #[must_use]
    pub fn export_url(&self, kind: WorkspaceKind, file_id: &str, format: ExportFormat) -> String {
        format!(
            "{}/{}/d/{file_id}/export?format={}",
            self.docs_base,
            kind.app_path(),
            format.as_str()
        )
    }

    /// Canonical confirmation page (`uc?export=download`).
    #[must_use]
    pub fn confirm_page_url(&self, file_id: &str) -> String {
        format!("{}/uc?export=download&id={file_id}", self.drive_base)
    }

    /// Confirmation page URL with the extracted token appended.
    #[must_use]
    pub fn confirmed_download_url(&self, file_id: &str, token: &str) -> String {
        format!(
            "{}&confirm={}",
            self.confirm_page_url(file_id),
            urlencoding::encode(token)
        )
    }

    fn usercontent_url(&self, file_id: &str, qualifier: Option<&str>) -> String {
        let mut url = format!(
            "{}/download?id={file_id}&export=download",
            self.usercontent_base
        );
        if let Some(qualifier) = qualifier {
            url.push('&');
            url.push_str(qualifier);
        }
        url
    }
}

/// Builds the ordered candidate list for one download.
///
/// For Workspace documents, spreadsheets and presentations the export URLs
/// come first: the native format when `export_format` is `Original` or that
/// native format, then pdf when `export_format` is `Original` or `Pdf`.
/// The usercontent and legacy URLs are always appended.
#[must_use]
pub fn build_candidates(
    endpoints: &ServiceEndpoints,
    file_id: &str,
    media_type: Option<&str>,
    export_format: ExportFormat,
) -> Vec<String> {
    let mut candidates = Vec::with_capacity(7);

    if let Some(kind) = media_type.and_then(WorkspaceKind::from_media_type) {
        let native = kind.native_format();
        if matches!(export_format, ExportFormat::Original) || export_format == native {
            candidates.push(endpoints.export_url(kind, file_id, native));
        }
        if matches!(export_format, ExportFormat::Original | ExportFormat::Pdf) {
            candidates.push(endpoints.export_url(kind, file_id, ExportFormat::Pdf));
        }
    }

    candidates.push(endpoints.usercontent_url(file_id, None));
    candidates.push(endpoints.usercontent_url(file_id, Some("authuser=0")));
    candidates.push(endpoints.usercontent_url(file_id, Some("confirm=t")));

    candidates.push(endpoints.confirm_page_url(file_id));
    candidates.push(format!(
        "{}/uc?export=download&id={file_id}",
        endpoints.docs_base
    ));

    candidates
}
