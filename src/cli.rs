//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use drive_downloader::user_agent::tool_user_agent;
use drive_downloader::{DEFAULT_MAX_RETRIES, DownloadOptions, DriveConfig, ExportFormat};

/// Download publicly shared files from a sharing link.
///
/// Each URL is resolved, fetched through the endpoint fallback chain and
/// saved into the output directory under its (sanitized) display name.
#[derive(Parser, Debug)]
#[command(name = "drive-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Sharing URLs to download
    #[arg(required = true, value_name = "URLS")]
    pub urls: Vec<String>,

    /// Directory to save files into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Export format for Workspace documents (original, pdf, docx, xlsx, pptx)
    #[arg(short, long, default_value_t = ExportFormat::Original)]
    pub format: ExportFormat,

    /// Pipe the response straight to disk instead of buffering it
    #[arg(long)]
    pub stream: bool,

    /// Print file metadata as JSON instead of downloading
    #[arg(long)]
    pub info: bool,

    /// Maximum retry attempts for metadata resolution (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Per-request timeout in milliseconds (1-600000)
    #[arg(short = 't', long, default_value_t = 30_000, value_parser = clap::value_parser!(u64).range(1..=600_000))]
    pub timeout_ms: u64,

    /// Metadata API key
    #[arg(long, env = "DRIVE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Fail when metadata cannot be resolved instead of using file_<id>
    #[arg(long)]
    pub strict_metadata: bool,

    /// Send a drive-downloader User-Agent instead of a browser one
    #[arg(long)]
    pub identify: bool,

    /// Serve every endpoint from this origin (mirrors and testing)
    #[arg(long, hide = true)]
    pub service_base_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Engine configuration selected by the flags.
    pub fn drive_config(&self) -> DriveConfig {
        let mut config = match &self.service_base_url {
            Some(base) => DriveConfig::with_service_base(base),
            None => DriveConfig::default(),
        };
        config.api_key.clone_from(&self.api_key);
        config.strict_metadata = self.strict_metadata;
        if self.identify {
            config.user_agent = tool_user_agent();
        }
        config
    }

    /// Per-call options selected by the flags.
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions::default()
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_max_retries(u32::from(self.max_retries))
            .with_export_format(self.format)
            .with_buffer(!self.stream)
    }
}
