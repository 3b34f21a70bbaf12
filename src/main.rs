//! CLI entry point for drive-downloader.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use drive_downloader::{DownloadResult, DriveDownloader, sanitize_file_name, save_to_file};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let downloader = DriveDownloader::new(args.drive_config())?;

    let failed = if args.info {
        print_metadata(&downloader, &args.urls).await?
    } else {
        download_all(&downloader, &args).await
    };

    if failed > 0 {
        bail!("{failed} of {} URL(s) failed", args.urls.len());
    }
    Ok(())
}

/// Prints one JSON document per URL; returns the number of failures.
async fn print_metadata(downloader: &DriveDownloader, urls: &[String]) -> Result<usize> {
    let mut failed = 0;
    for url in urls {
        match downloader.get_file_metadata(url).await {
            Ok(metadata) => println!("{}", serde_json::to_string_pretty(&metadata)?),
            Err(error) => {
                warn!(url = %url, error = %error, "metadata lookup failed");
                failed += 1;
            }
        }
    }
    Ok(failed)
}

/// Downloads URLs one at a time; returns the number of failures.
async fn download_all(downloader: &DriveDownloader, args: &Args) -> usize {
    let options = args.download_options();
    let spinner = spinner(args.quiet);
    let total = args.urls.len();
    let mut failed = 0;

    for (index, url) in args.urls.iter().enumerate() {
        spinner.set_message(format!("[{}/{total}] {url}", index + 1));

        let result = downloader.download(url, &options).await;
        let DownloadResult::Success(success) = &result else {
            warn!(url = %url, error = result.error().unwrap_or_default(), "download failed");
            failed += 1;
            continue;
        };

        let path = args.output_dir.join(sanitize_file_name(success.file_name()));
        match save_to_file(result, &path).await {
            Ok(bytes) => {
                spinner.suspend(|| info!(path = %path.display(), bytes, "saved"));
            }
            Err(error) => {
                warn!(url = %url, error = %error, "saving failed");
                failed += 1;
            }
        }
    }

    spinner.finish_and_clear();
    failed
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
