//! Blocking HTTP access to the warehouse page and the config bundle.
//!
//! Provides a trait-based abstraction over the two network operations the
//! pipeline performs, enabling dependency injection for testing, plus the
//! `ureq`-backed production implementation with streamed downloads and
//! chunk-level progress reporting.

use crate::error::{Result, SyncError};
use camino::Utf8Path;
use std::io::{Read, Write};
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for the landing-page fetch.
const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Network timeout for the bundle download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Chunk size for streaming the bundle to disk.
const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Trait for fetching the warehouse page and downloading the bundle.
///
/// Abstractions allow tests to exercise the pipeline without network
/// access.
#[cfg_attr(test, mockall::automock)]
pub trait Downloader {
    /// Fetch the landing page HTML.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-2xx status.
    fn fetch_page(&self, url: &str) -> Result<String>;

    /// Download the archive at `url` into `dest`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, returns a non-2xx status,
    /// or the file cannot be written.
    fn download_archive(&self, url: &str, dest: &Utf8Path) -> Result<u64>;
}

/// HTTP-based downloader using `ureq`.
pub struct HttpDownloader {
    /// Suppress per-chunk progress output.
    pub quiet: bool,
}

impl Downloader for HttpDownloader {
    fn fetch_page(&self, url: &str) -> Result<String> {
        let response = page_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| SyncError::Http {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn download_archive(&self, url: &str, dest: &Utf8Path) -> Result<u64> {
        let response = archive_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let total_bytes = content_length(&response);

        let mut body = response.into_body();
        let mut reader = body.as_reader();
        let mut file = std::fs::File::create(dest)?;
        let mut buffer = [0u8; DOWNLOAD_CHUNK_SIZE];
        let mut downloaded: u64 = 0;

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;

            if !self.quiet {
                if let Some(total) = total_bytes.filter(|total| *total > 0) {
                    let percent = (downloaded as f64 / total as f64) * 100.0;
                    eprint!("\rDownloading: {percent:.1}%");
                }
            }
        }

        if !self.quiet {
            eprintln!("\rDownloaded {downloaded} bytes");
        }
        Ok(downloaded)
    }
}

/// Parse the `Content-Length` header, if present and well-formed.
fn content_length(response: &ureq::http::Response<ureq::Body>) -> Option<u64> {
    response
        .headers()
        .get(ureq::http::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Shared `ureq` agent for page fetches.
fn page_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| agent_with_timeout(PAGE_TIMEOUT))
}

/// Shared `ureq` agent for bundle downloads.
fn archive_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| agent_with_timeout(DOWNLOAD_TIMEOUT))
}

/// Build an agent with a global request timeout.
fn agent_with_timeout(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

/// Map a ureq error to a [`SyncError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> SyncError {
    let reason = match err {
        ureq::Error::StatusCode(code) => format!("HTTP status {code}"),
        other => other.to_string(),
    };
    SyncError::Http {
        url: url.to_owned(),
        reason,
    }
}
