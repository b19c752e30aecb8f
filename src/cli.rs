//! CLI argument definitions for the warehouse sync tool.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary small and
//! focused on orchestration.

use crate::pipeline::{DEFAULT_HASH_FILE, DEFAULT_OUTPUT, WAREHOUSE_URL};
use camino::Utf8PathBuf;
use clap::Parser;

/// Mirror the FPSLocker-Warehouse config bundle as SaltySD.zip.
#[derive(Parser, Debug)]
#[command(name = "fpslocker-sync")]
#[command(version, about)]
#[command(long_about = concat!(
    "Mirror the FPSLocker-Warehouse config bundle as SaltySD.zip.\n\n",
    "The tool scrapes the warehouse landing page for the \"download all ",
    "configs\" link, streams the linked ZIP to a temporary file, and ",
    "compares its SHA-256 digest against the one persisted by the ",
    "previous run. When the bundle changed, it extracts the archive, ",
    "locates the SaltySD directory, and repackages it into the output ",
    "archive. When nothing changed, the run exits successfully without ",
    "touching the output.\n\n",
    "All temporary files live in a process-specific directory that is ",
    "removed on every exit path.",
))]
pub struct Cli {
    /// Warehouse page to scrape for the bundle link.
    #[arg(long, value_name = "URL", default_value = WAREHOUSE_URL)]
    pub page_url: String,

    /// Output archive path, overwritten on success.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: Utf8PathBuf,

    /// Digest state file used for change detection.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_HASH_FILE)]
    pub hash_file: Utf8PathBuf,

    /// Persist the digest only after repackaging succeeds.
    ///
    /// By default the digest is written as soon as a change is detected,
    /// before extraction; a failure later in the run then leaves the
    /// digest advanced and the next run will skip an identical bundle.
    #[arg(long)]
    pub persist_after_success: bool,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}
