//! Progress and diagnostic output for the sync CLI.
//!
//! All user-facing lines go through an injected writer so tests can
//! capture them. Output is human-readable only; there is no stable,
//! machine-parseable schema.

use crate::digest::Sha256Digest;
use camino::Utf8Path;
use std::io::Write;

/// Write a single line to the provided stderr handle.
///
/// Write failures are ignored; losing a progress line must never abort
/// the pipeline.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Message for a run that skipped processing because nothing changed.
#[must_use]
pub fn unchanged_message(digest: &Sha256Digest) -> String {
    format!("Bundle unchanged (digest {digest}); skipping repackaging")
}

/// Message for a run that produced a fresh output archive.
#[must_use]
pub fn updated_message(archive_bytes: u64, output_path: &Utf8Path) -> String {
    format!("Wrote {output_path} ({archive_bytes} bytes)")
}
