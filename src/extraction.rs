//! Bundle extraction and target-directory search.
//!
//! Unpacks the downloaded ZIP into a scratch directory, skipping entries
//! whose names would escape the destination, then walks the extracted
//! tree for the first directory carrying the target name. The walk is
//! file-name-sorted pre-order, so "first match" is a deterministic policy
//! rather than an accident of filesystem ordering; duplicates are
//! resolved silently by that order.

use crate::error::{Result, SyncError};
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Extract the ZIP archive at `archive_path` fully into `dest_dir`.
///
/// Returns the number of entries written. Entries with names that cannot
/// be safely joined under the destination (absolute paths, `..`
/// components) are skipped with a warning.
///
/// # Errors
///
/// Returns [`SyncError::Archive`] if the archive cannot be opened or an
/// entry cannot be read, and [`SyncError::Io`] on filesystem failures.
pub fn extract_archive(archive_path: &Utf8Path, dest_dir: &Utf8Path) -> Result<usize> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| SyncError::Archive {
        path: archive_path.to_owned(),
        reason: e.to_string(),
    })?;

    let mut extracted = 0usize;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| SyncError::Archive {
            path: archive_path.to_owned(),
            reason: format!("failed to read entry {index}: {e}"),
        })?;

        let Some(relative) = entry.enclosed_name() else {
            log::warn!("skipping archive entry with unsafe name: {}", entry.name());
            continue;
        };
        let dest_path = dest_dir.as_std_path().join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut outfile = std::fs::File::create(&dest_path)?;
            std::io::copy(&mut entry, &mut outfile)?;
        }
        extracted += 1;
    }

    Ok(extracted)
}

/// Find the first directory named exactly `name` under `root`.
///
/// The search is a file-name-sorted pre-order walk; the first match wins.
/// Unreadable entries are skipped. Returns `None` when no such directory
/// exists anywhere under `root`.
#[must_use]
pub fn find_directory(root: &Utf8Path, name: &str) -> Option<Utf8PathBuf> {
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if entry.file_type().is_dir() && entry.file_name().to_str() == Some(name) {
            return Utf8PathBuf::from_path_buf(entry.into_path()).ok();
        }
    }
    None
}
