//! Repackaging the target directory into the distributable archive.
//!
//! Walks the found directory recursively and writes every regular file
//! into a fresh ZIP with deflate compression. Entry names are computed
//! relative to the directory's parent, so the archive is rooted at the
//! directory's own name (`SaltySD/...`). Any pre-existing archive at the
//! output path is overwritten.

use crate::error::{Result, SyncError};
use camino::Utf8Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

/// Zip `source_dir` into a new archive at `output_path`.
///
/// Returns the size of the written archive in bytes.
///
/// # Errors
///
/// Returns [`SyncError::Packaging`] if an archive entry cannot be
/// written, and [`SyncError::Io`] on filesystem failures.
pub fn package_directory(source_dir: &Utf8Path, output_path: &Utf8Path) -> Result<u64> {
    let archive_root = source_dir.parent().ok_or_else(|| SyncError::Packaging {
        path: output_path.to_owned(),
        reason: format!("source directory {source_dir} has no parent"),
    })?;

    let file = std::fs::File::create(output_path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| SyncError::Packaging {
            path: output_path.to_owned(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let source_path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
            SyncError::Packaging {
                path: output_path.to_owned(),
                reason: format!("non-UTF-8 path under {source_dir}"),
            }
        })?;
        let entry_name = entry_name_for(source_path, archive_root)?;

        writer
            .start_file(entry_name, options)
            .map_err(|e| SyncError::Packaging {
                path: output_path.to_owned(),
                reason: e.to_string(),
            })?;
        let mut source = std::fs::File::open(source_path)?;
        std::io::copy(&mut source, &mut writer)?;
    }

    writer.finish().map_err(|e| SyncError::Packaging {
        path: output_path.to_owned(),
        reason: e.to_string(),
    })?;

    Ok(std::fs::metadata(output_path)?.len())
}

/// Compute the archive entry name for `path`, relative to `archive_root`,
/// using forward slashes regardless of platform.
fn entry_name_for(path: &Utf8Path, archive_root: &Utf8Path) -> Result<String> {
    let relative = path
        .strip_prefix(archive_root)
        .map_err(|_| SyncError::Packaging {
            path: path.to_owned(),
            reason: format!("{path} is not under {archive_root}"),
        })?;
    let components: Vec<&str> = relative.components().map(|c| c.as_str()).collect();
    Ok(components.join("/"))
}
