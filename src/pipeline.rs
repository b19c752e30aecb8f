//! Linear sync pipeline orchestration.
//!
//! Runs the six steps strictly in sequence: fetch the warehouse page,
//! resolve the bundle link, stream the download, compare the content
//! digest against the persisted state, extract and locate the target
//! directory, and repackage it. A digest match short-circuits everything
//! after the comparison; any failure aborts the run. All transient files
//! live under the caller-provided working directory, whose cleanup is the
//! caller's responsibility.

use crate::digest::{DigestStore, Sha256Digest, compute_sha256};
use crate::download::Downloader;
use crate::error::{Result, SyncError};
use crate::extraction::{extract_archive, find_directory};
use crate::output::{unchanged_message, updated_message, write_stderr_line};
use crate::packaging::package_directory;
use crate::resolve::resolve_download_url;
use camino::Utf8Path;
use std::io::Write;

/// The warehouse landing page scraped for the bundle link.
pub const WAREHOUSE_URL: &str = "https://github.com/masagrator/FPSLocker-Warehouse";

/// Name of the directory extracted from the bundle and repackaged.
pub const TARGET_DIR_NAME: &str = "SaltySD";

/// Default output archive path.
pub const DEFAULT_OUTPUT: &str = "SaltySD.zip";

/// Default digest state file path.
pub const DEFAULT_HASH_FILE: &str = "fpslocker_last_hash.txt";

/// Filename of the downloaded bundle inside the working directory.
const BUNDLE_FILENAME: &str = "warehouse_bundle.zip";

/// Subdirectory of the working directory the bundle is extracted into.
const EXTRACT_DIRNAME: &str = "extracted";

/// Context for one sync run.
pub struct RunContext<'a> {
    /// Network access for the page fetch and bundle download.
    pub downloader: &'a dyn Downloader,
    /// Warehouse page to scrape.
    pub page_url: &'a str,
    /// Destination of the repackaged archive.
    pub output_path: &'a Utf8Path,
    /// Persisted digest state from previous runs.
    pub store: &'a DigestStore,
    /// Temporary working directory for the bundle and extraction tree.
    pub work_dir: &'a Utf8Path,
    /// Write the digest only after repackaging succeeds.
    ///
    /// The default (false) matches the original behaviour: the digest is
    /// persisted as soon as a change is detected, so a later extraction
    /// or packaging failure leaves it advanced and the next run will not
    /// reprocess an identical bundle.
    pub persist_after_success: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

/// What a successful run did.
#[derive(Debug)]
pub enum Outcome {
    /// The bundle digest matched the stored state; nothing was written.
    Unchanged {
        /// Digest of the downloaded bundle.
        digest: Sha256Digest,
    },
    /// The bundle changed and a fresh output archive was written.
    Updated {
        /// Digest of the downloaded bundle, now persisted.
        digest: Sha256Digest,
        /// Size of the output archive in bytes.
        archive_bytes: u64,
    },
}

/// Run the full sync pipeline.
///
/// Progress lines go to `stderr` unless quiet mode is active.
///
/// # Errors
///
/// Returns an error when any step fails: the page fetch, link
/// resolution, the download, digest I/O, extraction, the directory
/// search, or repackaging.
pub fn run(context: &RunContext<'_>, stderr: &mut dyn Write) -> Result<Outcome> {
    let progress = |stderr: &mut dyn Write, message: &str| {
        if !context.quiet {
            write_stderr_line(stderr, message);
        }
    };

    progress(stderr, &format!("Fetching {}...", context.page_url));
    let html = context.downloader.fetch_page(context.page_url)?;

    let download_url =
        resolve_download_url(&html, context.page_url).ok_or_else(|| SyncError::LinkNotFound {
            page_url: context.page_url.to_owned(),
        })?;
    progress(stderr, &format!("Resolved download link: {download_url}"));

    let bundle_path = context.work_dir.join(BUNDLE_FILENAME);
    let downloaded = context
        .downloader
        .download_archive(&download_url, &bundle_path)?;
    progress(stderr, &format!("Downloaded bundle: {downloaded} bytes"));

    let digest = compute_sha256(&bundle_path)?;
    let stored = context.store.load()?;
    if stored.as_ref() == Some(&digest) {
        progress(stderr, &unchanged_message(&digest));
        return Ok(Outcome::Unchanged { digest });
    }

    match &stored {
        Some(previous) => progress(
            stderr,
            &format!("Bundle changed (new {digest}, previous {previous})"),
        ),
        None => progress(stderr, &format!("No previous digest; processing {digest}")),
    }
    if !context.persist_after_success {
        context.store.save(&digest)?;
    }

    let extract_dir = context.work_dir.join(EXTRACT_DIRNAME);
    std::fs::create_dir_all(&extract_dir)?;
    let entry_count = extract_archive(&bundle_path, &extract_dir)?;
    progress(stderr, &format!("Extracted {entry_count} entries"));

    let target_dir =
        find_directory(&extract_dir, TARGET_DIR_NAME).ok_or_else(|| SyncError::TargetDirNotFound {
            name: TARGET_DIR_NAME.to_owned(),
        })?;
    progress(stderr, &format!("Found {TARGET_DIR_NAME} directory: {target_dir}"));

    let archive_bytes = package_directory(&target_dir, context.output_path)?;
    if context.persist_after_success {
        context.store.save(&digest)?;
    }
    progress(stderr, &updated_message(archive_bytes, context.output_path));

    Ok(Outcome::Updated {
        digest,
        archive_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockDownloader;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    /// Build ZIP bytes from `(name, contents)` pairs.
    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, contents) in entries {
            writer
                .start_file(name.to_string(), options)
                .expect("start entry");
            writer.write_all(contents).expect("write entry");
        }
        writer.finish().expect("finish archive").into_inner()
    }

    fn page_with_link() -> String {
        "<p>To download all configs click here \
         <a href=\"/masagrator/FPSLocker-Warehouse/archive/master.zip\">here</a></p>"
            .to_owned()
    }

    fn mock_for(page: String, archive: Vec<u8>) -> MockDownloader {
        let mut mock = MockDownloader::new();
        mock.expect_fetch_page().returning(move |_| Ok(page.clone()));
        mock.expect_download_archive()
            .returning(move |_, dest| {
                std::fs::write(dest.as_std_path(), &archive).expect("write fixture");
                Ok(archive.len() as u64)
            });
        mock
    }

    struct TestRig {
        _temp: tempfile::TempDir,
        work_dir: Utf8PathBuf,
        output_path: Utf8PathBuf,
        store: DigestStore,
    }

    fn rig() -> TestRig {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 path");
        let work_dir = root.join("work");
        std::fs::create_dir_all(&work_dir).expect("create work dir");
        TestRig {
            output_path: root.join("SaltySD.zip"),
            store: DigestStore::new(root.join("fpslocker_last_hash.txt")),
            _temp: temp,
            work_dir,
        }
    }

    fn context<'a>(rig: &'a TestRig, downloader: &'a dyn Downloader) -> RunContext<'a> {
        RunContext {
            downloader,
            page_url: WAREHOUSE_URL,
            output_path: &rig.output_path,
            store: &rig.store,
            work_dir: &rig.work_dir,
            persist_after_success: false,
            quiet: true,
        }
    }

    #[test]
    fn missing_link_fails_before_any_download() {
        let rig = rig();
        let mut mock = MockDownloader::new();
        mock.expect_fetch_page()
            .returning(|_| Ok("<p>no bundle here</p>".to_owned()));
        mock.expect_download_archive().times(0);

        let mut stderr = Vec::new();
        let result = run(&context(&rig, &mock), &mut stderr);
        assert!(matches!(result, Err(SyncError::LinkNotFound { .. })));
    }

    #[test]
    fn changed_bundle_is_extracted_and_repackaged() {
        let rig = rig();
        let archive = zip_bytes(&[("warehouse/SaltySD/foo.bin", b"foo".as_slice())]);
        let mock = mock_for(page_with_link(), archive);

        let mut stderr = Vec::new();
        let outcome = run(&context(&rig, &mock), &mut stderr).expect("run");

        assert!(matches!(outcome, Outcome::Updated { .. }));
        assert!(rig.output_path.as_std_path().exists());
        assert!(rig.store.load().expect("load").is_some());
    }

    #[test]
    fn matching_digest_short_circuits_processing() {
        let rig = rig();
        let archive = zip_bytes(&[("warehouse/SaltySD/foo.bin", b"foo".as_slice())]);

        // Persist the digest the download will produce.
        let seed = rig.work_dir.join("seed.zip");
        std::fs::write(&seed, &archive).expect("seed");
        let digest = compute_sha256(&seed).expect("digest");
        rig.store.save(&digest).expect("save");

        let mock = mock_for(page_with_link(), archive);
        let mut stderr = Vec::new();
        let outcome = run(&context(&rig, &mock), &mut stderr).expect("run");

        assert!(matches!(outcome, Outcome::Unchanged { .. }));
        assert!(!rig.output_path.as_std_path().exists());
        // The stored digest is untouched.
        assert_eq!(rig.store.load().expect("load"), Some(digest));
    }

    #[rstest]
    #[case::persist_immediately(false, true)]
    #[case::persist_after_success(true, false)]
    fn digest_persistence_timing_on_failed_runs(
        #[case] persist_after_success: bool,
        #[case] expect_digest_saved: bool,
    ) {
        let rig = rig();
        // No SaltySD directory anywhere in the bundle.
        let archive = zip_bytes(&[("warehouse/readme.txt", b"hi".as_slice())]);
        let mock = mock_for(page_with_link(), archive);

        let mut ctx = context(&rig, &mock);
        ctx.persist_after_success = persist_after_success;

        let mut stderr = Vec::new();
        let result = run(&ctx, &mut stderr);
        assert!(matches!(result, Err(SyncError::TargetDirNotFound { .. })));
        assert_eq!(rig.store.load().expect("load").is_some(), expect_digest_saved);
    }

    #[test]
    fn progress_is_silent_in_quiet_mode() {
        let rig = rig();
        let archive = zip_bytes(&[("warehouse/SaltySD/foo.bin", b"foo".as_slice())]);
        let mock = mock_for(page_with_link(), archive);

        let mut stderr = Vec::new();
        run(&context(&rig, &mock), &mut stderr).expect("run");
        assert!(stderr.is_empty(), "expected no output in quiet mode");
    }

    #[test]
    fn progress_reports_each_step() {
        let rig = rig();
        let archive = zip_bytes(&[("warehouse/SaltySD/foo.bin", b"foo".as_slice())]);
        let mock = mock_for(page_with_link(), archive);

        let mut ctx = context(&rig, &mock);
        ctx.quiet = false;

        let mut stderr = Vec::new();
        run(&ctx, &mut stderr).expect("run");
        let output = String::from_utf8(stderr).expect("utf-8 output");
        assert!(output.contains("Resolved download link"));
        assert!(output.contains("Extracted"));
        assert!(output.contains("SaltySD.zip"));
    }
}
