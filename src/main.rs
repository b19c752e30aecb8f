//! Warehouse sync CLI entrypoint.
//!
//! Parses arguments, allocates the temporary working directory, runs the
//! sync pipeline, and maps the result to an exit code. The working
//! directory is owned here so its removal is guaranteed on every exit
//! path, including early errors and panics.

use camino::Utf8PathBuf;
use clap::Parser;
use fpslocker_sync::cli::Cli;
use fpslocker_sync::digest::DigestStore;
use fpslocker_sync::download::HttpDownloader;
use fpslocker_sync::error::{Result, SyncError};
use fpslocker_sync::output::write_stderr_line;
use fpslocker_sync::pipeline::{self, Outcome, RunContext};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<Outcome> {
    let temp = tempfile::Builder::new()
        .prefix("fpslocker_")
        .tempdir()
        .map_err(|e| SyncError::Workspace {
            reason: e.to_string(),
        })?;
    let work_dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).map_err(|e| {
        SyncError::Workspace {
            reason: format!("temporary directory is not valid UTF-8: {e}"),
        }
    })?;
    if !cli.quiet {
        write_stderr_line(stderr, format!("Working directory: {work_dir}"));
    }

    let downloader = HttpDownloader { quiet: cli.quiet };
    let store = DigestStore::new(cli.hash_file.clone());
    let context = RunContext {
        downloader: &downloader,
        page_url: &cli.page_url,
        output_path: &cli.output,
        store: &store,
        work_dir: &work_dir,
        persist_after_success: cli.persist_after_success,
        quiet: cli.quiet,
    };

    pipeline::run(&context, stderr)
    // `temp` drops here, removing the working directory on success and
    // on every error path above.
}

fn exit_code_for_run_result(result: Result<Outcome>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
