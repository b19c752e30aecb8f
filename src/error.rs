//! Error types for the warehouse sync CLI.
//!
//! This module defines semantic error variants for each pipeline step.
//! Every fatal path is rendered once at the top level and mapped to exit
//! code 1; the variants exist so messages can name what actually failed.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An HTTP request failed (transport error or non-2xx status).
    #[error("request failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// No download link could be resolved from the warehouse page.
    #[error("no download link found on {page_url}")]
    LinkNotFound {
        /// The page that was searched.
        page_url: String,
    },

    /// The temporary workspace could not be created or addressed.
    #[error("temporary workspace unavailable: {reason}")]
    Workspace {
        /// Description of why the workspace is unusable.
        reason: String,
    },

    /// The downloaded archive could not be read or extracted.
    #[error("invalid archive {path}: {reason}")]
    Archive {
        /// Path to the offending archive.
        path: Utf8PathBuf,
        /// Description of the archive failure.
        reason: String,
    },

    /// Writing the output archive failed.
    #[error("packaging failed for {path}: {reason}")]
    Packaging {
        /// Path to the output archive being written.
        path: Utf8PathBuf,
        /// Description of the packaging failure.
        reason: String,
    },

    /// The extracted bundle contains no directory with the expected name.
    #[error("no directory named {name} in the extracted bundle")]
    TargetDirNotFound {
        /// The directory name that was searched for.
        name: String,
    },

    /// A digest value was not a well-formed SHA-256 hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidDigest {
        /// Description of the malformation.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`SyncError`].
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_not_found_names_the_page() {
        let err = SyncError::LinkNotFound {
            page_url: "https://example.test/warehouse".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no download link"));
        assert!(msg.contains("example.test/warehouse"));
    }

    #[test]
    fn http_error_includes_url_and_reason() {
        let err = SyncError::Http {
            url: "https://example.test/bundle.zip".to_owned(),
            reason: "connection reset".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bundle.zip"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn target_dir_not_found_names_the_directory() {
        let err = SyncError::TargetDirNotFound {
            name: "SaltySD".to_owned(),
        };
        assert!(err.to_string().contains("SaltySD"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io = std::io::Error::other("disk full");
        let err = SyncError::from(io);
        assert!(matches!(err, SyncError::Io(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
