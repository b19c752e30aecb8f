//! SHA-256 content digests and the persisted change-detection state.
//!
//! The sync pipeline decides whether to repackage by comparing the digest
//! of the freshly downloaded bundle against a single-line digest file left
//! behind by the previous run. This module provides the validated digest
//! newtype, streaming file hashing, and the load/save logic for that file.

use crate::error::{Result, SyncError};
use camino::{Utf8Path, Utf8PathBuf};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Block size for streaming file hashing.
const HASH_BLOCK_SIZE: usize = 8192;

/// A validated hex-encoded SHA-256 digest string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = SyncError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self> {
        validate_sha256(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded SHA-256 digest.
fn validate_sha256(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(SyncError::InvalidDigest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(SyncError::InvalidDigest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(SyncError::InvalidDigest {
            reason: "digest must be lowercase".to_owned(),
        });
    }
    Ok(())
}

/// Compute the SHA-256 digest of a file.
///
/// Reads the file at `path` in fixed-size blocks so arbitrarily large
/// bundles never need to fit in memory.
///
/// # Errors
///
/// Returns [`SyncError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<Sha256Digest> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_BLOCK_SIZE];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    let hex = format!("{:x}", hasher.finalize());
    Sha256Digest::try_from(hex)
}

/// The digest file persisted between runs.
///
/// Holds a single lowercase hex line, no trailing-newline guarantee. An
/// absent file means "no prior digest". A malformed line is treated the
/// same way, after a logged warning, so a corrupted state file forces a
/// full run instead of failing forever.
#[derive(Debug, Clone)]
pub struct DigestStore {
    path: Utf8PathBuf,
}

impl DigestStore {
    /// Create a store backed by the digest file at `path`.
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing digest file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load the previously persisted digest, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<Sha256Digest>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SyncError::Io(err)),
        };
        match Sha256Digest::try_from(contents.trim()) {
            Ok(digest) => Ok(Some(digest)),
            Err(err) => {
                log::warn!(
                    "ignoring malformed digest file {path}: {err}",
                    path = self.path
                );
                Ok(None)
            }
        }
    }

    /// Persist `digest` as the single line of the digest file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the file cannot be written.
    pub fn save(&self, digest: &Sha256Digest) -> Result<()> {
        std::fs::write(&self.path, digest.as_str())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_digest() -> String {
        "a".repeat(64)
    }

    #[test]
    fn accepts_valid_sixty_four_char_hex() {
        let digest = Sha256Digest::try_from(valid_digest().as_str());
        assert!(digest.is_ok());
    }

    #[rstest]
    #[case::too_short("abcdef")]
    #[case::not_hex_at_all("not a digest")]
    fn rejects_wrong_shapes(#[case] value: &str) {
        assert!(Sha256Digest::try_from(value).is_err());
    }

    #[test]
    fn rejects_too_long_values() {
        let long = "a".repeat(65);
        assert!(Sha256Digest::try_from(long.as_str()).is_err());
    }

    #[test]
    fn rejects_non_hex_character() {
        let mut bad = "a".repeat(63);
        bad.push('g');
        assert!(Sha256Digest::try_from(bad.as_str()).is_err());
    }

    #[test]
    fn rejects_uppercase_hex() {
        let bad = "A".repeat(64);
        assert!(Sha256Digest::try_from(bad.as_str()).is_err());
    }

    #[test]
    fn compute_is_deterministic() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join("bundle.bin")).expect("utf-8 path");
        std::fs::write(&path, b"the same bytes").expect("write");

        let first = compute_sha256(&path).expect("first digest");
        let second = compute_sha256(&path).expect("second digest");
        assert_eq!(first, second);
    }

    #[test]
    fn compute_changes_when_one_byte_changes() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join("bundle.bin")).expect("utf-8 path");

        std::fs::write(&path, b"payload A").expect("write");
        let before = compute_sha256(&path).expect("digest before");

        std::fs::write(&path, b"payload B").expect("rewrite");
        let after = compute_sha256(&path).expect("digest after");

        assert_ne!(before, after);
    }

    #[test]
    fn load_returns_none_for_absent_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join("missing.txt")).expect("utf-8 path");
        let store = DigestStore::new(path);
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join("state.txt")).expect("utf-8 path");
        let store = DigestStore::new(path);
        let digest = Sha256Digest::try_from(valid_digest()).expect("known good");

        store.save(&digest).expect("save");
        let loaded = store.load().expect("load");
        assert_eq!(loaded, Some(digest));
    }

    #[test]
    fn load_tolerates_surrounding_whitespace() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join("state.txt")).expect("utf-8 path");
        std::fs::write(&path, format!("{}\n", valid_digest())).expect("write");

        let store = DigestStore::new(path);
        let loaded = store.load().expect("load");
        assert_eq!(loaded, Some(Sha256Digest::try_from(valid_digest()).expect("valid")));
    }

    #[test]
    fn load_treats_garbage_as_no_prior_digest() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join("state.txt")).expect("utf-8 path");
        std::fs::write(&path, "not a digest").expect("write");

        let store = DigestStore::new(path);
        assert!(store.load().expect("load").is_none());
    }
}
