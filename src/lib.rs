//! Warehouse sync library.
//!
//! This crate provides the building blocks of the `fpslocker-sync` CLI,
//! which mirrors the FPSLocker-Warehouse config bundle as a
//! distributable `SaltySD.zip`. The binary wires them into a single
//! linear pipeline; the pieces are exposed here so they can be tested
//! without network access.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`digest`] - SHA-256 digests and the persisted change-detection state
//! - [`download`] - Blocking HTTP page fetch and streamed bundle download
//! - [`error`] - Semantic error types
//! - [`extraction`] - Bundle extraction and target-directory search
//! - [`output`] - Progress line writing and user-facing messages
//! - [`packaging`] - Repackaging the target directory into the output ZIP
//! - [`pipeline`] - Linear orchestration of the six sync steps
//! - [`resolve`] - Download-link resolution from the page HTML

pub mod cli;
pub mod digest;
pub mod download;
pub mod error;
pub mod extraction;
pub mod output;
pub mod packaging;
pub mod pipeline;
pub mod resolve;
