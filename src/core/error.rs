//! Error handling for terragrunt-pipegen.
//!
//! The error system is built around a single strongly-typed enum,
//! [`PipegenError`], covering every failure mode of the discovery →
//! resolution → rendering pipeline, plus a small user-facing display
//! helper used by the CLI entry point.
//!
//! # Design notes
//!
//! - Every variant carries owned `String` context instead of wrapping the
//!   source error directly. This keeps the enum `Clone`, which matters
//!   because a failed resolution is cached and the same error value is
//!   handed to every coalesced caller of that module path.
//! - `anyhow::Result` is used at command boundaries for context chaining;
//!   `PipegenError` is the domain currency inside the resolver, parser,
//!   and renderer.
//!
//! # Error categories
//!
//! - [`PipegenError::Io`] - a configuration or template file could not be read
//! - [`PipegenError::Parse`] - malformed HCL in a module configuration
//! - [`PipegenError::AddressResolution`] - a `terraform.source` address could
//!   not be normalized
//! - [`PipegenError::CycleDetected`] - a dependency cycle between modules
//! - [`PipegenError::Render`] - template rendering failed

use colored::Colorize;
use std::path::Path;
use thiserror::Error;

/// The main error type for terragrunt-pipegen operations.
///
/// All variants are cheap to clone so results (including failures) can be
/// memoized in the dependency cache and shared between concurrent callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipegenError {
    /// A file could not be read from disk.
    ///
    /// Fatal for the module being resolved; swallowed when it occurs while
    /// cascading into a child dependency (the parent's closure is built
    /// from whatever children succeeded).
    #[error("failed to read {path}: {reason}")]
    Io {
        /// Path of the file that could not be read
        path: String,
        /// Underlying I/O error message
        reason: String,
    },

    /// A module configuration file contains malformed HCL.
    #[error("failed to parse {file}: {reason}")]
    Parse {
        /// Path of the configuration file that failed to parse
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A `terraform.source` address could not be normalized into either a
    /// local filesystem path or a remote address.
    #[error("cannot resolve source address '{address}': {reason}")]
    AddressResolution {
        /// The source address as written in the configuration
        address: String,
        /// Why detection failed
        reason: String,
    },

    /// A module's dependency closure loops back onto a module that is
    /// still being resolved in the same top-level request.
    ///
    /// The cycle is reported for the module where the closure re-entered
    /// itself. During cascading this error is swallowed like any other
    /// child failure, so a misconfigured cycle truncates the closure
    /// instead of hanging the process.
    #[error("dependency cycle detected at {path}")]
    CycleDetected {
        /// The module path that was revisited while still in progress
        path: String,
    },

    /// The pipeline template failed to render.
    ///
    /// Fatal at the top level; no output artifact is written.
    #[error("template rendering failed: {reason}")]
    Render {
        /// Renderer diagnostic
        reason: String,
    },
}

impl PipegenError {
    /// Build an [`PipegenError::Io`] from a path and an [`std::io::Error`].
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(), reason: err.to_string() }
    }

    /// Build a [`PipegenError::Parse`] from a path and any parser diagnostic.
    pub fn parse(file: &Path, reason: impl std::fmt::Display) -> Self {
        Self::Parse { file: file.display().to_string(), reason: reason.to_string() }
    }
}

/// Print an error chain to stderr in the CLI's standard format.
///
/// The top-level message is highlighted; nested `anyhow` context frames
/// are listed underneath, mirroring how `cargo` reports failures.
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {}", "error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".yellow(), cause);
    }
}
