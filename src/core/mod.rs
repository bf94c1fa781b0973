//! Core types and error handling.
//!
//! This module hosts the crate-wide error type and the conventions shared
//! by every other module: the conventional Terragrunt configuration
//! filename and the glob suffixes attached to module directories.

pub mod error;

pub use error::{PipegenError, display_error};

/// The conventional Terragrunt configuration filename.
///
/// Module discovery looks for files with this exact name, and dependency
/// paths declared in `dependencies` blocks are joined with it.
pub const CONFIG_FILENAME: &str = "terragrunt.hcl";

/// Glob suffix matching Terraform sources inside a local module directory.
pub const TF_SOURCE_GLOB: &str = "*.tf*";

/// Crate-wide result alias for domain operations.
pub type Result<T> = std::result::Result<T, PipegenError>;
