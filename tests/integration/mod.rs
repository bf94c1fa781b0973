//! End-to-end tests for the `tg-pipegen` binary.
//!
//! Each test builds a small Terragrunt repository in a temp directory,
//! runs `tg-pipegen generate` against it, and inspects the rendered
//! output file.
//!
//! ```bash
//! cargo test --test integration
//! ```

#[path = "../common/mod.rs"]
mod common;

mod errors;
mod generate;
