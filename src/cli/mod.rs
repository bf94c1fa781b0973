//! Command-line interface for terragrunt-pipegen.
//!
//! The CLI currently exposes a single subcommand, `generate`, which walks
//! a repository of Terragrunt modules, resolves every module's dependency
//! closure, and renders a GitLab CI pipeline from a template.
//!
//! # Global Options
//!
//! - `--verbose` enables debug-level logging
//! - `--quiet` suppresses everything below warnings
//!
//! Both are translated into a `tracing` filter; `RUST_LOG` still wins
//! when set explicitly.
//!
//! # Example
//!
//! ```bash
//! tg-pipegen generate --root /repo --input ci.yml.tera --output .gitlab-ci.yml
//! ```

mod generate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use generate::GenerateCommand;

#[derive(Parser)]
#[command(
    name = "tg-pipegen",
    about = "Generate GitLab CI pipelines from Terragrunt dependency graphs",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover Terragrunt modules and render the CI configuration.
    Generate(GenerateCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        self.init_logging();
        match self.command {
            Commands::Generate(cmd) => cmd.execute().await,
        }
    }

    /// Install the global tracing subscriber. An explicit `RUST_LOG` takes
    /// precedence over the verbosity flags.
    fn init_logging(&self) {
        let default_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
    }
}
