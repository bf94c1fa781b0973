//! The `generate` command: discover modules, resolve dependencies, render.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use tracing::info;

use crate::discovery;
use crate::orchestrator;
use crate::paths;
use crate::render;
use crate::resolver::{DependencyResolver, ResolveOptions};

/// Generate the GitLab CI configuration for a Terragrunt repository.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Root directory of the repository to scan.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Environment folder name to restrict discovery to. GitLab deployment
    /// tiers (development, staging, production) are shortened in the
    /// rendered workload tag.
    #[arg(long, default_value = "")]
    pub environment: String,

    /// Keep an unrecognized environment name as the workload tag instead
    /// of dropping it.
    #[arg(long)]
    pub preserve_environment: bool,

    /// Ignore dependencies declared in `dependency`/`dependencies` blocks.
    #[arg(long)]
    pub ignore_dependency_blocks: bool,

    /// Follow dependencies of dependencies all the way down.
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub cascade_dependencies: bool,

    /// Hint templates that plans and applies may run in parallel.
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub parallel: bool,

    /// Maximum number of modules resolved concurrently.
    #[arg(long, default_value_t = 500)]
    pub max_parallel: usize,

    /// Path to the Tera template to render.
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the rendered configuration.
    #[arg(long, default_value = ".gitlab-ci.yml")]
    pub output: PathBuf,
}

impl GenerateCommand {
    pub async fn execute(self) -> Result<()> {
        let root = fs::canonicalize(&self.root)
            .with_context(|| format!("cannot resolve root directory {}", self.root.display()))?;
        let root = paths::normalize(&root);
        info!(root = %root.display(), "scanning for Terragrunt modules");

        // Read the template before doing any expensive work so a bad
        // --input fails immediately.
        let template = fs::read_to_string(&self.input)
            .with_context(|| format!("cannot read template {}", self.input.display()))?;

        let modules = discovery::discover(&root, &self.environment)?;
        info!(count = modules.len(), "discovered module configurations");

        let mut options = ResolveOptions::new(&root);
        options.cascade_dependencies = self.cascade_dependencies;
        options.ignore_dependency_blocks = self.ignore_dependency_blocks;
        let resolver = Arc::new(DependencyResolver::new(options));

        let projects =
            orchestrator::collect_projects(&resolver, &modules, self.max_parallel).await?;
        info!(count = projects.len(), "built projects");

        let workload = render::workload_tag(&self.environment, self.preserve_environment);
        let rendered = render::render(&template, &projects, self.parallel, &workload)?;

        fs::write(&self.output, rendered)
            .with_context(|| format!("cannot write {}", self.output.display()))?;
        println!(
            "Generated {} ({} project{})",
            self.output.display(),
            projects.len(),
            if projects.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }
}
