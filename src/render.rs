//! Renders the collected projects through a user-supplied Tera template.

use tera::Tera;
use tracing::debug;

use crate::core::{PipegenError, Result};
use crate::project::Project;

/// GitLab deployment tiers and their short workload tags.
/// <https://docs.gitlab.com/ee/ci/environments/#deployment-tier-of-environments>
const ENVIRONMENT_TIERS: &[(&str, &str)] =
    &[("development", "dev"), ("staging", "stg"), ("production", "prod")];

/// Map an environment name to the workload tag exposed to templates.
///
/// Known tiers always shorten. Unknown names pass through only with
/// `preserve_environment`; otherwise they collapse to the empty tag, as
/// does an empty environment.
pub fn workload_tag(environment: &str, preserve_environment: bool) -> String {
    if environment.is_empty() {
        return String::new();
    }
    match ENVIRONMENT_TIERS.iter().find(|(name, _)| *name == environment) {
        Some((_, tag)) => (*tag).to_string(),
        None if preserve_environment => environment.to_string(),
        None => String::new(),
    }
}

/// Render `template_source` with the pipeline context: `projects` (each
/// with `source_path` and `dependencies`), `needs` (the parallel hint),
/// and `workload`.
pub fn render(
    template_source: &str,
    projects: &[Project],
    parallel: bool,
    workload: &str,
) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("pipeline", template_source)
        .map_err(|err| PipegenError::Render { reason: err.to_string() })?;

    let mut context = tera::Context::new();
    context.insert("projects", projects);
    context.insert("needs", &parallel);
    context.insert("workload", workload);

    debug!(projects = projects.len(), workload, "rendering pipeline template");
    tera.render("pipeline", &context)
        .map_err(|err| PipegenError::Render { reason: err.to_string() })
}
