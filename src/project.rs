//! Builds CI project records from resolved dependency sets.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::core::Result;
use crate::paths;
use crate::resolver::{DependencyResolver, locals};

/// One pipeline-worthy module: its own directory relative to the
/// repository root, plus everything whose change should retrigger it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub source_path: String,
    pub dependencies: Vec<String>,
}

/// Turns a module config path into a [`Project`], or `None` when the
/// module opts out (parent/include-only, or a `skip` local).
pub struct ProjectBuilder<'a> {
    resolver: &'a DependencyResolver,
}

impl<'a> ProjectBuilder<'a> {
    pub fn new(resolver: &'a DependencyResolver) -> Self {
        Self { resolver }
    }

    pub async fn build(&self, module_path: &str) -> Result<Option<Project>> {
        let Some(dependencies) = self.resolver.resolve(module_path).await? else {
            debug!(module_path, "not a project, skipping");
            return Ok(None);
        };

        let root = &self.resolver.options().root;
        let config_path = Path::new(module_path);
        let resolved_locals = locals::resolve_locals(config_path, root)?;
        if resolved_locals.skip.unwrap_or(false) {
            debug!(module_path, "skipped via locals");
            return Ok(None);
        }

        let module_dir = config_path.parent().unwrap_or(Path::new("/"));
        let source_path = paths::relative_to_root(&paths::to_slash(module_dir), root);

        // The module's own tree always comes first; resolved dependencies
        // follow in resolution order, rebased to the root.
        let mut dependencies_rel = Vec::with_capacity(dependencies.len() + 1);
        dependencies_rel.push(format!("{source_path}/**/*"));
        for dep in &dependencies {
            dependencies_rel.push(paths::relative_to_root(dep, root));
        }

        Ok(Some(Project { source_path, dependencies: dependencies_rel }))
    }
}
