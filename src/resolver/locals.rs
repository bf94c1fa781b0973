//! Resolution of the `locals` values this tool cares about.
//!
//! Terragrunt modules can steer pipeline generation through two locals: a
//! skip flag that suppresses the module's project, and a hand-declared
//! list of extra dependency paths. Both historically exist under more
//! than one name, so recognition goes through a small alias table instead
//! of duplicated lookup code; within a table, a later alias wins.
//!
//! Locals resolution is recursive over the include chain: each included
//! parent is resolved and merged *under* the child, so the child wins on
//! scalar fields while list fields concatenate (parents first). Failures
//! while reading a parent are ignored, matching the tolerance of the
//! include mechanism itself.

use std::path::Path;

use hcl::Expression;
use tracing::debug;

use crate::core::Result;
use crate::parser::expr::{EvalContext, PathExpr};
use crate::parser::{self, attribute_expr};
use crate::paths;

/// Recognized names for the skip flag, in precedence order (later wins).
const SKIP_ALIASES: &[&str] = &["gitlab_cicd_skip", "gitlab_ci_skip"];

/// Recognized names for the extra-dependencies list (later wins).
const EXTRA_DEPS_ALIASES: &[&str] = &["extra_atlantis_dependencies", "extra_gitlabci_dependencies"];

/// The locals values relevant to project generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLocals {
    /// When `Some(true)`, no project is emitted for the module.
    pub skip: Option<bool>,
    /// Hand-declared extra dependency paths, as written.
    pub extra_dependencies: Vec<String>,
}

impl ResolvedLocals {
    /// Merge `child` on top of `self`: child wins on scalars, lists
    /// concatenate with the parent's entries first.
    fn merge_child(&mut self, child: ResolvedLocals) {
        if child.skip.is_some() {
            self.skip = child.skip;
        }
        self.extra_dependencies.extend(child.extra_dependencies);
    }
}

/// Resolve the locals of the module at `path`, merging in locals from its
/// include chain.
pub fn resolve_locals(path: &Path, root: &Path) -> Result<ResolvedLocals> {
    resolve_inner(path, root, false)
}

fn resolve_inner(path: &Path, root: &Path, is_parent: bool) -> Result<ResolvedLocals> {
    let body = parser::parse_body(path)?;
    let module_dir = path.parent().unwrap_or(Path::new("/"));
    let ctx = EvalContext { module_dir, root };

    let own = extract_locals(&body, &ctx);

    // Only the module itself recurses on its includes; a parent's own
    // includes are not followed (one level of inheritance, as configured).
    if is_parent {
        return Ok(own);
    }

    let mut merged = ResolvedLocals::default();
    for block in body.blocks() {
        if block.identifier.as_str() != "include" {
            continue;
        }
        let Some(expr) = attribute_expr(&block.body, "path") else { continue };
        let Some(target) = PathExpr::from_expression(expr).eval(&ctx) else { continue };
        let parent_path = paths::make_absolute(&target, path);
        // A broken or unreadable parent does not fail the child.
        match resolve_inner(Path::new(&parent_path), root, true) {
            Ok(parent) => merged.merge_child(parent),
            Err(e) => debug!("ignoring locals from include {parent_path}: {e}"),
        }
    }

    merged.merge_child(own);
    Ok(merged)
}

/// Pull the recognized locals out of a parsed body.
fn extract_locals(body: &parser::Body, ctx: &EvalContext<'_>) -> ResolvedLocals {
    let mut resolved = ResolvedLocals::default();

    for block in body.blocks() {
        if block.identifier.as_str() != "locals" {
            continue;
        }
        for alias in SKIP_ALIASES {
            if let Some(Expression::Bool(value)) = attribute_expr(&block.body, alias) {
                resolved.skip = Some(*value);
            }
        }
        for alias in EXTRA_DEPS_ALIASES {
            let Some(expr) = attribute_expr(&block.body, alias) else { continue };
            let Expression::Array(items) = expr else { continue };
            resolved.extra_dependencies = items
                .iter()
                .filter_map(|item| PathExpr::from_expression(item).eval(ctx))
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    resolved
}
