//! Partial decoding of Terragrunt configuration files.
//!
//! This is the Config Parser the resolver consults. It deliberately
//! decodes only the constructs that feed dependency resolution:
//!
//! - `include` blocks (the include/parent chain)
//! - `dependency` / `dependencies` blocks (explicit dependency paths)
//! - the `terraform` block's `source` and `extra_arguments`
//!
//! Full expression evaluation is out of scope; path positions go through
//! the [`expr`] evaluator, and anything unevaluable is skipped with a
//! debug log. `locals` decoding lives with the locals resolver, which
//! re-parses the file on its own recursive walk.

pub mod expr;

use std::fs;
use std::path::Path;

use hcl::Expression;
pub use hcl::Body;
use tracing::debug;

use crate::core::{PipegenError, Result, TF_SOURCE_GLOB};
use crate::paths;

use expr::{EvalContext, PathExpr};

/// One `extra_arguments` block from a `terraform` block.
#[derive(Debug, Clone, Default)]
pub struct ExtraArguments {
    /// `required_var_files` entries
    pub required_var_files: Vec<String>,
    /// `optional_var_files` entries
    pub optional_var_files: Vec<String>,
    /// Raw `arguments` entries (`-var-file=` flags are mined from these)
    pub arguments: Vec<String>,
}

/// The dependency-relevant facts of one module configuration file.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    /// Include targets, already absolute and forward-slashed.
    pub includes: Vec<String>,
    /// Paths from `dependency`/`dependencies` blocks, as written.
    pub dependency_paths: Vec<String>,
    /// The `terraform.source` address, evaluated but not classified.
    pub source: Option<String>,
    /// All `extra_arguments` blocks, in file order.
    pub extra_args: Vec<ExtraArguments>,
}

/// Read and parse a configuration file into an HCL body.
pub fn parse_body(path: &Path) -> Result<Body> {
    let content = fs::read_to_string(path).map_err(|e| PipegenError::io(path, &e))?;
    hcl::parse(&content).map_err(|e| PipegenError::parse(path, e))
}

/// Decode the module configuration at `path`.
///
/// `root` is the repository root, needed to evaluate `get_repo_root()`.
pub fn parse_module(path: &Path, root: &Path) -> Result<ModuleConfig> {
    let body = parse_body(path)?;
    let module_dir = path.parent().unwrap_or(Path::new("/"));
    let ctx = EvalContext { module_dir, root };

    let mut config = ModuleConfig::default();

    for block in body.blocks() {
        match block.identifier.as_str() {
            "include" => {
                if let Some(target) = eval_attribute(&block.body, "path", &ctx, path) {
                    config.includes.push(paths::make_absolute(&target, path));
                }
            }
            "dependencies" => {
                if let Some(expr) = attribute_expr(&block.body, "paths") {
                    config.dependency_paths.extend(eval_string_list(expr, &ctx, path));
                }
            }
            "dependency" => {
                if let Some(target) = eval_attribute(&block.body, "config_path", &ctx, path) {
                    config.dependency_paths.push(target);
                }
            }
            "terraform" => {
                if let Some(source) = eval_attribute(&block.body, "source", &ctx, path) {
                    config.source = Some(source);
                }
                for args_block in block.body.blocks() {
                    if args_block.identifier.as_str() == "extra_arguments" {
                        config.extra_args.push(parse_extra_arguments(&args_block.body, &ctx, path));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(config)
}

/// Scan the `*.tf` files directly under `dir` for `module` calls with
/// local sources, returning one `<dir>/<source>/*.tf*` glob per call,
/// deduplicated and sorted.
///
/// A missing or empty directory yields no globs; a malformed `.tf` file is
/// a parse error, matching the strictness of module config parsing.
pub fn local_module_globs(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| PipegenError::io(dir, &e))?;
    let mut globs = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| PipegenError::io(dir, &e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("tf") || !path.is_file() {
            continue;
        }

        let body = parse_body(&path)?;
        for block in body.blocks() {
            if block.identifier.as_str() != "module" {
                continue;
            }
            let Some(Expression::String(source)) = attribute_expr(&block.body, "source") else {
                continue;
            };
            // Terraform requires local module sources to start with ./ or ../
            if source.starts_with("./") || source.starts_with("../") {
                let module_dir = paths::normalize(&dir.join(source));
                let glob = format!("{}/{}", paths::to_slash(&module_dir), TF_SOURCE_GLOB);
                if !globs.contains(&glob) {
                    globs.push(glob);
                }
            }
        }
    }

    globs.sort();
    Ok(globs)
}

/// Find an attribute's expression in a block body.
pub(crate) fn attribute_expr<'a>(body: &'a Body, key: &str) -> Option<&'a Expression> {
    body.attributes().find(|attr| attr.key.as_str() == key).map(|attr| &attr.expr)
}

/// Evaluate a single path-valued attribute, logging skipped entries.
fn eval_attribute(body: &Body, key: &str, ctx: &EvalContext<'_>, file: &Path) -> Option<String> {
    let expr = attribute_expr(body, key)?;
    let result = PathExpr::from_expression(expr).eval(ctx);
    if result.is_none() {
        debug!("skipping unevaluable '{key}' in {}", file.display());
    }
    result.filter(|s| !s.is_empty())
}

/// Evaluate a list of path-valued expressions, dropping unevaluable ones.
fn eval_string_list(expr: &Expression, ctx: &EvalContext<'_>, file: &Path) -> Vec<String> {
    let Expression::Array(items) = expr else {
        debug!("expected a list expression in {}", file.display());
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| PathExpr::from_expression(item).eval(ctx))
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_extra_arguments(body: &Body, ctx: &EvalContext<'_>, file: &Path) -> ExtraArguments {
    let mut args = ExtraArguments::default();
    if let Some(expr) = attribute_expr(body, "required_var_files") {
        args.required_var_files = eval_string_list(expr, ctx, file);
    }
    if let Some(expr) = attribute_expr(body, "optional_var_files") {
        args.optional_var_files = eval_string_list(expr, ctx, file);
    }
    if let Some(expr) = attribute_expr(body, "arguments") {
        args.arguments = eval_string_list(expr, ctx, file);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn parses_dependency_blocks_and_source() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "app/terragrunt.hcl",
            r#"
            dependency "net" {
              config_path = "../net"
            }
            dependencies {
              paths = ["../db", "../queue"]
            }
            terraform {
              source = "../modules/app"
            }
            "#,
        );

        let config = parse_module(&root.join("app/terragrunt.hcl"), root).unwrap();
        assert_eq!(config.dependency_paths, vec!["../net", "../db", "../queue"]);
        assert_eq!(config.source.as_deref(), Some("../modules/app"));
        assert!(config.includes.is_empty());
    }

    #[test]
    fn resolves_include_via_find_in_parent_folders() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "terragrunt.hcl", "");
        write(
            root,
            "live/app/terragrunt.hcl",
            r#"
            include {
              path = find_in_parent_folders()
            }
            terraform {
              source = "git::https://example.com/mod.git"
            }
            "#,
        );

        let config = parse_module(&root.join("live/app/terragrunt.hcl"), root).unwrap();
        assert_eq!(config.includes, vec![paths::to_slash(&root.join("terragrunt.hcl"))]);
    }

    #[test]
    fn collects_extra_arguments_var_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "app/terragrunt.hcl",
            r#"
            terraform {
              source = "../modules/app"
              extra_arguments "vars" {
                commands           = ["plan", "apply"]
                required_var_files = ["../common.tfvars"]
                optional_var_files = ["../optional.tfvars"]
                arguments          = ["-var-file=../extra.tfvars", "-lock-timeout=20m"]
              }
            }
            "#,
        );

        let config = parse_module(&root.join("app/terragrunt.hcl"), root).unwrap();
        assert_eq!(config.extra_args.len(), 1);
        let args = &config.extra_args[0];
        assert_eq!(args.required_var_files, vec!["../common.tfvars"]);
        assert_eq!(args.optional_var_files, vec!["../optional.tfvars"]);
        assert_eq!(args.arguments, vec!["-var-file=../extra.tfvars", "-lock-timeout=20m"]);
    }

    #[test]
    fn malformed_hcl_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "bad/terragrunt.hcl", "terraform {");

        let err = parse_module(&root.join("bad/terragrunt.hcl"), root).unwrap_err();
        assert!(matches!(err, PipegenError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = parse_module(&tmp.path().join("nope/terragrunt.hcl"), tmp.path()).unwrap_err();
        assert!(matches!(err, PipegenError::Io { .. }));
    }

    #[test]
    fn local_module_globs_finds_nested_local_modules() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "modules/stack/main.tf",
            r#"
            module "vpc" {
              source = "../vpc"
            }
            module "remote" {
              source = "terraform-aws-modules/s3-bucket/aws"
            }
            "#,
        );

        let globs = local_module_globs(&root.join("modules/stack")).unwrap();
        assert_eq!(globs, vec![format!("{}/vpc/*.tf*", paths::to_slash(&root.join("modules")))]);
    }

    #[test]
    fn local_module_globs_on_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(local_module_globs(&tmp.path().join("absent")).unwrap().is_empty());
    }
}
