//! Evaluation of Terragrunt path expressions.
//!
//! Include paths, dependency paths, and terraform sources are frequently
//! written as calls to Terragrunt's built-in path helpers
//! (`find_in_parent_folders()`, `get_repo_root()`, …) or as interpolated
//! strings combining them with literal fragments. This module models the
//! subset of those expressions that can appear in a path position and
//! evaluates them against the declaring module's location.
//!
//! Anything outside the supported subset (variable references, `get_env`,
//! arithmetic, …) evaluates to `None`; callers skip the entry with a debug
//! log instead of failing the parse.

use std::path::Path;

use hcl::{Expression, TemplateExpr};

use crate::core::CONFIG_FILENAME;
use crate::paths;

/// Locations a path expression is evaluated against.
pub struct EvalContext<'a> {
    /// Directory containing the configuration file being parsed.
    pub module_dir: &'a Path,
    /// Repository root (the `--root` flag, absolute).
    pub root: &'a Path,
}

/// A path expression in a Terragrunt configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathExpr {
    /// A plain string, returned as written (callers decide how to rebase).
    Literal(String),
    /// `find_in_parent_folders()` / `find_in_parent_folders("name.hcl")`
    FindInParentFolders(Option<String>),
    /// `get_terragrunt_dir()`
    TerragruntDir,
    /// `get_parent_terragrunt_dir()`
    ParentTerragruntDir,
    /// `get_repo_root()`
    RepoRoot,
    /// `path_relative_to_include()` - needs include context, unevaluable here
    PathRelativeToInclude,
    /// `dirname(<expr>)`
    Dirname(Box<PathExpr>),
    /// `"${fn()}/literal/${fn2()}"` - fragments concatenated in order
    Interpolation(Vec<PathExpr>),
    /// Anything this evaluator does not understand.
    Unsupported(String),
}

impl PathExpr {
    /// Translate an HCL expression into a `PathExpr`.
    pub fn from_expression(expr: &Expression) -> Self {
        match expr {
            Expression::String(s) => Self::Literal(s.clone()),
            Expression::TemplateExpr(template) => match template.as_ref() {
                TemplateExpr::QuotedString(s) => parse_template(s),
                TemplateExpr::Heredoc(_) => Self::Unsupported("heredoc".to_string()),
            },
            // FuncName renders namespaced calls as `ns::name`; none of the
            // supported helpers are namespaced, so those fall to Unsupported.
            Expression::FuncCall(call) => from_call(&call.name.to_string(), &call.args),
            Expression::Parenthesis(inner) => Self::from_expression(inner),
            other => Self::Unsupported(format!("{other:?}")),
        }
    }

    /// Evaluate against `ctx`, producing a path string.
    ///
    /// Function results are absolute; literals come back as written.
    /// `None` means the expression needs context this tool does not have.
    pub fn eval(&self, ctx: &EvalContext<'_>) -> Option<String> {
        match self {
            Self::Literal(s) => Some(s.clone()),
            Self::FindInParentFolders(filename) => {
                let filename = filename.as_deref().unwrap_or(CONFIG_FILENAME);
                find_in_parent_folders(ctx.module_dir, filename)
            }
            Self::TerragruntDir => Some(paths::to_slash(ctx.module_dir)),
            Self::ParentTerragruntDir => {
                // Approximated as the directory holding the nearest parent
                // config, which matches the common single-include layout.
                let parent = find_in_parent_folders(ctx.module_dir, CONFIG_FILENAME)?;
                Path::new(&parent).parent().map(paths::to_slash)
            }
            Self::RepoRoot => Some(paths::to_slash(ctx.root)),
            Self::PathRelativeToInclude => None,
            Self::Dirname(inner) => {
                let resolved = inner.eval(ctx)?;
                Path::new(&resolved).parent().map(paths::to_slash)
            }
            Self::Interpolation(parts) => {
                if parts.is_empty() {
                    return None;
                }
                let mut result = String::new();
                for part in parts {
                    match part {
                        // Literals inside an interpolation are string
                        // fragments, not standalone paths.
                        Self::Literal(s) => result.push_str(s),
                        other => result.push_str(&other.eval(ctx)?),
                    }
                }
                Some(result)
            }
            Self::Unsupported(what) => {
                tracing::debug!("skipping unevaluable path expression: {what}");
                None
            }
        }
    }
}

/// Map a function name and argument list onto a `PathExpr`.
fn from_call(name: &str, args: &[Expression]) -> PathExpr {
    match (name, args) {
        ("find_in_parent_folders", []) => PathExpr::FindInParentFolders(None),
        ("find_in_parent_folders", [Expression::String(s)]) => {
            PathExpr::FindInParentFolders(Some(s.clone()))
        }
        ("get_terragrunt_dir", []) => PathExpr::TerragruntDir,
        ("get_parent_terragrunt_dir", []) => PathExpr::ParentTerragruntDir,
        ("get_repo_root", []) => PathExpr::RepoRoot,
        ("path_relative_to_include", []) => PathExpr::PathRelativeToInclude,
        ("dirname", [inner]) => PathExpr::Dirname(Box::new(PathExpr::from_expression(inner))),
        _ => PathExpr::Unsupported(format!("{name}(…)")),
    }
}

/// Parse a quoted template string into literal and interpolated parts.
///
/// Only `${…}` interpolations holding a supported function call are
/// understood; `%{…}` directives make the whole template unsupported.
fn parse_template(template: &str) -> PathExpr {
    if template.contains("%{") {
        return PathExpr::Unsupported(template.to_string());
    }
    if !template.contains("${") {
        return PathExpr::Literal(template.to_string());
    }

    let mut parts = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        if start > 0 {
            parts.push(PathExpr::Literal(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return PathExpr::Unsupported(template.to_string());
        };
        parts.push(parse_call_text(after[..end].trim()));
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        parts.push(PathExpr::Literal(rest.to_string()));
    }

    if parts.len() == 1 {
        parts.into_iter().next().expect("one part")
    } else {
        PathExpr::Interpolation(parts)
    }
}

/// Parse the textual form of a function call found inside `${…}`.
fn parse_call_text(text: &str) -> PathExpr {
    let Some(open) = text.find('(') else {
        return PathExpr::Unsupported(text.to_string());
    };
    let Some(close) = text.rfind(')') else {
        return PathExpr::Unsupported(text.to_string());
    };
    let name = text[..open].trim();
    let arg = text[open + 1..close].trim();

    match (name, arg) {
        ("find_in_parent_folders", "") => PathExpr::FindInParentFolders(None),
        ("find_in_parent_folders", quoted) if is_quoted(quoted) => {
            PathExpr::FindInParentFolders(Some(unquote(quoted).to_string()))
        }
        ("get_terragrunt_dir", "") => PathExpr::TerragruntDir,
        ("get_parent_terragrunt_dir", "") => PathExpr::ParentTerragruntDir,
        ("get_repo_root", "") => PathExpr::RepoRoot,
        ("path_relative_to_include", "") => PathExpr::PathRelativeToInclude,
        ("dirname", inner) => PathExpr::Dirname(Box::new(parse_call_text(inner))),
        _ => PathExpr::Unsupported(text.to_string()),
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

fn unquote(s: &str) -> &str {
    &s[1..s.len() - 1]
}

/// Walk up from the parent of `from`, returning the first directory entry
/// matching `filename`. Mirrors Terragrunt's convention of starting the
/// search one level above the current module.
pub fn find_in_parent_folders(from: &Path, filename: &str) -> Option<String> {
    let mut current = from.parent()?;
    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(paths::to_slash(&paths::normalize(&candidate)));
        }
        current = current.parent()?;
    }
}
