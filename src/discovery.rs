//! Enumerates Terragrunt module configurations under the repository root.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::core::{CONFIG_FILENAME, PipegenError, Result};
use crate::paths;

/// Cache directories Terragrunt materializes next to configs; never
/// modules of their own.
const TERRAGRUNT_CACHE_DIR: &str = ".terragrunt-cache";

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.') && name.len() > 1 || name == TERRAGRUNT_CACHE_DIR)
}

/// Walk `root` and collect every `terragrunt.hcl`, as absolute
/// slash-normalized paths in first-seen (walk) order, duplicate-free.
///
/// `environment`, when non-empty, keeps only paths containing it as an
/// exact directory segment. This runs before any parsing so filtered-out
/// subtrees cost nothing.
pub fn discover(root: &Path, environment: &str) -> Result<Vec<String>> {
    let mut found = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
    {
        let entry = entry.map_err(|err| PipegenError::Io {
            path: err
                .path()
                .map(|p| paths::to_slash(p))
                .unwrap_or_else(|| paths::to_slash(root)),
            reason: err.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str() != Some(CONFIG_FILENAME) {
            continue;
        }
        let path = paths::to_slash(&paths::normalize(entry.path()));
        if !environment.is_empty() && !has_segment(&path, environment) {
            continue;
        }
        if seen.insert(path.clone()) {
            found.push(path);
        }
    }

    debug!(root = %root.display(), count = found.len(), "discovered module configs");
    Ok(found)
}

/// Exact path-segment match: `/dev/` somewhere in the path, never a
/// substring of a longer segment like `devops`.
fn has_segment(path: &str, segment: &str) -> bool {
    path.split('/').any(|part| part == segment)
}
