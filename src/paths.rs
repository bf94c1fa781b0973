//! Path normalization for module and dependency paths.
//!
//! Dependency paths come from many sources (include chains, dependency
//! blocks, terraform sources, var-file arguments, hand-declared locals)
//! and arrive relative, absolute, or with mixed separators. Everything the
//! resolver caches or compares is first funneled through this module into
//! one canonical shape: an absolute, `.`/`..`-free, forward-slash string.
//! Module identity is defined on that normalized form.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem.
///
/// Pure string manipulation - the path does not need to exist. Leading
/// `..` components on a relative path are preserved so a later join can
/// still resolve them.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                match components.last() {
                    Some(Component::Normal(_)) => {
                        components.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => components.push(component),
                }
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Render a path with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' { s.into_owned() } else { s.replace('\\', "/") }
}

/// Make a dependency path absolute relative to the module that declared it.
///
/// `module_path` is the configuration *file* the dependency was found in;
/// relative entries resolve against its parent directory. Already-absolute
/// entries are only normalized. The result always uses forward slashes.
pub fn make_absolute(dep: &str, module_path: &Path) -> String {
    let dep_path = Path::new(dep);
    if dep_path.is_absolute() {
        return to_slash(&normalize(dep_path));
    }
    let base = module_path.parent().unwrap_or(Path::new("/"));
    to_slash(&normalize(&base.join(dep_path)))
}

/// Convert an absolute dependency path to a repository-root-relative one.
///
/// Paths outside the root are returned unchanged (still forward-slashed);
/// the repository root itself maps to `.`.
pub fn relative_to_root(abs: &str, root: &Path) -> String {
    let root = to_slash(&normalize(root));
    let abs_norm = to_slash(&normalize(Path::new(abs)));

    if abs_norm == root {
        return ".".to_string();
    }
    // The prefix must end on a path boundary: /repo must not match /repository.
    if let Some(rest) = abs_norm.strip_prefix(&root)
        && let Some(rest) = rest.strip_prefix('/')
    {
        return rest.to_string();
    }
    abs_norm
}
