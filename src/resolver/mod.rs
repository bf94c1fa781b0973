//! Recursive, memoized dependency resolution for Terragrunt modules.
//!
//! [`DependencyResolver::resolve`] computes the full dependency closure of
//! one module configuration: include chains, `dependency`/`dependencies`
//! blocks, local terraform sources, extra var-files, and operator-declared
//! extras from `locals`, optionally cascaded through transitive modules.
//! Results are memoized and coalesced in a [`cache::DependencyCache`], so
//! a shared module is parsed exactly once no matter how many projects
//! depend on it and no matter how concurrently they are resolved.

pub mod cache;
pub mod locals;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::core::{CONFIG_FILENAME, PipegenError, TF_SOURCE_GLOB};
use crate::parser;
use crate::paths;
use crate::source::{self, SourceKind};

pub use cache::{CachedResolution, DependencyCache, Resolution};

/// Knobs controlling how the closure is computed. One instance is shared
/// across the whole run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Absolute repository root; relative paths rebase against it and the
    /// `get_repo_root()` function evaluates to it.
    pub root: PathBuf,
    /// Recurse through dependencies-of-dependencies.
    pub cascade_dependencies: bool,
    /// Drop `dependency`/`dependencies` block contributions entirely.
    pub ignore_dependency_blocks: bool,
}

impl ResolveOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cascade_dependencies: true,
            ignore_dependency_blocks: false,
        }
    }
}

/// Run-scoped resolver. Cheap to share behind an `Arc`; all mutable state
/// lives in the concurrent cache.
pub struct DependencyResolver {
    options: ResolveOptions,
    cache: DependencyCache,
}

impl DependencyResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options, cache: DependencyCache::new() }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve the dependency closure of the module config at `path`
    /// (an absolute, slash-normalized file path).
    ///
    /// Returns `Ok(None)` when the module is a parent/include-only config
    /// that must not become a project of its own, and `Ok(Some(deps))`
    /// otherwise. Dependency entries are absolute, slash-normalized, and
    /// duplicate-free, in first-encounter order: includes, dependency
    /// blocks, terraform source globs, var-files, locals extras, then
    /// cascaded children.
    pub async fn resolve(&self, path: &str) -> CachedResolution {
        let mut visited = HashSet::new();
        self.resolve_path(path.to_string(), &mut visited).await
    }

    /// Recursive worker. `visited` holds the paths on the current
    /// resolution stack; re-entering one is a cycle.
    ///
    /// The cycle check runs before the cache claim: a task waiting on its
    /// own pending entry would otherwise deadlock. Cascaded calls (a
    /// non-empty stack) additionally never park on *another* task's
    /// pending entry: this task owns pending entries of its own, and two
    /// tasks resolving a mutual cycle from opposite ends would otherwise
    /// wait on each other forever. They take `Busy` and recompute the
    /// child on this stack instead.
    fn resolve_path<'a>(
        &'a self,
        path: String,
        visited: &'a mut HashSet<String>,
    ) -> BoxFuture<'a, CachedResolution> {
        Box::pin(async move {
            let cascaded = !visited.is_empty();
            if !visited.insert(path.clone()) {
                return Err(PipegenError::CycleDetected { path });
            }
            let claim = if cascaded {
                self.cache.try_claim(&path)
            } else {
                self.cache.claim(&path).await
            };
            let result = match claim {
                cache::Claim::Cached(result) => {
                    trace!(path = %path, "dependency cache hit");
                    result
                }
                cache::Claim::Owner(guard) => {
                    let result = self.compute(&path, visited).await;
                    guard.complete(result.clone());
                    result
                }
                cache::Claim::Busy => {
                    // Another task owns the entry; it will publish the
                    // memoized copy. The duplicate parse is the price of
                    // not joining a possible owner wait loop.
                    trace!(path = %path, "pending on another task, recomputing");
                    self.compute(&path, visited).await
                }
            };
            visited.remove(&path);
            result
        })
    }

    /// Parse one module config and assemble its closure. Runs exactly once
    /// per path; everyone else reads the memoized result.
    async fn compute(
        &self,
        path: &str,
        visited: &mut HashSet<String>,
    ) -> CachedResolution {
        debug!(path, "resolving module dependencies");
        let config_path = Path::new(path);
        let module_dir = config_path.parent().unwrap_or(Path::new("/"));

        let config = parser::parse_module(config_path, &self.options.root)?;

        // A config with neither a terraform source nor an include chain is
        // a parent meant purely for inclusion; it gets the skip sentinel.
        if config.source.is_none() && config.includes.is_empty() {
            debug!(path, "include-only parent, skipping");
            return Ok(None);
        }

        let mut direct: Vec<String> = Vec::new();

        for include in &config.includes {
            // Include targets never become projects themselves, even when
            // discovery finds them before any child does.
            self.cache.insert_skip_sentinel(include);
            direct.push(include.clone());
        }

        if !self.options.ignore_dependency_blocks {
            for dep_path in &config.dependency_paths {
                direct.push(paths::to_slash(&Path::new(dep_path).join(CONFIG_FILENAME)));
            }
        }

        if let Some(address) = &config.source {
            if let SourceKind::Local(local_dir) = source::detect(address, module_dir)? {
                direct.push(format!("{local_dir}/{TF_SOURCE_GLOB}"));
                direct.extend(parser::local_module_globs(Path::new(&local_dir))?);
            }
        }

        for extra in &config.extra_args {
            direct.extend(extra.required_var_files.iter().cloned());
            direct.extend(extra.optional_var_files.iter().cloned());
            for argument in &extra.arguments {
                if let Some(var_file) = argument.strip_prefix("-var-file=") {
                    direct.push(var_file.to_string());
                }
            }
        }

        let resolved_locals = locals::resolve_locals(config_path, &self.options.root)?;
        direct.extend(resolved_locals.extra_dependencies);

        let mut closure: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for dep in direct {
            if dep.is_empty() {
                continue;
            }
            let dep = paths::make_absolute(&dep, config_path);
            if seen.insert(dep.clone()) {
                closure.push(dep.clone());
            }

            if !self.options.cascade_dependencies {
                continue;
            }
            let child = match self.resolve_path(dep.clone(), visited).await {
                Ok(child) => child,
                Err(err) => {
                    // Globs and non-config files land here; so do broken
                    // or cyclic children. The branch is dropped, not the
                    // whole module.
                    debug!(dep = %dep, %err, "skipping uncascadable dependency");
                    continue;
                }
            };
            let Some(child_deps) = child else { continue };
            for child_dep in child_deps {
                // Children report absolute paths, but locals extras may
                // pass through relative; rebase those against the child.
                let child_dep = paths::make_absolute(&child_dep, Path::new(&dep));
                if seen.insert(child_dep.clone()) {
                    closure.push(child_dep);
                }
            }
        }

        // Conventionally named configs also depend on terraform modules
        // sourced locally from their own directory.
        if config_path.file_name().and_then(|name| name.to_str()) == Some(CONFIG_FILENAME) {
            for glob in parser::local_module_globs(module_dir)? {
                if seen.insert(glob.clone()) {
                    closure.push(glob);
                }
            }
        }

        Ok(Some(closure))
    }
}
