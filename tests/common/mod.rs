//! Common fixtures for tg-pipegen integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway Terragrunt repository built file by file.
pub struct FixtureRepo {
    _tmp: TempDir,
    root: PathBuf,
}

impl FixtureRepo {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        Self { _tmp: tmp, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a `terragrunt.hcl` under `rel_dir` (empty string for the
    /// repository root).
    pub fn module(&self, rel_dir: &str, contents: &str) -> &Self {
        self.file(&format!("{}/terragrunt.hcl", rel_dir.trim_end_matches('/')), contents)
    }

    /// Write an arbitrary file relative to the root, creating parents.
    pub fn file(&self, rel_path: &str, contents: &str) -> &Self {
        let path = self.root.join(rel_path.trim_start_matches('/'));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    /// Write a pipeline template and return its path.
    pub fn template(&self, contents: &str) -> PathBuf {
        let path = self.root.join("ci.yml.tera");
        fs::write(&path, contents).unwrap();
        path
    }
}

/// A template that lists every project on one line, plus the run flags.
pub const LISTING_TEMPLATE: &str = "\
{% for project in projects %}{{ project.source_path }}: {{ project.dependencies | join(sep=\" \") }}
{% endfor %}needs={{ needs }} workload={{ workload }}
";
