//! Generate dynamic GitLab CI pipeline configuration from a tree of
//! Terragrunt modules.
//!
//! The pipeline of the tool itself is small: [`discovery`] walks the
//! repository for `terragrunt.hcl` files, [`resolver`] computes each
//! module's transitive dependency closure (memoized and coalesced so
//! shared modules are parsed once), [`project`] turns closures into CI
//! project records, [`orchestrator`] fans that out with bounded
//! concurrency, and [`render`] pushes the result through a Tera template.
//!
//! The [`cli`] module wires these together behind the `tg-pipegen`
//! binary.

pub mod cli;
pub mod core;
pub mod discovery;
pub mod orchestrator;
pub mod parser;
pub mod paths;
pub mod project;
pub mod render;
pub mod resolver;
pub mod source;
