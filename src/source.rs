//! Terraform source address detection.
//!
//! A `terraform.source` address can point at a local directory, a VCS
//! repository, a module registry entry, or an arbitrary URL. Only local
//! sources contribute to a module's dependency set (a change to a remote
//! module cannot be observed by the repository's CI), so the resolver
//! needs a cheap classifier before it goes glob-building.
//!
//! Detection mirrors the address grammar used by Terraform's getter:
//! forced getters (`git::…`), URL schemes, SSH-style `git@` addresses, and
//! the well-known VCS hosts are remote; `file://` URLs, absolute paths,
//! and anything left over that looks like a plain filesystem path is
//! local. Local results are normalized against the declaring module's
//! directory.

use std::path::Path;

use crate::core::PipegenError;
use crate::paths;

/// Classification of a `terraform.source` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A local filesystem path, absolute and forward-slashed.
    Local(String),
    /// A remote address (VCS, registry, URL); carries no dependency info.
    Remote,
}

/// Hosts that mark an address as remote even without an explicit scheme.
const KNOWN_VCS_HOSTS: &[&str] = &["github.com/", "gitlab.com/", "bitbucket.org/"];

/// Forced getter prefixes understood by Terraform's address syntax.
const FORCED_GETTERS: &[&str] = &["git::", "hg::", "s3::", "gcs::", "http::", "https::"];

/// Classify a source address, normalizing local paths against `base_dir`.
///
/// `base_dir` is the directory of the module that declared the source.
/// Returns [`PipegenError::AddressResolution`] for addresses that cannot
/// denote anything (currently only the empty string).
pub fn detect(address: &str, base_dir: &Path) -> Result<SourceKind, PipegenError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(PipegenError::AddressResolution {
            address: address.to_string(),
            reason: "empty source address".to_string(),
        });
    }

    if FORCED_GETTERS.iter().any(|g| address.starts_with(g)) {
        return Ok(SourceKind::Remote);
    }

    if let Some(path) = address.strip_prefix("file://") {
        return Ok(SourceKind::Local(paths::make_absolute(
            path,
            &base_dir.join(crate::core::CONFIG_FILENAME),
        )));
    }

    // Scheme URLs and scp-style git addresses.
    if address.contains("://") || address.starts_with("git@") {
        return Ok(SourceKind::Remote);
    }

    if KNOWN_VCS_HOSTS.iter().any(|h| address.starts_with(h)) {
        return Ok(SourceKind::Remote);
    }

    // Everything else is treated as a filesystem path, matching the
    // fallthrough file detector of the getter library.
    Ok(SourceKind::Local(paths::make_absolute(
        address,
        &base_dir.join(crate::core::CONFIG_FILENAME),
    )))
}
