use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use path_clean::clean;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::constants::LOCKFILE_NAME;

/// Nested dependency map, in lockfile order.
pub type Dependencies = IndexMap<String, LockedPackage>;

/// One entry of a `package-lock.json` dependency tree.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LockedPackage {
    #[serde(default)]
    pub version: Option<String>,

    /// Only needed for development
    #[serde(default)]
    pub dev: bool,

    /// Runtime requirements by name; satisfied either in `dependencies` or higher up the tree
    #[serde(default)]
    pub requires: IndexMap<String, String>,

    #[serde(default)]
    pub dependencies: Option<Dependencies>,

    /// Locator of the downloaded artifact, usually a tarball URL
    #[serde(default)]
    pub resolved: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lockfile {
    #[serde(default)]
    pub lockfile_version: Option<u32>,

    #[serde(default)]
    pub dependencies: Option<Dependencies>,
}

/// Walks up from `start` until a directory containing `package-lock.json` is found.
pub fn find_lockfile(start: &Path) -> Result<PathBuf> {
    let mut current_dir =
        if start.is_absolute() { clean(start) } else { clean(env::current_dir()?.join(start)) };
    debug!("Searching for {} from {}", LOCKFILE_NAME, current_dir.display());

    loop {
        let candidate = current_dir.join(LOCKFILE_NAME);
        trace!("Checking for lockfile at: {}", candidate.display());
        if candidate.is_file() {
            debug!("Found lockfile at: {}", candidate.display());
            return Ok(candidate);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Reached filesystem root without finding {}", LOCKFILE_NAME);
                return Err(anyhow!("Could not find {} file.", LOCKFILE_NAME));
            }
        }
    }
}

pub fn load_lockfile(path: &Path) -> Result<Lockfile> {
    debug!("Reading lockfile: {}", path.display());
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let lockfile: Lockfile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    match (&lockfile.dependencies, lockfile.lockfile_version) {
        (None, Some(version)) if version >= 3 => {
            warn!(
                "{} uses lockfileVersion {} which has no nested dependency tree; nothing to report",
                path.display(),
                version
            );
        }
        (None, _) => debug!("Lockfile has no dependencies"),
        (Some(deps), _) => debug!("Lockfile has {} top-level dependencies", deps.len()),
    }

    Ok(lockfile)
}
