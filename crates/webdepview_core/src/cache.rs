use anyhow::{Context, Result};
use dashmap::DashMap;
use log::{debug, trace, warn};
use std::{
    collections::{BTreeMap, HashMap},
    env,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::constants::CACHE_FILE_NAME;

/// Byte sizes keyed by resolved locator, persisted as a flat JSON object.
///
/// Entries never expire. The map is loaded once at the start of a run and
/// written back once at the end; everything in between is in memory.
#[derive(Debug)]
pub struct SizeCache {
    path: PathBuf,
    sizes: DashMap<String, u64>,
}

impl SizeCache {
    /// An empty cache that will flush to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), sizes: DashMap::new() }
    }

    /// Loads the cache from `path`. A missing or unreadable-as-JSON file yields an empty cache.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading size cache from {}", path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No size cache at {}, starting empty", path.display());
                return Ok(Self::new(path));
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read size cache {}", path.display()));
            }
        };

        let sizes = match serde_json::from_str::<HashMap<String, u64>>(&content) {
            Ok(entries) => entries.into_iter().collect::<DashMap<_, _>>(),
            Err(e) => {
                warn!("Ignoring corrupt size cache {}: {}", path.display(), e);
                DashMap::new()
            }
        };

        debug!("Loaded {} cached sizes", sizes.len());
        Ok(Self { path, sizes })
    }

    pub fn get(&self, locator: &str) -> Option<u64> {
        let size = self.sizes.get(locator).map(|entry| *entry);
        trace!("Size cache {} for {}", if size.is_some() { "hit" } else { "miss" }, locator);
        size
    }

    pub fn set(&self, locator: impl Into<String>, bytes: u64) {
        self.sizes.insert(locator.into(), bytes);
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every entry back to disk, keys sorted.
    pub async fn flush(&self) -> Result<()> {
        let sorted: BTreeMap<String, u64> =
            self.sizes.iter().map(|entry| (entry.key().clone(), *entry.value())).collect();
        let json = serde_json::to_string(&sorted)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write size cache {}", self.path.display()))?;
        debug!("Flushed {} cached sizes to {}", sorted.len(), self.path.display());
        Ok(())
    }
}

/// Cache location used when none is configured: next to the running executable,
/// falling back to the current directory.
pub fn default_cache_path() -> Result<PathBuf> {
    let dir = match env::current_exe() {
        Ok(exe) => exe.parent().map(Path::to_path_buf),
        Err(e) => {
            debug!("Could not locate current executable: {}", e);
            None
        }
    };
    let dir = match dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    Ok(dir.join(CACHE_FILE_NAME))
}
