//! Core utilities for webdepview.
//!
//! This crate provides the pieces the tree analysis builds on:
//! - Locating and parsing `package-lock.json`
//! - A persistent cache of artifact sizes keyed by resolved locator
//! - A sliding-window throttle for outgoing requests
//! - Resolving artifact sizes with `HEAD` requests

mod cache;
mod constants;
mod lockfile;
mod probe;
mod resolver;
mod throttle;
mod types;

// Re-export public API
pub use cache::{SizeCache, default_cache_path};
pub use constants::{
    CACHE_FILE_NAME, DEFAULT_PORT, DEFAULT_PROBE_INTERVAL_MS, DEFAULT_PROBE_LIMIT, LOCKFILE_NAME,
};
pub use lockfile::{Dependencies, LockedPackage, Lockfile, find_lockfile, load_lockfile};
pub use probe::HttpProbe;
pub use resolver::CostResolver;
pub use throttle::Throttle;
pub use types::{CostLookup, SizeProbe};
