use anyhow::Result;
use futures::future::BoxFuture;

use crate::lockfile::LockedPackage;

/// Asynchronous per-package cost, injected into the tree accumulator.
///
/// `name` is the key the package was found under; `package` carries the rest of
/// its lockfile metadata (locator, dev flag, requirements, children).
pub trait CostLookup: Send + Sync {
    fn cost<'a>(&'a self, name: &'a str, package: &'a LockedPackage) -> BoxFuture<'a, Result<u64>>;
}

/// Raw byte-size lookup for a single locator, with no caching or throttling.
pub trait SizeProbe: Send + Sync {
    fn size_of<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<u64>>;
}
