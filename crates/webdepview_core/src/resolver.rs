use anyhow::Result;
use futures::{FutureExt, future::BoxFuture};
use log::{debug, trace};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    cache::SizeCache,
    lockfile::LockedPackage,
    probe::HttpProbe,
    throttle::Throttle,
    types::{CostLookup, SizeProbe},
};

/// Byte size of a package artifact: cache first, then a throttled probe.
///
/// Misses are written through to the cache in memory; persisting it is the
/// caller's job. Concurrent misses for the same locator are not merged, so
/// each one probes.
pub struct CostResolver<'c, P = HttpProbe> {
    cache: &'c SizeCache,
    throttle: Throttle,
    probe: P,
    probed: AtomicUsize,
}

impl<'c, P: SizeProbe> CostResolver<'c, P> {
    pub fn new(cache: &'c SizeCache, throttle: Throttle, probe: P) -> Self {
        Self { cache, throttle, probe, probed: AtomicUsize::new(0) }
    }

    pub async fn resolve_cost(&self, locator: &str) -> Result<u64> {
        if let Some(bytes) = self.cache.get(locator) {
            trace!("Using cached size {} for {}", bytes, locator);
            return Ok(bytes);
        }

        debug!("Resolving size of {}", locator);
        let bytes = self
            .throttle
            .run(|| {
                self.probed.fetch_add(1, Ordering::SeqCst);
                self.probe.size_of(locator)
            })
            .await??;

        self.cache.set(locator, bytes);
        Ok(bytes)
    }

    /// Number of probes issued so far (cache misses).
    pub fn probed(&self) -> usize {
        self.probed.load(Ordering::SeqCst)
    }
}

impl<P: SizeProbe> CostLookup for CostResolver<'_, P> {
    fn cost<'a>(&'a self, name: &'a str, package: &'a LockedPackage) -> BoxFuture<'a, Result<u64>> {
        async move {
            match package.resolved.as_deref() {
                Some(locator) => self.resolve_cost(locator).await,
                None => {
                    debug!("{} has no resolved locator, counting it as 0 bytes", name);
                    Ok(0)
                }
            }
        }
        .boxed()
    }
}
