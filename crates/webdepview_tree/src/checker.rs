use anyhow::Result;
use log::{debug, info, warn};
use std::path::PathBuf;

use webdepview_core::{CostResolver, HttpProbe, SizeCache, Throttle, load_lockfile};

use crate::{
    accumulate::accumulate,
    config::Config,
    summary::summarize,
    types::{Accumulation, ReportResult},
};

pub async fn run_report(mut cfg: Config) -> Result<ReportResult> {
    info!("Starting dependency report");

    if cfg.lockfile.is_none() {
        cfg.initialize()?;
    }
    let lockfile_path = cfg.lockfile()?.clone();
    let lockfile = load_lockfile(&lockfile_path)?;
    let dependencies = lockfile.dependencies.as_ref();

    if !cfg.sizes {
        debug!("Size tracking disabled, computing structure only");
        let root = accumulate(dependencies, cfg.ignore_dev, None).await?;
        return Ok(finish(lockfile_path, root, 0, None));
    }

    let cache_path = match cfg.cache.clone() {
        Some(path) => path,
        None => webdepview_core::default_cache_path()?,
    };
    let cache = SizeCache::load(cache_path).await?;
    info!("Loaded {} cached sizes from {}", cache.len(), cache.path().display());

    let throttle = Throttle::new(cfg.limit, cfg.interval())?;
    debug!("Throttling size requests to {} per {:?}", throttle.limit(), throttle.interval());
    let resolver = CostResolver::new(&cache, throttle, HttpProbe::default());

    let accumulated = accumulate(dependencies, cfg.ignore_dev, Some(&resolver)).await;
    let probed = resolver.probed();
    debug!("Issued {} size requests", probed);

    // Sizes learned before a failure are still worth keeping
    let flushed = cache.flush().await;
    let root = accumulated?;

    let cache_error = match flushed {
        Ok(()) => None,
        Err(e) => {
            warn!("Could not write size cache: {:#}", e);
            Some(e)
        }
    };

    Ok(finish(lockfile_path, root, probed, cache_error))
}

fn finish(
    lockfile: PathBuf,
    root: Accumulation,
    probed: usize,
    cache_error: Option<anyhow::Error>,
) -> ReportResult {
    let packages = summarize(&root);
    info!("Dependency report complete. {} packages in tree, {} reported", root.count, packages.len());

    ReportResult {
        lockfile,
        packages,
        total_count: root.count,
        total_size: root.child_size,
        probed,
        cache_error,
    }
}
