use anyhow::Result;
use futures::{FutureExt, future::BoxFuture};
use indexmap::{IndexMap, IndexSet};
use log::trace;

use webdepview_core::{CostLookup, Dependencies};

use crate::types::{Accumulation, PackageMetrics};

/// Folds one level of the dependency tree, depth-first and post-order.
///
/// Entries are visited in lockfile order and awaited one at a time, so at most
/// one size lookup is in flight. With `ignore_dev`, dev-only packages are
/// skipped before recursing and contribute nothing. Sizes are only tracked when
/// `cost` is given; a lookup failure aborts the whole fold.
///
/// Both the level count and the level size start from the number of surviving
/// entries before the per-entry sums are added.
pub fn accumulate<'a>(
    dependencies: Option<&'a Dependencies>,
    ignore_dev: bool,
    cost: Option<&'a dyn CostLookup>,
) -> BoxFuture<'a, Result<Accumulation>> {
    async move {
        let Some(dependencies) = dependencies.filter(|deps| !deps.is_empty()) else {
            return Ok(Accumulation { child_size: cost.map(|_| 0), ..Default::default() });
        };

        let mut accumulated = IndexMap::with_capacity(dependencies.len());

        for (name, package) in dependencies {
            if ignore_dev && package.dev {
                trace!("Skipping dev dependency: {}", name);
                continue;
            }

            let child = accumulate(package.dependencies.as_ref(), ignore_dev, cost).await?;

            let shared = child.required.len() + package.requires.len();
            let mut required: IndexSet<String> = package.requires.keys().cloned().collect();
            required.extend(child.required);

            let child_size = match cost {
                Some(lookup) => {
                    let own = lookup.cost(name, package).await?;
                    Some(child.child_size.unwrap_or_default() + own)
                }
                None => None,
            };

            trace!("{}: count={} shared={} size={:?}", name, child.count, shared, child_size);
            let metrics = PackageMetrics { count: child.count, required, shared, child_size };
            accumulated.insert(name.clone(), metrics);
        }

        let survivors = accumulated.len();
        let count = survivors + accumulated.values().map(|m| m.count).sum::<usize>();
        let required: IndexSet<String> =
            accumulated.values().flat_map(|m| m.required.iter().cloned()).collect();
        let child_size = cost.map(|_| {
            survivors as u64 + accumulated.values().filter_map(|m| m.child_size).sum::<u64>()
        });

        Ok(Accumulation { count, accumulated, required, child_size })
    }
    .boxed()
}
