use log::debug;

use crate::types::{Accumulation, PackageSummary};

/// Rows for the top-level packages that no other top-level package requires.
///
/// A package that is only there because a sibling needs it is already visible
/// in that sibling's `shared` count, so it gets no row of its own.
pub fn summarize(root: &Accumulation) -> Vec<PackageSummary> {
    let rows: Vec<PackageSummary> = root
        .accumulated
        .iter()
        .filter(|(name, _)| !root.required.contains(name.as_str()))
        .map(|(name, metrics)| PackageSummary {
            name: name.clone(),
            count: metrics.count,
            shared: metrics.shared,
            child_size: metrics.child_size,
        })
        .collect();

    debug!(
        "Reporting {} of {} top-level packages ({} required by siblings)",
        rows.len(),
        root.accumulated.len(),
        root.accumulated.len() - rows.len()
    );
    rows
}
