use indexmap::{IndexMap, IndexSet};
use std::path::PathBuf;

/// Metrics for one package, computed from its own subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetrics {
    /// Packages nested below this one (not counting itself)
    pub count: usize,
    /// Own requirements plus everything its subtree requires, deduplicated
    pub required: IndexSet<String>,
    /// Raw sum of own requirements and the subtree's required names
    pub shared: usize,
    /// Own size plus the subtree's cumulative size, when sizes are tracked
    pub child_size: Option<u64>,
}

/// Result of folding one level of the dependency tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulation {
    pub count: usize,
    pub accumulated: IndexMap<String, PackageMetrics>,
    pub required: IndexSet<String>,
    pub child_size: Option<u64>,
}

/// One row of the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub name: String,
    pub count: usize,
    pub shared: usize,
    pub child_size: Option<u64>,
}

#[derive(Debug)]
pub struct ReportResult {
    pub lockfile: PathBuf,
    pub packages: Vec<PackageSummary>,
    /// Every package counted in the tree, reported or not
    pub total_count: usize,
    pub total_size: Option<u64>,
    /// Size probes that went to the network
    pub probed: usize,
    /// Set when the report was computed but the size cache could not be written
    pub cache_error: Option<anyhow::Error>,
}
