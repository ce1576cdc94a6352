//! Dependency tree metrics for `package-lock.json` projects.
//!
//! For every top-level dependency this crate reports how many packages sit in
//! its own nested subtree, how many requirements it shares with the rest of
//! the tree, and optionally the cumulative download size of that subtree.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use clap::Parser;
//! use webdepview_tree::{Config, run_report};
//! use std::io::{BufWriter, Write};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut cfg = Config::parse_from(["report", "--ignore-dev"]);
//! cfg.directory = Some(std::path::PathBuf::from("/path/to/project"));
//!
//! let result = run_report(cfg).await?;
//!
//! // Use buffered output for better performance
//! let mut stdout = BufWriter::new(std::io::stdout());
//! webdepview_tree::print_report(&mut stdout, &result)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod accumulate;
mod checker;
mod config;
mod html;
mod reporter;
mod server;
mod summary;
mod types;

// Re-export public API
pub use accumulate::accumulate;
pub use checker::run_report;
pub use config::{Config, ServeConfig};
pub use html::render_html;
pub use reporter::{print_no_dependencies_message, print_report};
pub use server::{bind_with_retry, serve_on};
pub use summary::summarize;
pub use types::{Accumulation, PackageMetrics, PackageSummary, ReportResult};
