use anyhow::{Result, anyhow};
use clap::Parser;
use log::{debug, info};
use std::{path::PathBuf, time::Duration};

use webdepview_core::{DEFAULT_PORT, DEFAULT_PROBE_INTERVAL_MS, DEFAULT_PROBE_LIMIT};

#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Directory to start searching for package-lock.json (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Leave out packages that are only needed for development
    #[arg(long)]
    pub ignore_dev: bool,

    /// Also resolve the download size of every package
    #[arg(long)]
    pub sizes: bool,

    /// Size cache file (defaults to a file next to the executable)
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Maximum number of size requests started per interval
    #[arg(long, default_value_t = DEFAULT_PROBE_LIMIT)]
    pub limit: usize,

    /// Length of the request interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROBE_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Also write the report as an HTML page to this path
    #[arg(long)]
    pub html: Option<PathBuf>,

    #[clap(skip)]
    pub lockfile: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "serve")]
#[command(about = "Serve the dependency report as an HTML page")]
pub struct ServeConfig {
    #[command(flatten)]
    pub report: Config,

    /// First port to try; the next free port is used if it is taken
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Open the served page in the default browser
    #[arg(long)]
    pub open: bool,
}

impl Config {
    /// Initialize the config by locating the lockfile and the size cache
    pub fn initialize(&mut self) -> Result<()> {
        let start = match self.directory.take() {
            Some(dir) => {
                debug!("Using provided directory: {:?}", dir);
                dir
            }
            None => {
                debug!("No directory provided, starting from the current directory");
                std::env::current_dir()?
            }
        };

        let lockfile = webdepview_core::find_lockfile(&start)?;
        info!("Using lockfile: {}", lockfile.display());

        if self.sizes && self.cache.is_none() {
            self.cache = Some(webdepview_core::default_cache_path()?);
        }
        if let Some(cache) = &self.cache {
            debug!("Using size cache: {}", cache.display());
        }

        self.directory = Some(start);
        self.lockfile = Some(lockfile);
        Ok(())
    }

    /// Get the lockfile path, returning an error if not initialized
    pub fn lockfile(&self) -> Result<&PathBuf> {
        self.lockfile
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use webdepview_core::{CACHE_FILE_NAME, LOCKFILE_NAME};

    #[test]
    fn test_defaults() {
        let cfg = Config::parse_from(["report"]);
        assert!(cfg.directory.is_none());
        assert!(!cfg.ignore_dev);
        assert!(!cfg.sizes);
        assert_eq!(cfg.limit, DEFAULT_PROBE_LIMIT);
        assert_eq!(cfg.interval(), Duration::from_millis(DEFAULT_PROBE_INTERVAL_MS));
    }

    #[test]
    fn test_parse_flags() {
        let cfg = Config::parse_from([
            "report",
            "some/dir",
            "--ignore-dev",
            "--sizes",
            "--limit",
            "3",
            "--interval-ms",
            "250",
            "--cache",
            "sizes.json",
        ]);
        assert_eq!(cfg.directory, Some(PathBuf::from("some/dir")));
        assert!(cfg.ignore_dev);
        assert!(cfg.sizes);
        assert_eq!(cfg.limit, 3);
        assert_eq!(cfg.interval(), Duration::from_millis(250));
        assert_eq!(cfg.cache, Some(PathBuf::from("sizes.json")));
    }

    #[test]
    fn test_serve_port() {
        let cfg = ServeConfig::parse_from(["serve", "--port", "8080", "--ignore-dev"]);
        assert_eq!(cfg.port, 8080);
        assert!(cfg.report.ignore_dev);
        assert!(!cfg.open);

        let cfg = ServeConfig::parse_from(["serve", "--open"]);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.open);
    }

    #[test]
    fn test_lockfile_requires_initialize() {
        let cfg = Config::parse_from(["report"]);
        assert!(cfg.lockfile().is_err());
    }

    #[test]
    fn test_initialize_finds_lockfile_and_default_cache() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(LOCKFILE_NAME), "{}").unwrap();
        let nested = temp_dir.path().join("src");
        fs::create_dir_all(&nested).unwrap();

        let mut cfg = Config::parse_from(["report", "--sizes"]);
        cfg.directory = Some(nested);
        cfg.initialize().unwrap();

        let lockfile = cfg.lockfile().unwrap();
        assert_eq!(lockfile.file_name().and_then(|n| n.to_str()), Some(LOCKFILE_NAME));
        let cache = cfg.cache.as_ref().unwrap();
        assert_eq!(cache.file_name().and_then(|n| n.to_str()), Some(CACHE_FILE_NAME));
    }
}
