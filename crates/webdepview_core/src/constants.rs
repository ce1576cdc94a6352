//! Defaults shared by the library crates and the binary.

/// File name searched for when locating the project lockfile
pub const LOCKFILE_NAME: &str = "package-lock.json";

/// File name of the persisted size cache when no explicit path is given
pub const CACHE_FILE_NAME: &str = "webdepview-cache.json";

/// Maximum number of size probes admitted per throttle window
pub const DEFAULT_PROBE_LIMIT: usize = 10;

/// Length of one throttle window in milliseconds
pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 1000;

/// First port tried by the report server
pub const DEFAULT_PORT: u16 = 45033;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_file_is_json() {
        assert!(CACHE_FILE_NAME.ends_with(".json"));
        assert_ne!(CACHE_FILE_NAME, LOCKFILE_NAME);
    }

    #[test]
    fn test_probe_defaults_are_usable() {
        // Throttle::new rejects zero values
        assert!(DEFAULT_PROBE_LIMIT > 0);
        assert!(DEFAULT_PROBE_INTERVAL_MS > 0);
    }
}
