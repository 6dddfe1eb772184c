//! Run configuration.
//!
//! Everything has a default matching the public feed and a map written to
//! the working directory, so the binary runs with no configuration at all.
//! An optional TOML file (the single CLI argument) overrides individual
//! fields:
//!
//! ```toml
//! feed_url = "https://service.taipower.com.tw/data/opendata/apply/file/d006001/001.json"
//! output_path = "taiwan_power_map.html"
//! cache_ttl_secs = 60
//! accept_invalid_certs = true
//! log_file = "powmap.log"
//! verbose = false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::cache::FeedCache;
use crate::ingest::taipower::TAIPOWER_FEED_URL;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Feed endpoint. Override for mirrors or captured fixtures.
    pub feed_url: String,
    /// Where the rendered map page is written.
    pub output_path: String,
    /// Feed memoization window, seconds.
    pub cache_ttl_secs: u64,
    /// The Taipower endpoint serves an incomplete certificate chain;
    /// verification has to be optional the way the upstream dashboard's
    /// client disables it.
    pub accept_invalid_certs: bool,
    /// Optional log file path; console-only when absent.
    pub log_file: Option<String>,
    /// Enables debug-level logging.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            feed_url: TAIPOWER_FEED_URL.to_string(),
            output_path: "taiwan_power_map.html".to_string(),
            cache_ttl_secs: FeedCache::DEFAULT_TTL_SECS,
            accept_invalid_certs: true,
            log_file: None,
            verbose: false,
        }
    }
}

/// Loads configuration from `path`, or full defaults when no path is
/// given. A path that cannot be read or parsed is an error — a run with a
/// half-applied config file would be worse than failing loudly.
pub fn load(path: Option<&Path>) -> Result<RunConfig, Box<dyn std::error::Error>> {
    match path {
        None => Ok(RunConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read config file {}: {}", path.display(), e))?;
            let config: RunConfig = toml::from_str(&text)
                .map_err(|e| format!("cannot parse config file {}: {}", path.display(), e))?;
            Ok(config)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_the_public_feed() {
        let config = RunConfig::default();
        assert_eq!(config.feed_url, TAIPOWER_FEED_URL);
        assert_eq!(config.cache_ttl_secs, 60);
        assert!(config.accept_invalid_certs);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let config: RunConfig =
            toml::from_str("output_path = \"out/map.html\"\ncache_ttl_secs = 120\n")
                .expect("partial config should parse");
        assert_eq!(config.output_path, "out/map.html");
        assert_eq!(config.cache_ttl_secs, 120);
        // Untouched fields keep their defaults.
        assert_eq!(config.feed_url, TAIPOWER_FEED_URL);
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn test_no_path_yields_defaults() {
        let config = load(None).expect("default load cannot fail");
        assert_eq!(config.output_path, "taiwan_power_map.html");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load(Some(Path::new("/nonexistent/powmap.toml")));
        assert!(result.is_err());
    }
}
