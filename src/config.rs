//! Server configuration.
//!
//! Read once at startup from a JSON file in the platform config
//! directory (`%APPDATA%\go-dev-mcp\config.json` on Windows,
//! `~/Library/Application Support/go-dev-mcp/config.json` on macOS,
//! `~/.config/go-dev-mcp/config.json` elsewhere). A missing file yields
//! the defaults; a malformed file is a startup error.

use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default subprocess deadline when neither the config nor the tool
/// call supplies one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default minimum score for accepting a fuzzy tool-name match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Verbosity of the logging middleware (trace/debug/info/warn/error).
    pub log_level: String,
    pub resource_limits: ResourceLimits,
    pub nl_processing: NlProcessing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceLimits {
    /// Default subprocess deadline in seconds.
    pub timeout_secs: u64,
    /// Advisory memory cap in bytes. Carried for clients; not enforced.
    pub memory_limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NlProcessing {
    /// Toggles the fuzzy tool-name matching middleware.
    pub enable_fuzzy_matching: bool,
    /// Minimum score to accept a fuzzy match.
    pub match_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            resource_limits: ResourceLimits::default(),
            nl_processing: NlProcessing::default(),
        }
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            memory_limit: None,
        }
    }
}

impl Default for NlProcessing {
    fn default() -> Self {
        Self {
            enable_fuzzy_matching: true,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl Config {
    /// Loads the config from the default platform location.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the file exists but cannot be
    /// read or parsed.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(&crate::default_config_path())
    }

    /// Loads the config from an explicit path, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| ServerError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// The default subprocess deadline as a `Duration`.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.resource_limits.timeout_secs)
    }

    /// The effective deadline for one invocation: the stricter of the
    /// tool-supplied timeout and the configured guard. Applied exactly
    /// once around the subprocess.
    #[must_use]
    pub fn effective_timeout(&self, tool_secs: Option<u64>) -> Duration {
        let guard = self.resource_limits.timeout_secs;
        Duration::from_secs(tool_secs.map_or(guard, |t| t.min(guard).max(1)))
    }
}

/// Directory for configuration files.
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("go-dev-mcp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.resource_limits.timeout_secs, 30);
        assert!(cfg.resource_limits.memory_limit.is_none());
        assert!(cfg.nl_processing.enable_fuzzy_matching);
        assert!((cfg.nl_processing.match_threshold - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{ "logLevel": "debug", "resourceLimits": { "timeoutSecs": 60 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.resource_limits.timeout_secs, 60);
        // untouched sections keep their defaults
        assert!(cfg.nl_processing.enable_fuzzy_matching);
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let cfg: Config =
            serde_json::from_str(r#"{ "futureOption": true, "logLevel": "warn" }"#).unwrap();
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(cfg.resource_limits.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_effective_timeout_takes_the_stricter_bound() {
        let mut cfg = Config::default();
        assert_eq!(cfg.effective_timeout(None), Duration::from_secs(30));
        assert_eq!(cfg.effective_timeout(Some(5)), Duration::from_secs(5));
        // a tool asking for more than the guard is clamped down
        assert_eq!(cfg.effective_timeout(Some(120)), Duration::from_secs(30));
        cfg.resource_limits.timeout_secs = 10;
        assert_eq!(cfg.effective_timeout(Some(120)), Duration::from_secs(10));
    }
}
