//! Configuration loading for the dashboard.
//! Reads dashboard.json from the current directory or the path in the
//! DASHBOARD_CONFIG env var. Every field is optional.

use crate::data::SheetSource;
use crate::filter::WindowPolicy;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_ENV: &str = "DASHBOARD_CONFIG";
const CONFIG_FILE: &str = "dashboard.json";
/// Upper limit for both window settings, about a century.
const MAX_CONFIG_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub source: SheetSource,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub window: WindowPolicy,
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SheetSource::default(),
            http_timeout_secs: default_http_timeout_secs(),
            window: WindowPolicy::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from `$DASHBOARD_CONFIG` or `./dashboard.json`; defaults when absent.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        anyhow::ensure!(
            (0..=MAX_CONFIG_DAYS).contains(&config.window.default_days),
            "window.default_days must be between 0 and {}",
            MAX_CONFIG_DAYS
        );
        anyhow::ensure!(
            (1..=MAX_CONFIG_DAYS).contains(&config.window.max_days),
            "window.max_days must be between 1 and {}",
            MAX_CONFIG_DAYS
        );
        Ok(config)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.window.default_days, 30);
        assert_eq!(config.window.max_days, 365);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "source": { "sheet_id": "abc", "sheet_name": "Aba 2" },
            "window": { "max_days": 90 }
        }"#;
        let config = DashboardConfig::from_json(json).unwrap();

        assert_eq!(config.source.sheet_id, "abc");
        assert_eq!(config.source.sheet_name, "Aba 2");
        assert_eq!(config.window.max_days, 90);
        assert_eq!(config.window.default_days, 30);
    }

    #[test]
    fn test_invalid_window_rejected() {
        assert!(DashboardConfig::from_json(r#"{ "window": { "max_days": 0 } }"#).is_err());
        assert!(DashboardConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_out_of_range_window_days_rejected() {
        assert!(
            DashboardConfig::from_json(r#"{ "window": { "default_days": 200000000000000 } }"#)
                .is_err()
        );
        assert!(DashboardConfig::from_json(r#"{ "window": { "max_days": 36501 } }"#).is_err());
        assert!(DashboardConfig::from_json(r#"{ "window": { "default_days": -1 } }"#).is_err());

        let json = r#"{ "window": { "default_days": 36500, "max_days": 36500 } }"#;
        let config = DashboardConfig::from_json(json).unwrap();
        assert_eq!(config.window.max_days, 36_500);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = DashboardConfig::load_from(Path::new("/nonexistent/dashboard.json")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }
}
