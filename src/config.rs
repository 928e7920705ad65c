//! Planner configuration
//!
//! Locations of the cleaned analytical tables and the provenance manifest.
//! Values come from defaults, then the environment (optionally a `.env`
//! file), then whatever the binaries pass on the command line.

use std::path::PathBuf;

pub const DEFAULT_CLEAN_DIR: &str = "cleaned_data";
pub const DEFAULT_MANIFEST: &str = "manifest/datasets.json";

pub const ENV_CLEAN_DIR: &str = "SAMARTH_CLEAN_DIR";
pub const ENV_MANIFEST: &str = "SAMARTH_MANIFEST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Directory holding `<view>.parquet` (or `.csv`) files
    pub clean_dir: PathBuf,
    /// JSON array of dataset provenance entries
    pub manifest_path: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            clean_dir: PathBuf::from(DEFAULT_CLEAN_DIR),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
        }
    }
}

impl PlannerConfig {
    pub fn new(clean_dir: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            clean_dir: clean_dir.into(),
            manifest_path: manifest_path.into(),
        }
    }

    /// Build a config from `SAMARTH_CLEAN_DIR` / `SAMARTH_MANIFEST`,
    /// loading a `.env` file first if one is present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            clean_dir: lookup(ENV_CLEAN_DIR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.clean_dir),
            manifest_path: lookup(ENV_MANIFEST)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.manifest_path),
        }
    }

    /// Apply command-line overrides on top of this config
    pub fn with_overrides(mut self, clean_dir: Option<PathBuf>, manifest_path: Option<PathBuf>) -> Self {
        if let Some(dir) = clean_dir {
            self.clean_dir = dir;
        }
        if let Some(path) = manifest_path {
            self.manifest_path = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_overrides_defaults() {
        let config = PlannerConfig::from_lookup(|key| match key {
            ENV_CLEAN_DIR => Some("/data/clean".to_string()),
            _ => None,
        });
        assert_eq!(config.clean_dir, PathBuf::from("/data/clean"));
        assert_eq!(config.manifest_path, PathBuf::from(DEFAULT_MANIFEST));
    }

    #[test]
    fn test_blank_env_value_ignored() {
        let config = PlannerConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = PlannerConfig::default()
            .with_overrides(None, Some(PathBuf::from("other.json")));
        assert_eq!(config.clean_dir, PathBuf::from(DEFAULT_CLEAN_DIR));
        assert_eq!(config.manifest_path, PathBuf::from("other.json"));
    }
}
