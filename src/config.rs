use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::region::{DEFAULT_REGIONS, RegionSet};

pub const CONFIG_ENV: &str = "TREE_CENSUS_CONFIG";

/// Zero-based column positions of the fields the loader reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub id: usize,
    pub status: usize,
    pub health: usize,
    pub latin_name: usize,
    pub common_name: usize,
    pub zip_code: usize,
    pub region: usize,
    pub x: usize,
    pub y: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            id: 0,
            status: 6,
            health: 7,
            latin_name: 8,
            common_name: 9,
            zip_code: 25,
            region: 29,
            x: 39,
            y: 40,
        }
    }
}

/// What the loader does with a row whose optional fields fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRowPolicy {
    #[default]
    Skip,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    pub regions: Vec<String>,
    pub scope_name: String,
    pub terminate_token: String,
    pub columns: ColumnLayout,
    pub invalid_rows: InvalidRowPolicy,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS.iter().map(|s| s.to_string()).collect(),
            scope_name: "NYC".to_string(),
            terminate_token: "quit".to_string(),
            columns: ColumnLayout::default(),
            invalid_rows: InvalidRowPolicy::Skip,
        }
    }
}

impl CensusConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.region_set()?;
        if self.terminate_token.trim().is_empty() {
            anyhow::bail!("terminate_token must not be empty");
        }
        Ok(())
    }

    pub fn region_set(&self) -> Result<RegionSet> {
        RegionSet::new(self.regions.iter().cloned()).context("Invalid region list in config")
    }
}

/// Resolves the configuration: `--config`, then the environment variable, then
/// the per-user config file if present, then built-in defaults.
pub fn resolve_config(cli: &Cli) -> Result<CensusConfig> {
    let mut config = match resolve_config_path(cli) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            CensusConfig::load(&path)?
        }
        None => CensusConfig::default(),
    };

    if cli.strict {
        config.invalid_rows = InvalidRowPolicy::Abort;
    }
    Ok(config)
}

fn resolve_config_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(p) = cli.config.clone() {
        return Some(p);
    }

    if let Ok(p) = env::var(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }

    default_config_path().filter(|p| p.exists())
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("tree-census").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tree_census_test_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    #[test]
    fn partial_config_file_falls_back_to_defaults() -> Result<()> {
        let path = temp_path("partial.json");
        std::fs::write(
            &path,
            r#"{ "scope_name": "Springfield", "columns": { "region": 3 }, "invalid_rows": "abort" }"#,
        )?;

        let config = CensusConfig::load(&path)?;
        assert_eq!(config.scope_name, "Springfield");
        assert_eq!(config.columns.region, 3);
        assert_eq!(config.columns.common_name, 9);
        assert_eq!(config.invalid_rows, InvalidRowPolicy::Abort);
        assert_eq!(config.terminate_token, "quit");

        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn config_with_wrong_region_count_is_rejected() -> Result<()> {
        let path = temp_path("regions.json");
        std::fs::write(&path, r#"{ "regions": ["North", "South"] }"#)?;
        assert!(CensusConfig::load(&path).is_err());
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn default_config_is_valid() {
        let config = CensusConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region_set().unwrap(), RegionSet::default());
    }
}
