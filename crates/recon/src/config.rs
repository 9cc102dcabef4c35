use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::resolve_path;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A mapping run: ordered source catalogs plus the crosswalk file.
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Source catalogs, ingested in this order.
    pub other_sources: Vec<String>,
    pub match_source: String,
    /// Record store location; the caller's default applies when absent.
    #[serde(default)]
    pub database: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MapConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MapConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.other_sources.is_empty() {
            return Err(ReconError::InvalidInput(
                "other_sources must list at least one file".into(),
            ));
        }

        if let Some(pos) = self.other_sources.iter().position(|s| s.trim().is_empty()) {
            return Err(ReconError::InvalidInput(format!(
                "other_sources[{pos}] is blank"
            )));
        }

        if self.match_source.trim().is_empty() {
            return Err(ReconError::InvalidInput("match_source is blank".into()));
        }

        Ok(())
    }

    /// Source paths resolved against `base` (usually the config file's directory).
    pub fn source_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.other_sources
            .iter()
            .map(|s| resolve_path(base, s))
            .collect()
    }

    pub fn match_path(&self, base: &Path) -> PathBuf {
        resolve_path(base, &self.match_source)
    }

    pub fn database_path(&self, base: &Path) -> Option<PathBuf> {
        self.database.as_deref().map(|db| resolve_path(base, db))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
