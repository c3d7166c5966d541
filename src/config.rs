//! Layered configuration: defaults, optional TOML file, environment
//! overrides.
//!
//! Environment variables are prefixed with `DISTILLA_` and use double
//! underscores for nesting:
//! - `DISTILLA_ASSOCIATION__MERGE_ADJACENT_LINE_COMMENTS=false`
//! - `DISTILLA_LOGGING__DEFAULT=debug`

use crate::association::driver::DEFAULT_MAX_NESTING_DEPTH;
use crate::error::{DistillError, DistillResult};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Association behavior
    #[serde(default)]
    pub association: AssociationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            association: AssociationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssociationConfig {
    /// Merge runs of line comments on consecutive lines into one comment
    #[serde(default = "default_true")]
    pub merge_adjacent_line_comments: bool,

    /// Guard against pathologically nested statement trees
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            merge_adjacent_line_comments: true,
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules ("error", "warn", "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings layered as defaults < TOML file < environment.
    pub fn load(config_file: Option<&Path>) -> DistillResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("DISTILLA_").split("__"))
            .extract()
            .map_err(|e| DistillError::Config(e.to_string()))
    }

    /// Render the settings as TOML, e.g. for writing a starter config.
    pub fn to_toml(&self) -> DistillResult<String> {
        toml::to_string_pretty(self).map_err(|e| DistillError::Config(e.to_string()))
    }
}

fn default_false() -> bool {
    false
}

fn default_true() -> bool {
    true
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.debug);
        assert!(settings.association.merge_adjacent_line_comments);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(
            settings.association.max_nesting_depth,
            Settings::default().association.max_nesting_depth
        );
    }

    #[test]
    fn test_to_toml_round_trips() {
        let rendered = Settings::default().to_toml().unwrap();
        assert!(rendered.contains("merge_adjacent_line_comments"));

        let parsed: Settings = toml::from_str(&rendered).unwrap();
        assert!(parsed.association.merge_adjacent_line_comments);
    }
}
