//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pymoli.toml` files.

use crate::analysis::DEFAULT_TOP_N;
use crate::loader::DEFAULT_INPUT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".pymoli.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Purchase log to read.
    #[serde(default = "default_input")]
    pub input: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
        }
    }
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

/// Report layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Length of the spender and item rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Symbol placed in front of monetary values.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Decimal places for money and percentages.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,

    /// Width of the dashed rule around section titles.
    #[serde(default = "default_rule_width")]
    pub rule_width: usize,

    /// List age buckets that have no players.
    #[serde(default = "default_true")]
    pub show_empty_age_buckets: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            currency_symbol: default_currency_symbol(),
            decimal_places: default_decimal_places(),
            rule_width: default_rule_width(),
            show_empty_age_buckets: true,
        }
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_rule_width() -> usize {
    26
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.pymoli.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = input.display().to_string();
        }

        if let Some(top) = args.top {
            self.report.top_n = top;
        }
    }

    /// Check settings that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.report.top_n == 0 {
            return Err("report.top_n must be at least 1".to_string());
        }
        if self.report.decimal_places > 10 {
            return Err("report.decimal_places must be at most 10".to_string());
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
