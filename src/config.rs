//! Configuration file handling.
//!
//! Settings come from `superstore.toml` (or `--config`), then CLI flags
//! override whatever they set explicitly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use superstore_dashboard::loader::resolve_encoding;
use superstore_dashboard::util::DEFAULT_DATE_FORMATS;
use superstore_dashboard::{LoadOptions, ReportOptions, RowPolicy};

pub const DEFAULT_CONFIG_FILE: &str = "superstore.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the dataset lives and how to read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Any WHATWG encoding label, e.g. `latin1`, `windows-1252`, `utf-8`.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Tried in order; first match wins.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    #[serde(default)]
    pub on_malformed_row: RowPolicy,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            encoding: default_encoding(),
            date_formats: default_date_formats(),
            on_malformed_row: RowPolicy::default(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("data/superstore.csv")
}

fn default_encoding() -> String {
    "latin1".to_string()
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Length of the product and customer rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Rows shown per table in the console preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            histogram_bins: default_histogram_bins(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_histogram_bins() -> usize {
    15
}

fn default_preview_rows() -> usize {
    12
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

    /// Explicit path if given, else `superstore.toml` if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref path) = args.data {
            self.data.path = path.clone();
        }
        if let Some(ref encoding) = args.encoding {
            self.data.encoding = encoding.clone();
        }
        if args.skip_malformed {
            self.data.on_malformed_row = RowPolicy::Drop;
        }
        if let Some(top_n) = args.top_n {
            self.report.top_n = top_n;
        }
    }

    pub fn load_options(&self) -> Result<LoadOptions> {
        let encoding = resolve_encoding(&self.data.encoding)?;
        let mut opts = LoadOptions::new(&self.data.path);
        opts.encoding = encoding;
        if !self.data.date_formats.is_empty() {
            opts.date_formats = self.data.date_formats.clone();
        }
        opts.row_policy = self.data.on_malformed_row;
        Ok(opts)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            top_n: self.report.top_n,
            histogram_bins: self.report.histogram_bins,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.encoding, "latin1");
        assert_eq!(config.report.top_n, 10);
        assert_eq!(config.report.histogram_bins, 15);
        assert_eq!(config.data.on_malformed_row, RowPolicy::Abort);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[data]
path = "fixtures/orders.csv"
encoding = "utf-8"
on_malformed_row = "drop"

[report]
top_n = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.data.path, PathBuf::from("fixtures/orders.csv"));
        assert_eq!(config.data.on_malformed_row, RowPolicy::Drop);
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.histogram_bins, 15);
        assert_eq!(config.data.date_formats.len(), DEFAULT_DATE_FORMATS.len());

        let opts = config.load_options().unwrap();
        assert_eq!(opts.encoding, encoding_rs::UTF_8);
        assert_eq!(opts.row_policy, RowPolicy::Drop);
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let mut config = Config::default();
        config.data.encoding = "ebcdic-martian".to_string();
        assert!(config.load_options().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[report]"));
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.report.preview_rows, 12);
    }
}
