//! Command-line interface argument parsing.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use superstore_dashboard::{Domain, FilterCriteria};

/// Superstore sales dashboard
///
/// Loads the Superstore orders CSV, applies the selected filters and prints
/// three KPIs plus eight chart tables (or the JSON view model).
///
/// Examples:
///   superstore-dashboard --data data/superstore.csv
///   superstore-dashboard --region West,East --start 2017-01-01 --end 2017-12-31
///   superstore-dashboard --category Technology --format json
///   superstore-dashboard --interactive
///   superstore-dashboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the dataset CSV
    #[arg(short, long, value_name = "FILE", env = "SUPERSTORE_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for superstore.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Text encoding of the dataset (e.g. latin1, utf-8)
    #[arg(long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Skip rows with unparseable dates or numbers instead of aborting
    #[arg(long)]
    pub skip_malformed: bool,

    /// Regions to include (comma-separated, default: all)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub region: Option<Vec<String>>,

    /// Categories to include (comma-separated, default: all)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub category: Option<Vec<String>>,

    /// Sub-categories to include (comma-separated, default: all)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub sub_category: Option<Vec<String>>,

    /// First order date to include (YYYY-MM-DD, default: earliest in data)
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub start: Option<NaiveDate>,

    /// Last order date to include (YYYY-MM-DD, default: latest in data)
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub end: Option<NaiveDate>,

    /// Number of entries in the product and customer rankings
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Output format (table, json)
    #[arg(long, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write one CSV per summary table plus dashboard.json into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Start a menu to change filters and re-render repeatedly
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the available filter values and exit
    #[arg(long)]
    pub list_domain: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default superstore.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown tables on the console (default)
    #[default]
    Table,
    /// The view model as JSON
    Json,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got {s:?}: {e}"))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }
        if self.top_n == Some(0) {
            return Err("--top-n must be at least 1".to_string());
        }
        if self.interactive && self.format == OutputFormat::Json {
            return Err("--interactive only supports table output".to_string());
        }
        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Filter criteria from the flags; anything not given spans the full domain.
    pub fn criteria(&self, domain: &Domain) -> FilterCriteria {
        let mut c = FilterCriteria::full_domain(domain);
        if let Some(ref regions) = self.region {
            c = c.with_regions(selection(regions));
        }
        if let Some(ref categories) = self.category {
            c = c.with_categories(selection(categories));
        }
        if let Some(ref subs) = self.sub_category {
            c = c.with_sub_categories(selection(subs));
        }
        let start = self.start.unwrap_or(c.start);
        let end = self.end.unwrap_or(c.end);
        c.with_date_range(start, end)
    }
}

/// `--region=` parses as one empty string; treat it as an empty selection.
fn selection(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
