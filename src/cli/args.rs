//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{LabelStyle, LoadOptions, Period, RecordFilter, View, ViewSettings};

/// dropstat - Monthly withdrawal analytics for course enrollment exports
#[derive(Parser, Debug)]
#[command(name = "dropstat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (XLSX, ODS, CSV or Parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// View to compute.
    /// Options: monthly, reason, reasons, sex, state, age, origin, income, heatmap, peaks,
    /// timeline, overview.
    /// If not provided, will be selected interactively.
    #[arg(short, long, value_parser = parse_view)]
    pub view: Option<View>,

    /// Earliest month every time series shows (YYYY-MM)
    #[arg(long, default_value = "2024-10", value_parser = parse_period)]
    pub baseline: Period,

    /// Withdrawal year treated as a placeholder and never counted
    #[arg(long, default_value = "2026")]
    pub excluded_year: i32,

    /// Count every year, including the placeholder year
    #[arg(long, default_value = "false", conflicts_with = "excluded_year")]
    pub keep_all_years: bool,

    /// Status values that mark a withdrawal (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "Desistiu,Desistência")]
    pub status: Vec<String>,

    /// Categories split out of the charted table (comma-separated).
    /// Overrides the view's preset.
    #[arg(long, value_delimiter = ',')]
    pub exclude_category: Option<Vec<String>>,

    /// Months hidden from the charted table (comma-separated YYYY-MM).
    /// Overrides the view's preset.
    #[arg(long, value_delimiter = ',', value_parser = parse_period)]
    pub drop_periods: Option<Vec<Period>>,

    /// Keep every month in the charted table, ignoring the view's preset
    #[arg(long, default_value = "false", conflicts_with = "drop_periods")]
    pub keep_all_months: bool,

    /// Abbreviated month labels (Out/24) instead of full names (Outubro/24)
    #[arg(long, default_value = "false")]
    pub short_labels: bool,

    /// Print and export one row per (month, category) instead of the wide table
    #[arg(long, default_value = "false")]
    pub long: bool,

    /// Number of categories kept in ranked breakdowns
    #[arg(long, default_value = "10", value_parser = validate_top)]
    pub top: usize,

    /// Months with more withdrawals than this are peaks
    #[arg(long, default_value = "25")]
    pub peak_threshold: u64,

    /// Number of peak months highlighted
    #[arg(long, default_value = "2")]
    pub peak_top: usize,

    /// Export path (.json, .csv or .parquet, determined by extension)
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Worksheet to read from spreadsheet input (first sheet by default)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Skip interactive prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an input file to Parquet (or CSV) with normalized headers
    Convert {
        /// Input file path (XLSX, ODS, CSV or Parquet)
        input: PathBuf,

        /// Output file path (optional, defaults to input with .parquet extension)
        output: Option<PathBuf>,

        /// Worksheet to read from spreadsheet input
        #[arg(long)]
        sheet: Option<String>,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            sheet: self.sheet.clone(),
        }
    }

    pub fn label_style(&self) -> LabelStyle {
        if self.short_labels {
            LabelStyle::Short
        } else {
            LabelStyle::Full
        }
    }

    pub fn excluded_year(&self) -> Option<i32> {
        (!self.keep_all_years).then_some(self.excluded_year)
    }

    /// Pipeline settings assembled from the flags
    pub fn view_settings(&self) -> ViewSettings {
        let statuses: Vec<String> = self
            .status
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        ViewSettings {
            filter: RecordFilter {
                statuses,
                excluded_year: self.excluded_year(),
            },
            baseline: self.baseline,
            label_style: self.label_style(),
            excluded_categories: self.exclude_category.as_ref().map(|cats| {
                cats.iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            }),
            dropped_periods: if self.keep_all_months {
                Some(Vec::new())
            } else {
                self.drop_periods.clone()
            },
            top: self.top,
            peak_threshold: self.peak_threshold,
            peak_top: self.peak_top,
        }
    }
}

fn parse_view(s: &str) -> Result<View, String> {
    s.parse()
}

fn parse_period(s: &str) -> Result<Period, String> {
    s.parse::<Period>().map_err(|e| e.to_string())
}

/// Validator for the top-N parameter
fn validate_top(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value == 0 {
        Err("top must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
