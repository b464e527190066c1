//! Export of view outputs to JSON, CSV and Parquet
//!
//! JSON carries run metadata next to the full view output. CSV and Parquet
//! carry only the table, in wide or long form.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{
    CategoryCount, CountTable, CrossTab, DailyCount, Dimension, PeakMonth, Period, View,
    ViewOutput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Parquet,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            Some("parquet") => Ok(ExportFormat::Parquet),
            other => bail!(
                "Unsupported export format {:?}: use .json, .csv or .parquet",
                other.unwrap_or("")
            ),
        }
    }
}

/// Run settings recorded in the JSON metadata block
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub view: View,
    pub baseline: Period,
    pub excluded_year: Option<i32>,
    pub long: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    pub timestamp: String,
    pub dropstat_version: String,
    pub input_file: String,
    pub view: View,
    pub view_title: String,
    pub baseline: Period,
    pub excluded_year: Option<i32>,
    pub layout: &'static str,
}

#[derive(Serialize)]
struct ViewExport<'a> {
    metadata: ExportMetadata,
    #[serde(flatten)]
    output: &'a ViewOutput,
}

fn layout_name(long: bool) -> &'static str {
    if long {
        "long"
    } else {
        "wide"
    }
}

/// Write `output` to `path`, picking the format from the extension
pub fn export_view(output: &ViewOutput, path: &Path, params: &ExportParams<'_>) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    match format {
        ExportFormat::Json => {
            let export = ViewExport {
                metadata: ExportMetadata {
                    timestamp: Utc::now().to_rfc3339(),
                    dropstat_version: env!("CARGO_PKG_VERSION").to_string(),
                    input_file: params.input_file.to_string(),
                    view: params.view,
                    view_title: params.view.title().to_string(),
                    baseline: params.baseline,
                    excluded_year: params.excluded_year,
                    layout: layout_name(params.long),
                },
                output,
            };
            let json = serde_json::to_string_pretty(&export)
                .context("Failed to serialize view output to JSON")?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
        }
        ExportFormat::Csv => {
            let mut df = output_frame(output, params.long)?;
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        ExportFormat::Parquet => {
            let mut df = output_frame(output, params.long)?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create Parquet file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
    }
    Ok(format)
}

/// Tabular form of a view output
pub fn output_frame(output: &ViewOutput, long: bool) -> PolarsResult<DataFrame> {
    match output {
        ViewOutput::Series { table } | ViewOutput::Overview { monthly: table, .. } => {
            if long {
                long_series_frame(table)
            } else {
                wide_series_frame(table)
            }
        }
        ViewOutput::Ranking { dimension, counts } => ranking_frame(*dimension, counts),
        ViewOutput::Matrix { cross_tab } => {
            if long {
                long_cross_tab_frame(cross_tab)
            } else {
                wide_cross_tab_frame(cross_tab)
            }
        }
        ViewOutput::Peaks { months, .. } => peaks_frame(months),
        ViewOutput::Timeline { days } => timeline_frame(days),
    }
}

fn period_columns(periods: &[Period], labels: Vec<String>) -> Vec<Column> {
    let periods: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
    vec![
        Column::new("period".into(), periods),
        Column::new("label".into(), labels),
    ]
}

/// One column name per category value. A value that clashes with a fixed
/// column (or an earlier name) is prefixed with the dimension key, then
/// numbered if it still clashes.
fn category_column_names(fixed: &[&str], prefix: &str, categories: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = fixed.iter().map(|s| s.to_string()).collect();
    categories
        .iter()
        .map(|category| {
            let base = if taken.contains(category) {
                format!("{}_{}", prefix, category)
            } else {
                category.clone()
            };
            let mut name = base.clone();
            let mut n = 2;
            while taken.contains(&name) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

fn wide_series_frame(table: &CountTable) -> PolarsResult<DataFrame> {
    let mut columns = period_columns(&table.periods(), table.period_labels());
    if let Some(dimension) = table.dimension {
        let names = category_column_names(
            &["period", "label", "total"],
            dimension.key(),
            &table.categories,
        );
        for (idx, name) in names.into_iter().enumerate() {
            let values: Vec<u64> = table.rows.iter().map(|r| r.counts[idx]).collect();
            columns.push(Column::new(name.into(), values));
        }
        columns.push(Column::new("total".into(), table.totals()));
    } else {
        columns.push(Column::new("count".into(), table.totals()));
    }
    DataFrame::new(columns)
}

fn long_series_frame(table: &CountTable) -> PolarsResult<DataFrame> {
    let rows = table.to_long();
    let periods: Vec<Period> = rows.iter().map(|r| r.period).collect();
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let mut columns = period_columns(&periods, labels);
    if let Some(dimension) = table.dimension {
        let categories: Vec<String> = rows
            .iter()
            .map(|r| r.category.clone().unwrap_or_default())
            .collect();
        columns.push(Column::new(dimension.key().into(), categories));
    }
    let counts: Vec<u64> = rows.iter().map(|r| r.count).collect();
    columns.push(Column::new("count".into(), counts));
    DataFrame::new(columns)
}

fn ranking_frame(dimension: Dimension, counts: &[CategoryCount]) -> PolarsResult<DataFrame> {
    let categories: Vec<String> = counts.iter().map(|c| c.category.clone()).collect();
    let values: Vec<u64> = counts.iter().map(|c| c.count).collect();
    let fractions: Vec<f64> = counts.iter().map(|c| c.fraction).collect();
    DataFrame::new(vec![
        Column::new(dimension.key().into(), categories),
        Column::new("count".into(), values),
        Column::new("fraction".into(), fractions),
    ])
}

fn wide_cross_tab_frame(cross_tab: &CrossTab) -> PolarsResult<DataFrame> {
    let row_key = cross_tab.row_dimension.key();
    let mut columns = vec![Column::new(row_key.into(), cross_tab.rows.clone())];
    let names = category_column_names(
        &[row_key, "total"],
        cross_tab.column_dimension.key(),
        &cross_tab.columns,
    );
    for (idx, name) in names.into_iter().enumerate() {
        let values: Vec<u64> = cross_tab.cells.iter().map(|row| row[idx]).collect();
        columns.push(Column::new(name.into(), values));
    }
    columns.push(Column::new("total".into(), cross_tab.row_totals()));
    DataFrame::new(columns)
}

fn long_cross_tab_frame(cross_tab: &CrossTab) -> PolarsResult<DataFrame> {
    let cells = cross_tab.to_long();
    let rows: Vec<String> = cells.iter().map(|c| c.row.clone()).collect();
    let columns: Vec<String> = cells.iter().map(|c| c.column.clone()).collect();
    let counts: Vec<u64> = cells.iter().map(|c| c.count).collect();
    DataFrame::new(vec![
        Column::new(cross_tab.row_dimension.key().into(), rows),
        Column::new(cross_tab.column_dimension.key().into(), columns),
        Column::new("count".into(), counts),
    ])
}

fn peaks_frame(months: &[PeakMonth]) -> PolarsResult<DataFrame> {
    let periods: Vec<Period> = months.iter().map(|m| m.period).collect();
    let labels: Vec<String> = months.iter().map(|m| m.label.clone()).collect();
    let mut columns = period_columns(&periods, labels);
    let counts: Vec<u64> = months.iter().map(|m| m.count).collect();
    let top: Vec<bool> = months.iter().map(|m| m.is_top).collect();
    columns.push(Column::new("count".into(), counts));
    columns.push(Column::new("is_top".into(), top));
    DataFrame::new(columns)
}

fn timeline_frame(days: &[DailyCount]) -> PolarsResult<DataFrame> {
    let dates: Vec<String> = days.iter().map(|d| d.date.to_string()).collect();
    let labels: Vec<String> = days.iter().map(|d| d.label()).collect();
    let counts: Vec<u64> = days.iter().map(|d| d.count).collect();
    DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("label".into(), labels),
        Column::new("count".into(), counts),
    ])
}
