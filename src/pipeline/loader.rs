//! Dataset loader for spreadsheet, CSV and Parquet files
//!
//! Headers are normalized once here (trim, lowercase, spaces to `_`), so
//! everything downstream addresses columns by their normalized name.

use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use polars::prelude::*;
use tracing::{debug, info};

use super::dates::excel_serial_to_date;
use super::error::{PipelineError, PipelineResult};
use crate::utils::{create_spinner, finish_with_success, finish_with_warning};

/// Options controlling how a source file is read
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Worksheet name for spreadsheet input. The first sheet when `None`.
    pub sheet: Option<String>,
}

/// Supported input formats, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    Csv,
    Parquet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            "csv" => Ok(SourceFormat::Csv),
            "parquet" => Ok(SourceFormat::Parquet),
            _ => Err(PipelineError::unavailable(
                path,
                format!(
                    "Unsupported file format: '{}'. Supported formats: xlsx, xls, ods, csv, parquet",
                    extension
                ),
            )),
        }
    }
}

/// Normalize a header: trim, lowercase, spaces replaced by `_`
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Load a dataset with normalized headers
pub fn load_dataset(path: &Path, options: &LoadOptions) -> PipelineResult<DataFrame> {
    let format = SourceFormat::from_path(path)?;

    if !path.is_file() {
        return Err(PipelineError::unavailable(path, "file not found"));
    }

    let df = match format {
        SourceFormat::Spreadsheet => read_spreadsheet(path, options.sheet.as_deref())?,
        SourceFormat::Csv => {
            // Every column stays text, as with spreadsheets: `1.500` is a
            // Brazilian thousand, not a float
            let mut df = LazyCsvReader::new(path)
                .with_infer_schema_length(Some(0))
                .finish()
                .and_then(|lf| lf.collect())
                .map_err(|e| PipelineError::unavailable(path, e))?;
            normalize_headers(&mut df)?;
            df
        }
        SourceFormat::Parquet => {
            let mut df = LazyFrame::scan_parquet(path, Default::default())
                .and_then(|lf| lf.collect())
                .map_err(|e| PipelineError::unavailable(path, e))?;
            normalize_headers(&mut df)?;
            df
        }
    };

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "dataset loaded"
    );
    Ok(df)
}

/// Load a dataset behind a spinner, returning `(df, rows, cols, memory_mb)`
pub fn load_dataset_with_progress(
    path: &Path,
    options: &LoadOptions,
) -> PipelineResult<(DataFrame, usize, usize, f64)> {
    let spinner = create_spinner(&format!("Loading {}...", path.display()));
    let result = load_dataset(path, options);
    match &result {
        Ok(_) => finish_with_success(&spinner, "Dataset loaded"),
        Err(_) => finish_with_warning(&spinner, "Dataset could not be loaded"),
    }

    let df = result?;
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    Ok((df, rows, cols, memory_mb))
}

/// Normalized column names of a dataset
pub fn get_column_names(path: &Path, options: &LoadOptions) -> PipelineResult<Vec<String>> {
    let df = load_dataset(path, options)?;
    Ok(df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect())
}

/// Normalize a list of headers, rejecting collisions
fn normalize_all(headers: &[String]) -> PipelineResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(headers.len());

    for (idx, header) in headers.iter().enumerate() {
        let mut name = normalize_column_name(header);
        if name.is_empty() {
            name = format!("column_{}", idx + 1);
        }
        if !seen.insert(name.clone()) {
            return Err(PipelineError::DuplicateColumn(name));
        }
        normalized.push(name);
    }

    Ok(normalized)
}

fn normalize_headers(df: &mut DataFrame) -> PipelineResult<()> {
    let originals: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let normalized = normalize_all(&originals)?;

    for (old, new) in originals.iter().zip(normalized) {
        if *old != new {
            df.rename(old, new.into())?;
        }
    }
    Ok(())
}

/// Read one worksheet into a frame of text columns
fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> PipelineResult<DataFrame> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| PipelineError::unavailable(path, e))?;

    let range = match sheet {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .ok_or_else(|| {
        PipelineError::unavailable(
            path,
            match sheet {
                Some(name) => format!("worksheet '{}' not found", name),
                None => "workbook has no worksheets".to_string(),
            },
        )
    })?
    .map_err(|e| PipelineError::unavailable(path, e))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| PipelineError::unavailable(path, "worksheet is empty"))?;
    let headers: Vec<String> = header
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    let names = normalize_all(&headers)?;
    debug!(?names, "spreadsheet header");

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        let cells: Vec<Option<String>> = (0..names.len())
            .map(|idx| row.get(idx).and_then(cell_text))
            .collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        for (column, cell) in values.iter_mut().zip(cells) {
            column.push(cell);
        }
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(values)
        .map(|(name, column)| Column::new(name.into(), column))
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Render a cell as text. Whole floats lose their decimal point and Excel
/// date cells become ISO dates.
fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(format_number(*f)),
        DataType::Bool(b) => Some(b.to_string()),
        DataType::DateTime(serial) => {
            excel_serial_to_date(*serial).map(|d| d.format("%Y-%m-%d").to_string())
        }
        _ => None,
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
