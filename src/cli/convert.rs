//! Conversion of raw exports to Parquet or CSV with normalized headers

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use console::style;
use polars::prelude::*;
use tracing::info;

use crate::pipeline::{load_dataset, LoadOptions};
use crate::utils::{create_spinner, finish_with_success};

/// Output path used when none is given: the input's stem with `.parquet`
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}.parquet", stem))
}

/// Load `input`, normalize its headers and write it to `output`
///
/// The output format follows the output extension (`.parquet` or `.csv`).
/// Returns the `(rows, columns)` written.
pub fn run_convert(
    input: &Path,
    output: Option<&Path>,
    options: &LoadOptions,
) -> Result<(usize, usize)> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => default_output_path(input),
    };
    if output_path == input {
        bail!(
            "Output path {} is the same as the input",
            output_path.display()
        );
    }

    println!(
        "\n {} Converting {}",
        style("◆").cyan().bold(),
        style("dataset").cyan()
    );
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Output: {}", style(output_path.display()).dim());
    println!();

    let spinner = create_spinner("Reading input...");
    let loaded = load_dataset(input, options);
    if loaded.is_err() {
        spinner.finish_and_clear();
    }
    let mut df = loaded?;
    finish_with_success(
        &spinner,
        &format!("Input loaded ({} columns)", df.width()),
    );

    let spinner = create_spinner("Writing output...");
    let extension = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    let mut file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    match extension.as_deref() {
        Some("csv") => {
            CsvWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV file: {}", output_path.display()))?;
        }
        _ => {
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .with_context(|| {
                    format!("Failed to write Parquet file: {}", output_path.display())
                })?;
        }
    }
    finish_with_success(&spinner, "Output written");

    let (rows, cols) = df.shape();
    let input_size = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0) as f64
        / (1024.0 * 1024.0);
    let output_size = std::fs::metadata(&output_path)
        .map(|m| m.len())
        .unwrap_or(0) as f64
        / (1024.0 * 1024.0);

    info!(
        input = %input.display(),
        output = %output_path.display(),
        rows,
        cols,
        "conversion complete"
    );

    println!();
    println!(
        "   {} rows × {} columns",
        style(rows).yellow(),
        style(cols).yellow()
    );
    println!("   {} File sizes:", style("✧").cyan());
    println!("      Input:  {:.2} MB", input_size);
    println!("      Output: {:.2} MB", output_size);
    println!();
    println!(" {} Conversion complete!", style("✓").green().bold());

    Ok((rows, cols))
}
