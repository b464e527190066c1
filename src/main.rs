//! dropstat: withdrawal analytics CLI
//!
//! Loads a course-enrollment export, keeps the withdrawn students and prints
//! month-by-month (and per-category) withdrawal counts for one view.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use dropstat::cli::{confirm_overwrite, convert::run_convert, select_view, Cli, Commands};
use dropstat::pipeline::{
    load_dataset_with_progress, records_from_frame, LoadOptions, PipelineError, View,
};
use dropstat::report::{display_view_output, export_view, ExportParams, RunSummary};
use dropstat::utils::{
    create_spinner, finish_with_success, init_logging, print_banner, print_completion,
    print_config, print_count, print_error, print_info, print_step_header, print_step_time,
    print_success, ConfigCard,
};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match run(&cli) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<PipelineError>() {
            Some(pipeline_err) if pipeline_err.is_data_unavailable() => {
                print_error(&pipeline_err.to_string());
                Ok(ExitCode::FAILURE)
            }
            _ => Err(err),
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Convert {
                input,
                output,
                sheet,
            } => {
                let options = LoadOptions {
                    sheet: sheet.clone(),
                };
                run_convert(input, output.as_deref(), &options).map(|_| ())
            }
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;

    let view = match cli.view {
        Some(view) => view,
        None if cli.no_confirm => View::Monthly,
        None => select_view()?,
    };
    let settings = cli.view_settings();

    print_banner(env!("CARGO_PKG_VERSION"));
    let baseline = settings.baseline.to_string();
    print_config(&ConfigCard {
        input,
        view: view.name(),
        baseline: &baseline,
        excluded_year: settings.filter.excluded_year,
        export: cli.export.as_deref(),
    });

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, &cli.load_options())?;

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let records = records_from_frame(&df)?;
    drop(df);
    let withdrawals = records
        .iter()
        .filter(|r| settings.filter.admits_status(r))
        .count();
    print_count(
        "withdrawn student(s)",
        withdrawals,
        Some(&format!("of {} record(s)", records.len())),
    );

    let mut summary = RunSummary::new(rows, cols);
    summary.set_records(records.len(), withdrawals as u64);
    summary.load_time = step_start.elapsed();
    print_step_time(summary.load_time);

    // Step 2: Compute the view
    print_step_header(2, view.title());
    let step_start = Instant::now();
    let spinner = create_spinner("Aggregating...");
    let output = view.run(&records, &settings);
    finish_with_success(&spinner, "Aggregation complete");
    summary.view_time = step_start.elapsed();

    display_view_output(view, &output, cli.long);
    print_step_time(summary.view_time);

    // Step 3: Export
    if let Some(export_path) = &cli.export {
        print_step_header(3, "Export");
        if export_path.exists() && !cli.no_confirm && !confirm_overwrite(export_path)? {
            print_info("Export skipped");
        } else {
            let input_name = input.display().to_string();
            let params = ExportParams {
                input_file: &input_name,
                view,
                baseline: settings.baseline,
                excluded_year: settings.filter.excluded_year,
                long: cli.long,
            };
            export_view(&output, export_path, &params)?;
            print_success(&format!("Saved to {}", export_path.display()));
            summary.export_path = Some(export_path.display().to_string());
        }
    }

    summary.display();
    print_completion();

    Ok(())
}
