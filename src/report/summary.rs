//! Run summary shown after a view completes

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// What one run loaded and how long each stage took
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub columns_loaded: usize,
    pub records: usize,
    pub withdrawals: u64,
    pub export_path: Option<String>,
    pub load_time: Duration,
    pub view_time: Duration,
}

impl RunSummary {
    pub fn new(rows_loaded: usize, columns_loaded: usize) -> Self {
        Self {
            rows_loaded,
            columns_loaded,
            ..Default::default()
        }
    }

    pub fn set_records(&mut self, records: usize, withdrawals: u64) {
        self.records = records;
        self.withdrawals = withdrawals;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.view_time
    }

    pub fn build_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Rows loaded"),
            Cell::new(format!("{} × {} columns", self.rows_loaded, self.columns_loaded)),
        ]);
        table.add_row(vec![
            Cell::new("🧾 Records"),
            Cell::new(self.records),
        ]);
        table.add_row(vec![
            Cell::new("🚪 Withdrawals"),
            Cell::new(self.withdrawals)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        if let Some(path) = &self.export_path {
            table.add_row(vec![Cell::new("💾 Exported to"), Cell::new(path)]);
        }
        table.add_row(vec![
            Cell::new("⏱️  Load"),
            Cell::new(format!("{:.2}s", self.load_time.as_secs_f64())),
        ]);
        table.add_row(vec![
            Cell::new("⏱️  Aggregate"),
            Cell::new(format!("{:.2}s", self.view_time.as_secs_f64())),
        ]);
        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.build_table().to_string().lines() {
            println!("    {}", line);
        }
        println!(
            "      {}",
            style(format!("Total {:.2}s", self.total_time().as_secs_f64())).dim()
        );
    }
}
