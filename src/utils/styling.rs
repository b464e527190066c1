//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[x] ");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("dropstat").cyan().bold(),
        style("· withdrawal analytics").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Settings shown in the configuration card
pub struct ConfigCard<'a> {
    pub input: &'a Path,
    pub view: &'a str,
    pub baseline: &'a str,
    pub excluded_year: Option<i32>,
    pub export: Option<&'a Path>,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!("    │ {}", style("⚙️  Configuration").cyan().bold());
    println!("    ├{}┤", line);
    println!(
        "    │  {}Input:          {}",
        FOLDER,
        truncate_path(card.input, 34)
    );
    println!("    │  {}View:           {}", CHART, style(card.view).yellow());
    println!(
        "    │  {}Baseline:       {}",
        CALENDAR,
        style(card.baseline).yellow()
    );
    println!(
        "    │  {}Excluded year:  {}",
        CALENDAR,
        style(
            card.excluded_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "none".to_string())
        )
        .yellow()
    );
    if let Some(export) = card.export {
        println!("    │  {}Export:         {}", SAVE, truncate_path(export, 34));
    }
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}",
        style(format!("⏱ {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a user-facing error message to stderr
pub fn print_error(message: &str) {
    eprintln!();
    eprintln!("    {}{}", CROSS, style(message).red().bold());
    eprintln!();
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!("    {} {}", ROCKET, style("dropstat complete!").green().bold());
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
