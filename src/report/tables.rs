//! Terminal tables for view outputs

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{
    CategoryCount, CountTable, CrossTab, DailyCount, Dimension, FilterStats, Overview, PeakMonth,
    View, ViewOutput, RECENT_WINDOW_MONTHS,
};

const TOTAL_HEADER: &str = "Total";
const PERIOD_HEADER: &str = "Mês/Ano";
const COUNT_HEADER: &str = "Desistências";

fn new_table(headers: Vec<String>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn count_cell(count: u64) -> Cell {
    let cell = Cell::new(count).set_alignment(CellAlignment::Right);
    if count == 0 {
        cell.fg(Color::DarkGrey)
    } else {
        cell
    }
}

/// Wide table: one row per month, one column per category
pub fn build_count_table(table: &CountTable) -> Table {
    let mut headers = vec![PERIOD_HEADER.to_string()];
    headers.extend(table.categories.iter().cloned());
    headers.push(if table.is_grouped() {
        TOTAL_HEADER.to_string()
    } else {
        COUNT_HEADER.to_string()
    });

    let mut out = new_table(headers);
    for row in &table.rows {
        let mut cells = vec![Cell::new(&row.label)];
        cells.extend(row.counts.iter().map(|c| count_cell(*c)));
        cells.push(count_cell(row.total).add_attribute(Attribute::Bold));
        out.add_row(cells);
    }
    out
}

/// Long table: one row per (month, category)
pub fn build_long_table(table: &CountTable) -> Table {
    let mut headers = vec![PERIOD_HEADER.to_string()];
    if let Some(dimension) = table.dimension {
        headers.push(dimension.title().to_string());
    }
    headers.push(COUNT_HEADER.to_string());

    let mut out = new_table(headers);
    for row in table.to_long() {
        let mut cells = vec![Cell::new(&row.label)];
        if let Some(category) = &row.category {
            cells.push(Cell::new(category));
        }
        cells.push(count_cell(row.count));
        out.add_row(cells);
    }
    out
}

pub fn build_ranking_table(dimension: Dimension, counts: &[CategoryCount]) -> Table {
    let mut out = new_table(vec![
        "#".to_string(),
        dimension.title().to_string(),
        COUNT_HEADER.to_string(),
        "%".to_string(),
    ]);
    for (idx, entry) in counts.iter().enumerate() {
        out.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&entry.category),
            count_cell(entry.count),
            Cell::new(format!("{:.2}%", entry.fraction * 100.0))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    out
}

pub fn build_cross_tab_table(cross_tab: &CrossTab) -> Table {
    let mut headers = vec![cross_tab.row_dimension.title().to_string()];
    headers.extend(cross_tab.columns.iter().cloned());
    headers.push(TOTAL_HEADER.to_string());

    let mut out = new_table(headers);
    for ((row, cells), total) in cross_tab
        .rows
        .iter()
        .zip(&cross_tab.cells)
        .zip(cross_tab.row_totals())
    {
        let mut line = vec![Cell::new(row)];
        line.extend(cells.iter().map(|c| count_cell(*c)));
        line.push(count_cell(total).add_attribute(Attribute::Bold));
        out.add_row(line);
    }
    out
}

pub fn build_cross_tab_long_table(cross_tab: &CrossTab) -> Table {
    let mut out = new_table(vec![
        cross_tab.row_dimension.title().to_string(),
        cross_tab.column_dimension.title().to_string(),
        COUNT_HEADER.to_string(),
    ]);
    for cell in cross_tab.to_long() {
        out.add_row(vec![
            Cell::new(&cell.row),
            Cell::new(&cell.column),
            count_cell(cell.count),
        ]);
    }
    out
}

pub fn build_peaks_table(months: &[PeakMonth]) -> Table {
    let mut out = new_table(vec![
        PERIOD_HEADER.to_string(),
        COUNT_HEADER.to_string(),
        "Pico".to_string(),
    ]);
    for month in months {
        let marker = if month.is_top {
            Cell::new("▲").fg(Color::Red).add_attribute(Attribute::Bold)
        } else {
            Cell::new("")
        };
        out.add_row(vec![Cell::new(&month.label), count_cell(month.count), marker]);
    }
    out
}

pub fn build_timeline_table(days: &[DailyCount]) -> Table {
    let mut out = new_table(vec!["Data".to_string(), COUNT_HEADER.to_string()]);
    for day in days {
        out.add_row(vec![Cell::new(day.label()), count_cell(day.count)]);
    }
    out
}

pub fn build_overview_table(overview: &Overview) -> Table {
    let mut out = new_table(vec!["Métrica".to_string(), "Valor".to_string()]);
    out.add_row(vec![
        Cell::new("Total de desistentes"),
        Cell::new(overview.total_withdrawals).add_attribute(Attribute::Bold),
    ]);
    out.add_row(vec![
        Cell::new("Com data válida"),
        Cell::new(overview.dated_withdrawals),
    ]);
    out.add_row(vec![
        Cell::new(format!("Últimos {} meses", RECENT_WINDOW_MONTHS)),
        Cell::new(overview.recent_withdrawals),
    ]);
    out.add_row(vec![
        Cell::new("Média de idade"),
        Cell::new(
            overview
                .mean_age
                .map(|a| format!("{:.1} anos", a))
                .unwrap_or_else(|| "—".to_string()),
        ),
    ]);
    out.add_row(vec![
        Cell::new("Estados"),
        Cell::new(overview.distinct_states),
    ]);
    if let Some(state) = &overview.top_state {
        out.add_row(vec![
            Cell::new("Estado com mais desistências"),
            Cell::new(format!("{} ({})", state.category, state.count)),
        ]);
    }
    if let Some(reason) = &overview.top_reason {
        out.add_row(vec![
            Cell::new("Motivo mais frequente"),
            Cell::new(format!(
                "{} ({:.1}%)",
                reason.category,
                reason.fraction * 100.0
            )),
        ]);
    }
    out
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn print_title(title: &str) {
    println!();
    println!("    {} {}", style("📋").cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_stats(stats: &FilterStats) {
    println!();
    println!(
        "      {} counted, {} skipped {}",
        style(stats.counted).green().bold(),
        style(stats.skipped()).yellow(),
        style(format!(
            "(status: {}, no date: {}, unparseable date: {}, excluded year: {}, no category: {}, outside domain: {})",
            stats.skipped_status,
            stats.skipped_missing_date,
            stats.skipped_coercion,
            stats.skipped_excluded_year,
            stats.skipped_missing_dimension,
            stats.skipped_outside_domain,
        ))
        .dim()
    );
}

fn display_count_table(title: &str, table: &CountTable, long: bool) {
    print_title(title);
    if long {
        print_indented(&build_long_table(table));
    } else {
        print_indented(&build_count_table(table));
    }

    if table.is_grouped() && !table.category_totals.is_empty() {
        println!();
        println!("      {}", style("Totais por categoria:").yellow());
        for total in &table.category_totals {
            println!(
                "        {} {}: {}",
                style("•").dim(),
                total.category,
                style(total.count).bold()
            );
        }
    }
    if table.excluded_total > 0 {
        println!(
            "      {} {}",
            style("Total das categorias excluídas do gráfico:").yellow(),
            style(table.excluded_total).bold()
        );
    }
    print_stats(&table.stats);
}

/// Print the output of one view
pub fn display_view_output(view: View, output: &ViewOutput, long: bool) {
    match output {
        ViewOutput::Series { table } => display_count_table(view.title(), table, long),
        ViewOutput::Ranking { dimension, counts } => {
            print_title(view.title());
            print_indented(&build_ranking_table(*dimension, counts));
        }
        ViewOutput::Matrix { cross_tab } => {
            print_title(view.title());
            if long {
                print_indented(&build_cross_tab_long_table(cross_tab));
            } else {
                print_indented(&build_cross_tab_table(cross_tab));
            }
        }
        ViewOutput::Peaks { threshold, months } => {
            print_title(&format!("{} (> {})", view.title(), threshold));
            if months.is_empty() {
                println!("      No month above the threshold");
            } else {
                print_indented(&build_peaks_table(months));
            }
        }
        ViewOutput::Timeline { days } => {
            print_title(view.title());
            if days.is_empty() {
                println!("      No dated withdrawals");
            } else {
                print_indented(&build_timeline_table(days));
            }
        }
        ViewOutput::Overview { overview, monthly } => {
            print_title(view.title());
            print_indented(&build_overview_table(overview));
            display_count_table(View::Monthly.title(), monthly, long);
        }
    }
}
