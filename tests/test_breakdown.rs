//! Tests for category breakdowns, cross tabs, peaks and the overview

use dropstat::pipeline::canonical::{
    INCOME_1001_TO_2000, INCOME_ABOVE_4000, INCOME_BRACKETS, INCOME_UP_TO_1000,
};
use chrono::NaiveDate;
use dropstat::pipeline::{
    cross_tab, daily_counts, overview, peak_months, recent_withdrawals, top_n, value_counts,
    Dimension, LabelStyle, RecordFilter,
};

#[path = "common/mod.rs"]
mod common;

use common::{create_sample_records, enrolled, withdrawal};

#[test]
fn test_value_counts_sorted_by_count_then_label() {
    let records = create_sample_records();

    let counts = value_counts(&records, &RecordFilter::default(), Dimension::State);
    let labels: Vec<&str> = counts.iter().map(|c| c.category.as_str()).collect();

    assert_eq!(labels, vec!["SP", "BA", "MG", "RJ"]);
    assert_eq!(counts[0].count, 3);
    let total: f64 = counts.iter().map(|c| c.fraction).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!((counts[0].fraction - 0.5).abs() < 1e-9);
}

#[test]
fn test_value_counts_ignore_non_withdrawals() {
    let records = create_sample_records();

    let counts = value_counts(&records, &RecordFilter::default(), Dimension::Reason);
    let total: u64 = counts.iter().map(|c| c.count).sum();

    assert_eq!(total, 6, "The enrolled student must not be counted");
}

#[test]
fn test_top_n_truncates() {
    let records = create_sample_records();
    let counts = value_counts(&records, &RecordFilter::default(), Dimension::State);

    let top = top_n(&counts, 2);

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].category, "SP");
    assert_eq!(top_n(&counts, 50).len(), counts.len());
}

#[test]
fn test_cross_tab_origin_by_sex() {
    let records = create_sample_records();

    let tab = cross_tab(
        &records,
        &RecordFilter::default(),
        Dimension::Origin,
        Dimension::Sex,
        None,
    );

    assert_eq!(tab.rows, vec!["Indicação", "Instagram", "Site"]);
    assert_eq!(tab.columns, vec!["Feminino", "Masculino", "Não binário"]);
    assert_eq!(tab.get("Instagram", "Feminino"), Some(2));
    assert_eq!(tab.get("Indicação", "Feminino"), Some(0));
    assert_eq!(tab.get("Desconhecido", "Feminino"), None);
    assert_eq!(tab.row_totals(), vec![1, 3, 2]);
    assert_eq!(tab.to_long().len(), 9);
}

#[test]
fn test_cross_tab_income_domain() {
    let records = create_sample_records();
    let brackets: Vec<String> = INCOME_BRACKETS.iter().map(|s| s.to_string()).collect();

    let tab = cross_tab(
        &records,
        &RecordFilter::default(),
        Dimension::IncomeBracket,
        Dimension::Reason,
        Some(&brackets),
    );

    assert_eq!(tab.rows, brackets, "Rows follow the bracket order");
    assert_eq!(tab.get(INCOME_UP_TO_1000, "Mudança de emprego"), Some(2));
    assert_eq!(
        tab.get(INCOME_1001_TO_2000, "Motivos de saúde/pessoal"),
        Some(1)
    );
    assert_eq!(
        tab.get(INCOME_ABOVE_4000, "Evasão sem justificativa/sem retorno"),
        Some(1)
    );
    let counted: u64 = tab.row_totals().iter().sum();
    assert_eq!(counted, 5, "Uninformed income is left out of the matrix");
}

#[test]
fn test_peak_months_threshold_and_top() {
    let mut records = Vec::new();
    for (date, n) in [
        ("2024-11-10", 30),
        ("2024-12-10", 10),
        ("2025-02-10", 27),
        ("2025-03-10", 40),
    ] {
        records.extend((0..n).map(|_| withdrawal(date, "A")));
    }

    let peaks = peak_months(&records, &RecordFilter::default(), 25, 2, LabelStyle::Short);

    let labels: Vec<&str> = peaks.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Nov/24", "Fev/25", "Mar/25"]);
    let flags: Vec<bool> = peaks.iter().map(|p| p.is_top).collect();
    assert_eq!(flags, vec![true, false, true]);
    assert_eq!(peaks[2].count, 40);
}

#[test]
fn test_peak_months_threshold_is_strict() {
    let records: Vec<_> = (0..25).map(|_| withdrawal("2024-11-10", "A")).collect();

    let peaks = peak_months(&records, &RecordFilter::default(), 25, 2, LabelStyle::Full);

    assert!(peaks.is_empty());
}

#[test]
fn test_peak_months_skip_excluded_year() {
    let records: Vec<_> = (0..30).map(|_| withdrawal("2026-01-10", "A")).collect();

    let peaks = peak_months(&records, &RecordFilter::default(), 25, 2, LabelStyle::Full);

    assert!(peaks.is_empty());
}

#[test]
fn test_overview_headline_numbers() {
    let records = create_sample_records();

    let summary = overview(&records, &RecordFilter::default());

    assert_eq!(summary.total_withdrawals, 6);
    assert_eq!(summary.dated_withdrawals, 5);
    assert_eq!(summary.recent_withdrawals, 5);
    assert_eq!(summary.distinct_states, 4);
    let mean_age = summary.mean_age.unwrap();
    assert!((mean_age - 173.0 / 6.0).abs() < 1e-9);

    let top_state = summary.top_state.unwrap();
    assert_eq!(top_state.category, "SP");
    assert_eq!(top_state.count, 3);

    let top_reason = summary.top_reason.unwrap();
    assert_eq!(top_reason.category, "Mudança de emprego");
    assert!((top_reason.fraction - 0.5).abs() < 1e-9);
}

#[test]
fn test_overview_of_empty_input() {
    let summary = overview(&[], &RecordFilter::default());

    assert_eq!(summary.total_withdrawals, 0);
    assert_eq!(summary.recent_withdrawals, 0);
    assert_eq!(summary.mean_age, None);
    assert!(summary.top_reason.is_none());
    assert_eq!(summary.distinct_states, 0);
}

#[test]
fn test_daily_counts_are_chronological() {
    let records = vec![
        withdrawal("2024-11-05", "A"),
        withdrawal("05/11/2024", "B"),
        withdrawal("2024-10-01", "A"),
        withdrawal("2026-01-01", "A"),
        enrolled("2024-10-01", "A"),
    ];

    let days = daily_counts(&records, &RecordFilter::default());

    assert_eq!(days.len(), 2);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
    assert_eq!(days[0].count, 1);
    assert_eq!(days[0].label(), "01/10/2024");
    assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 11, 5).unwrap());
    assert_eq!(days[1].count, 2);
}

#[test]
fn test_recent_withdrawals_window_ends_at_last_month() {
    let records = vec![
        withdrawal("2024-03-10", "A"),
        withdrawal("2024-05-01", "A"),
        withdrawal("2024-09-30", "A"),
        withdrawal("2024-10-02", "A"),
        withdrawal("2024-10-20", "A"),
        enrolled("2024-10-21", "A"),
    ];
    let filter = RecordFilter::default();

    assert_eq!(recent_withdrawals(&records, &filter, 6), 4);
    assert_eq!(recent_withdrawals(&records, &filter, 1), 2);
    assert_eq!(recent_withdrawals(&records, &filter, 12), 5);
    assert_eq!(recent_withdrawals(&records, &filter, 0), 0);
    assert_eq!(recent_withdrawals(&[], &filter, 6), 0);
}
