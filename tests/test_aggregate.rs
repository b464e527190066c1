//! Tests for period aggregation: filtering, zero-fill, grouping and reshaping

use dropstat::pipeline::canonical::UNJUSTIFIED_REASON;
use dropstat::pipeline::{
    aggregate, AggregateConfig, Dimension, EnrollmentRecord, LabelStyle, Period, RecordFilter,
};

#[path = "common/mod.rs"]
mod common;

use common::{enrolled, withdrawal, withdrawal_by_sex, WITHDREW};

fn period(y: i32, m: u32) -> Period {
    Period::new(y, m).unwrap()
}

fn reason_config() -> AggregateConfig {
    AggregateConfig::grouped_by(Dimension::Reason)
}

#[test]
fn test_three_row_scenario() {
    let records = vec![
        EnrollmentRecord::new(Some("Desistiu"), Some("2024-11-05")).with_reason("A"),
        EnrollmentRecord::new(Some("Desistência"), Some("2024-12-20")).with_reason("A"),
        EnrollmentRecord::new(Some("Ativo"), Some("2024-12-20")).with_reason("B"),
    ];
    let config = AggregateConfig {
        label_style: LabelStyle::Short,
        ..reason_config()
    };

    let table = aggregate(&records, &config);

    assert_eq!(table.period_labels(), vec!["Out/24", "Nov/24", "Dez/24"]);
    assert_eq!(table.categories, vec!["A".to_string()]);
    assert_eq!(table.series("A"), Some(vec![0, 1, 1]));
    assert_eq!(table.series("B"), None, "Non-withdrawals must not be counted");
    assert_eq!(table.stats.skipped_status, 1);
}

#[test]
fn test_empty_input_yields_baseline_month() {
    let table = aggregate(&[], &reason_config());

    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].period, period(2024, 10));
    assert_eq!(table.rows[0].label, "Outubro/24");
    assert_eq!(table.rows[0].total, 0);
    assert!(table.categories.is_empty());
}

#[test]
fn test_aggregation_is_idempotent() {
    let records = common::create_large_record_set(500, 7);
    let config = reason_config();

    let first = aggregate(&records, &config);
    let second = aggregate(&records, &config);

    assert_eq!(first, second);
}

#[test]
fn test_counts_match_admitted_records() {
    let records = common::create_large_record_set(2_000, 42);
    let filter = RecordFilter::default();
    let admitted = records.iter().filter(|r| filter.admit(r).is_ok()).count() as u64;

    let table = aggregate(&records, &AggregateConfig::default());

    assert_eq!(table.grand_total(), admitted);
    assert_eq!(table.stats.counted, admitted);
    assert_eq!(
        table.stats.counted + table.stats.skipped(),
        records.len() as u64
    );
}

#[test]
fn test_month_axis_is_zero_filled() {
    let records = vec![
        withdrawal("2024-10-02", "A"),
        withdrawal("2025-03-30", "A"),
    ];

    let table = aggregate(&records, &AggregateConfig::default());

    let expected: Vec<Period> = Period::range_inclusive(period(2024, 10), period(2025, 3));
    assert_eq!(table.periods(), expected);
    assert_eq!(table.totals(), vec![1, 0, 0, 0, 0, 1]);
}

#[test]
fn test_chronological_order_across_year_boundary() {
    let records = vec![
        withdrawal("2025-01-15", "A"),
        withdrawal("2024-12-15", "A"),
        withdrawal("2025-02-15", "A"),
    ];

    let table = aggregate(&records, &reason_config());

    assert_eq!(
        table.period_labels(),
        vec!["Outubro/24", "Novembro/24", "Dezembro/24", "Janeiro/25", "Fevereiro/25"]
    );
    let periods = table.periods();
    assert!(periods.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_history_before_baseline_is_kept() {
    let records = vec![
        withdrawal("2022-08-10", "A"),
        withdrawal("2022-10-01", "A"),
    ];

    let table = aggregate(&records, &reason_config());

    assert_eq!(table.periods().first(), Some(&period(2022, 8)));
    assert_eq!(
        table.periods().last(),
        Some(&period(2022, 10)),
        "The axis ends at the last observed month"
    );
    assert_eq!(table.series("A"), Some(vec![1, 0, 1]));
}

#[test]
fn test_reason_variants_are_merged() {
    let records = vec![
        withdrawal("2024-11-01", "Motivos de sáude/pessoal"),
        withdrawal("2024-11-02", "Motivos de saúde/pessoal."),
        withdrawal("2024-11-03", "Motivos de saúde/pessoal"),
    ];

    let table = aggregate(&records, &reason_config());

    assert_eq!(table.categories, vec!["Motivos de saúde/pessoal".to_string()]);
    assert_eq!(
        table.series("Motivos de saúde/pessoal"),
        Some(vec![0, 3])
    );
}

#[test]
fn test_filter_skips_by_reason() {
    let records = vec![
        withdrawal("2024-11-01", "A"),
        enrolled("2024-11-01", "A"),
        withdrawal("2026-02-01", "A"),
        EnrollmentRecord::new(Some(WITHDREW), None).with_reason("A"),
        EnrollmentRecord::new(Some(WITHDREW), Some("sem data")).with_reason("A"),
        EnrollmentRecord::new(Some(WITHDREW), Some("2024-11-20")),
    ];

    let table = aggregate(&records, &reason_config());

    assert_eq!(table.grand_total(), 1);
    assert_eq!(table.stats.counted, 1);
    assert_eq!(table.stats.skipped_status, 1);
    assert_eq!(table.stats.skipped_excluded_year, 1);
    assert_eq!(table.stats.skipped_missing_date, 1);
    assert_eq!(table.stats.skipped_coercion, 1);
    assert_eq!(table.stats.skipped_missing_dimension, 1);
    assert!(
        !table.periods().iter().any(|p| p.year() == 2026),
        "Excluded year must not extend the axis"
    );
}

#[test]
fn test_excluded_year_can_be_disabled() {
    let records = vec![withdrawal("2026-02-01", "A")];
    let config = AggregateConfig {
        filter: RecordFilter {
            excluded_year: None,
            ..RecordFilter::default()
        },
        ..reason_config()
    };

    let table = aggregate(&records, &config);

    assert_eq!(table.grand_total(), 1);
    assert_eq!(table.periods().last(), Some(&period(2026, 2)));
}

#[test]
fn test_excluded_category_is_reported_separately() {
    let records = vec![
        withdrawal("2024-10-01", UNJUSTIFIED_REASON),
        withdrawal("2024-11-01", UNJUSTIFIED_REASON),
        withdrawal("2024-11-01", "A"),
    ];
    let config = AggregateConfig {
        excluded_categories: vec![UNJUSTIFIED_REASON.to_string()],
        ..reason_config()
    };

    let table = aggregate(&records, &config);

    assert_eq!(table.categories, vec!["A".to_string()]);
    assert_eq!(table.excluded_total, 2);
    assert_eq!(table.totals(), vec![0, 1]);
    assert!(table
        .category_totals
        .iter()
        .all(|t| t.category != UNJUSTIFIED_REASON));
}

#[test]
fn test_dropped_periods_are_removed_after_totals() {
    let records = vec![
        withdrawal("2024-10-01", "A"),
        withdrawal("2024-11-01", "A"),
        withdrawal("2024-11-02", "A"),
        withdrawal("2024-12-01", "A"),
    ];
    let config = AggregateConfig {
        dropped_periods: vec![period(2024, 11)],
        ..reason_config()
    };

    let table = aggregate(&records, &config);

    assert_eq!(table.periods(), vec![period(2024, 10), period(2024, 12)]);
    assert_eq!(table.series("A"), Some(vec![1, 1]));
    assert_eq!(table.category_totals[0].count, 4);
}

#[test]
fn test_category_domain_fixes_columns() {
    let records = vec![
        withdrawal_by_sex("2024-10-05", "Feminino"),
        withdrawal_by_sex("2024-10-06", "Outro"),
    ];
    let domain = vec![
        "Feminino".to_string(),
        "Masculino".to_string(),
        "Não binário".to_string(),
    ];
    let config = AggregateConfig {
        category_domain: Some(domain.clone()),
        ..AggregateConfig::grouped_by(Dimension::Sex)
    };

    let table = aggregate(&records, &config);

    assert_eq!(table.categories, domain);
    assert_eq!(table.rows[0].counts, vec![1, 0, 0]);
    assert_eq!(table.stats.skipped_outside_domain, 1);
}

#[test]
fn test_long_form_has_one_row_per_cell() {
    let records = vec![
        withdrawal("2024-10-01", "A"),
        withdrawal("2024-12-01", "B"),
    ];

    let table = aggregate(&records, &reason_config());
    let long = table.to_long();

    assert_eq!(long.len(), table.rows.len() * table.categories.len());
    assert_eq!(long.len(), 6);
    assert_eq!(long[0].category.as_deref(), Some("A"));
    assert_eq!(long[1].category.as_deref(), Some("B"));
    assert_eq!(long[0].period, period(2024, 10));
    assert_eq!(long.iter().map(|r| r.count).sum::<u64>(), 2);
}

#[test]
fn test_ungrouped_series_long_form() {
    let records = vec![withdrawal("2024-11-01", "A")];

    let table = aggregate(&records, &AggregateConfig::default());
    let long = table.to_long();

    assert!(!table.is_grouped());
    assert_eq!(long.len(), 2);
    assert!(long.iter().all(|r| r.category.is_none()));
    assert_eq!(long[1].count, 1);
}

#[test]
fn test_custom_statuses() {
    let records = vec![
        EnrollmentRecord::new(Some("Trancado"), Some("2024-11-01")).with_reason("A"),
        withdrawal("2024-11-01", "A"),
    ];
    let config = AggregateConfig {
        filter: RecordFilter {
            statuses: vec!["Trancado".to_string()],
            ..RecordFilter::default()
        },
        ..reason_config()
    };

    let table = aggregate(&records, &config);

    assert_eq!(table.grand_total(), 1);
    assert_eq!(table.stats.skipped_status, 1);
}

#[test]
fn test_bare_year_does_not_stretch_axis() {
    let records = vec![
        EnrollmentRecord::new(Some(WITHDREW), Some("2024")).with_reason("A"),
        withdrawal("2024-11-05", "A"),
    ];

    let table = aggregate(&records, &reason_config());

    assert_eq!(table.periods().first(), Some(&period(2024, 10)));
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.stats.skipped_coercion, 1);
    assert_eq!(table.grand_total(), 1);
}
