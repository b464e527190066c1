//! Category breakdowns that are not keyed by month
//!
//! Counts here consider every record whose status marks a withdrawal; the
//! withdrawal date only matters for [`peak_months`], [`daily_counts`] and
//! [`recent_withdrawals`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::RecordFilter;
use super::period::{LabelStyle, Period};
use super::schema::{Dimension, EnrollmentRecord};

/// Count and share of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
    /// Share of all counted records, 0.0..=1.0
    pub fraction: f64,
}

/// Count records per value of `dimension`, largest first
///
/// Records without a value for the dimension are not counted. Ties are
/// broken by category label.
pub fn value_counts(
    records: &[EnrollmentRecord],
    filter: &RecordFilter,
    dimension: Dimension,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records.iter().filter(|r| filter.admits_status(r)) {
        if let Some(value) = record.dimension(dimension) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let total: u64 = counts.values().sum();
    let mut result: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
            fraction: if total > 0 {
                count as f64 / total as f64
            } else {
                0.0
            },
        })
        .collect();

    // BTreeMap iteration already ordered labels; a stable sort keeps that for ties
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// The `n` largest categories
pub fn top_n(counts: &[CategoryCount], n: usize) -> Vec<CategoryCount> {
    counts.iter().take(n).cloned().collect()
}

/// Two-dimension count matrix with zero-filled cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<u64>>,
}

/// One cell of a [`CrossTab`] in long form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTabCell {
    pub row: String,
    pub column: String,
    pub count: u64,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> Option<u64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.cells[r][c])
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn to_long(&self) -> Vec<CrossTabCell> {
        self.rows
            .iter()
            .zip(&self.cells)
            .flat_map(|(row, cells)| {
                self.columns
                    .iter()
                    .zip(cells)
                    .map(move |(column, count)| CrossTabCell {
                        row: row.clone(),
                        column: column.clone(),
                        count: *count,
                    })
            })
            .collect()
    }
}

/// Cross-tabulate two dimensions
///
/// With `row_domain`, only those row values are kept, in that order.
/// Otherwise rows and columns are the observed values, sorted.
pub fn cross_tab(
    records: &[EnrollmentRecord],
    filter: &RecordFilter,
    row_dimension: Dimension,
    column_dimension: Dimension,
    row_domain: Option<&[String]>,
) -> CrossTab {
    let mut sparse: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut observed_rows: BTreeSet<&str> = BTreeSet::new();
    let mut observed_columns: BTreeSet<&str> = BTreeSet::new();

    for record in records.iter().filter(|r| filter.admits_status(r)) {
        let (Some(row), Some(column)) = (
            record.dimension(row_dimension),
            record.dimension(column_dimension),
        ) else {
            continue;
        };
        if let Some(domain) = row_domain {
            if !domain.iter().any(|d| d == row) {
                continue;
            }
        }
        observed_rows.insert(row);
        observed_columns.insert(column);
        *sparse.entry((row, column)).or_insert(0) += 1;
    }

    let rows: Vec<String> = match row_domain {
        Some(domain) => domain.to_vec(),
        None => observed_rows.iter().map(|s| s.to_string()).collect(),
    };
    let columns: Vec<String> = observed_columns.iter().map(|s| s.to_string()).collect();

    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    sparse
                        .get(&(row.as_str(), column.as_str()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    CrossTab {
        row_dimension,
        column_dimension,
        rows,
        columns,
        cells,
    }
}

/// A month whose withdrawals exceeded the peak threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakMonth {
    pub period: Period,
    pub label: String,
    pub count: u64,
    /// Among the `top` largest months
    pub is_top: bool,
}

/// Months with strictly more than `threshold` withdrawals, chronological
///
/// The `top` largest are flagged; ties at the cut-off go to the earlier month.
pub fn peak_months(
    records: &[EnrollmentRecord],
    filter: &RecordFilter,
    threshold: u64,
    top: usize,
    style: LabelStyle,
) -> Vec<PeakMonth> {
    let mut monthly: BTreeMap<Period, u64> = BTreeMap::new();
    for record in records {
        if let Ok(date) = filter.admit(record) {
            *monthly.entry(Period::from_date(date)).or_insert(0) += 1;
        }
    }

    let above: Vec<(Period, u64)> = monthly
        .into_iter()
        .filter(|(_, count)| *count > threshold)
        .collect();

    let mut ranked = above.clone();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let top_periods: Vec<Period> = ranked.iter().take(top).map(|(p, _)| *p).collect();

    above
        .into_iter()
        .map(|(period, count)| PeakMonth {
            period,
            label: period.label(style),
            count,
            is_top: top_periods.contains(&period),
        })
        .collect()
}

/// Withdrawals on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

impl DailyCount {
    /// `dd/mm/yyyy`
    pub fn label(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

/// Withdrawals per day, chronological. Days without withdrawals are absent.
pub fn daily_counts(records: &[EnrollmentRecord], filter: &RecordFilter) -> Vec<DailyCount> {
    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        if let Ok(date) = filter.admit(record) {
            *daily.entry(date).or_insert(0) += 1;
        }
    }

    daily
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Months counted by [`Overview::recent_withdrawals`]
pub const RECENT_WINDOW_MONTHS: u32 = 6;

/// Withdrawals in the `months` calendar months ending with the latest
/// observed month. The window does not depend on the current date.
pub fn recent_withdrawals(records: &[EnrollmentRecord], filter: &RecordFilter, months: u32) -> u64 {
    if months == 0 {
        return 0;
    }
    let periods: Vec<Period> = records
        .iter()
        .filter_map(|r| filter.admit(r).ok())
        .map(Period::from_date)
        .collect();
    let Some(&last) = periods.iter().max() else {
        return 0;
    };

    let first = last.months_before(months - 1);
    periods.iter().filter(|p| **p >= first).count() as u64
}

/// Headline numbers for the landing view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    /// Records with a withdrawal status
    pub total_withdrawals: u64,
    /// Of those, records that pass the date predicates
    pub dated_withdrawals: u64,
    /// Dated withdrawals in the last [`RECENT_WINDOW_MONTHS`] observed months
    pub recent_withdrawals: u64,
    pub mean_age: Option<f64>,
    pub distinct_states: usize,
    pub top_reason: Option<CategoryCount>,
    pub top_state: Option<CategoryCount>,
}

/// Headline numbers: totals, recent withdrawals, mean age and the top state and reason
pub fn overview(records: &[EnrollmentRecord], filter: &RecordFilter) -> Overview {
    let withdrawn: Vec<&EnrollmentRecord> =
        records.iter().filter(|r| filter.admits_status(r)).collect();

    let dated = withdrawn.iter().filter(|r| filter.admit(r).is_ok()).count();

    let ages: Vec<f64> = withdrawn.iter().filter_map(|r| r.age).collect();
    let mean_age = if ages.is_empty() {
        None
    } else {
        Some(ages.iter().sum::<f64>() / ages.len() as f64)
    };

    let states = value_counts(records, filter, Dimension::State);
    let reasons = value_counts(records, filter, Dimension::Reason);

    Overview {
        total_withdrawals: withdrawn.len() as u64,
        dated_withdrawals: dated as u64,
        recent_withdrawals: recent_withdrawals(records, filter, RECENT_WINDOW_MONTHS),
        mean_age,
        distinct_states: states.len(),
        top_reason: reasons.into_iter().next(),
        top_state: states.first().cloned(),
    }
}
