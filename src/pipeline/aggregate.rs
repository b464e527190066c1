//! Period aggregation: filter, group, zero-fill, label
//!
//! [`aggregate`] turns enrollment records into a count table keyed by month
//! and, optionally, by one categorical dimension. The month axis is always
//! contiguous: every month between the (baseline-clamped) first period and
//! the last observed period appears, with zero where nothing was counted.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::info;

use super::filter::{FilterStats, RecordFilter, SkipReason};
use super::period::{LabelStyle, Period, DEFAULT_BASELINE};
use super::schema::{Dimension, EnrollmentRecord};

/// Earliest month every time series shows unless configured otherwise
pub fn default_baseline() -> Period {
    DEFAULT_BASELINE
}

/// Everything that shapes one aggregation
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    pub filter: RecordFilter,
    /// Dimension cross-tabulated against the month axis
    pub dimension: Option<Dimension>,
    /// Categories split out of the table and reported as one total
    pub excluded_categories: Vec<String>,
    /// Fixed category set. Values outside it are not counted.
    pub category_domain: Option<Vec<String>>,
    pub baseline: Period,
    /// Months removed from the returned table after zero-fill
    pub dropped_periods: Vec<Period>,
    pub label_style: LabelStyle,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            filter: RecordFilter::default(),
            dimension: None,
            excluded_categories: Vec::new(),
            category_domain: None,
            baseline: default_baseline(),
            dropped_periods: Vec::new(),
            label_style: LabelStyle::default(),
        }
    }
}

impl AggregateConfig {
    pub fn grouped_by(dimension: Dimension) -> Self {
        Self {
            dimension: Some(dimension),
            ..Default::default()
        }
    }
}

/// One month of the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRow {
    pub period: Period,
    pub label: String,
    /// One count per entry of [`CountTable::categories`]; empty when ungrouped
    pub counts: Vec<u64>,
    /// Sum of `counts`, or the month's count when ungrouped
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub count: u64,
}

/// One (month, category, count) triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRow {
    pub period: Period,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub count: u64,
}

/// Wide-form result of [`aggregate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountTable {
    pub dimension: Option<Dimension>,
    pub categories: Vec<String>,
    /// Chronological
    pub rows: Vec<PeriodRow>,
    /// Sum over every month of the excluded categories
    pub excluded_total: u64,
    /// Per-category sums over every month, before any month is dropped
    pub category_totals: Vec<CategoryTotal>,
    pub stats: FilterStats,
}

impl CountTable {
    pub fn is_grouped(&self) -> bool {
        self.dimension.is_some()
    }

    pub fn periods(&self) -> Vec<Period> {
        self.rows.iter().map(|r| r.period).collect()
    }

    /// Labels in chronological order; use this as the axis sort order
    pub fn period_labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.label.clone()).collect()
    }

    /// Month totals in chronological order
    pub fn totals(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.total).collect()
    }

    /// Counts of one category across the month axis
    pub fn series(&self, category: &str) -> Option<Vec<u64>> {
        let idx = self.categories.iter().position(|c| c == category)?;
        Some(self.rows.iter().map(|r| r.counts[idx]).collect())
    }

    pub fn grand_total(&self) -> u64 {
        self.rows.iter().map(|r| r.total).sum()
    }

    /// Reshape to one row per (month, category)
    pub fn to_long(&self) -> Vec<LongRow> {
        if !self.is_grouped() {
            return self
                .rows
                .iter()
                .map(|r| LongRow {
                    period: r.period,
                    label: r.label.clone(),
                    category: None,
                    count: r.total,
                })
                .collect();
        }

        self.rows
            .iter()
            .flat_map(|r| {
                self.categories
                    .iter()
                    .zip(&r.counts)
                    .map(move |(category, count)| LongRow {
                        period: r.period,
                        label: r.label.clone(),
                        category: Some(category.clone()),
                        count: *count,
                    })
            })
            .collect()
    }
}

/// Filter, group and zero-fill `records` into a [`CountTable`]
pub fn aggregate(records: &[EnrollmentRecord], config: &AggregateConfig) -> CountTable {
    let mut stats = FilterStats::default();
    let mut sparse: BTreeMap<Period, BTreeMap<String, u64>> = BTreeMap::new();
    let mut observed_categories: BTreeSet<String> = BTreeSet::new();

    for record in records {
        let date = match config.filter.admit(record) {
            Ok(date) => date,
            Err(reason) => {
                stats.record_skip(reason);
                continue;
            }
        };

        let category = match config.dimension {
            None => String::new(),
            Some(dimension) => match record.dimension(dimension) {
                None => {
                    stats.record_skip(SkipReason::MissingDimension);
                    continue;
                }
                Some(value) => {
                    if let Some(domain) = &config.category_domain {
                        if !domain.iter().any(|d| d == value) {
                            stats.record_skip(SkipReason::OutsideDomain);
                            continue;
                        }
                    }
                    value.to_string()
                }
            },
        };

        stats.record_counted();
        observed_categories.insert(category.clone());
        *sparse
            .entry(Period::from_date(date))
            .or_default()
            .entry(category)
            .or_insert(0) += 1;
    }

    let categories: Vec<String> = match (config.dimension, &config.category_domain) {
        (None, _) => Vec::new(),
        (Some(_), Some(domain)) => domain.clone(),
        (Some(_), None) => observed_categories.into_iter().collect(),
    };

    let axis = period_axis(&sparse, config.baseline);

    let (kept, excluded): (Vec<usize>, Vec<usize>) = (0..categories.len())
        .partition(|&idx| !config.excluded_categories.contains(&categories[idx]));

    let mut excluded_total = 0;
    let mut totals_by_category = vec![0u64; categories.len()];
    let mut rows = Vec::with_capacity(axis.len());

    for period in axis {
        let month = sparse.get(&period);
        let count_of = |category: &str| -> u64 {
            month
                .and_then(|m| m.get(category))
                .copied()
                .unwrap_or(0)
        };

        let full: Vec<u64> = categories.iter().map(|c| count_of(c.as_str())).collect();
        for (idx, count) in full.iter().enumerate() {
            totals_by_category[idx] += count;
        }
        excluded_total += excluded.iter().map(|&idx| full[idx]).sum::<u64>();

        if config.dropped_periods.contains(&period) {
            continue;
        }

        let (counts, total) = if config.dimension.is_some() {
            let counts: Vec<u64> = kept.iter().map(|&idx| full[idx]).collect();
            let total = counts.iter().sum();
            (counts, total)
        } else {
            (Vec::new(), count_of(""))
        };

        rows.push(PeriodRow {
            period,
            label: period.label(config.label_style),
            counts,
            total,
        });
    }

    let category_totals = kept
        .iter()
        .map(|&idx| CategoryTotal {
            category: categories[idx].clone(),
            count: totals_by_category[idx],
        })
        .collect();
    let categories = kept.iter().map(|&idx| categories[idx].clone()).collect();

    info!(
        counted = stats.counted,
        skipped = stats.skipped(),
        months = rows.len(),
        excluded_total,
        "aggregation complete"
    );

    CountTable {
        dimension: config.dimension,
        categories,
        rows,
        excluded_total,
        category_totals,
        stats,
    }
}

/// Contiguous month axis: `min(baseline, first observed)` through the last
/// observed month, or just the baseline when nothing was observed
fn period_axis<V>(sparse: &BTreeMap<Period, V>, baseline: Period) -> Vec<Period> {
    match (sparse.keys().next(), sparse.keys().next_back()) {
        (Some(&first), Some(&last)) => Period::range_inclusive(first.min(baseline), last),
        _ => vec![baseline],
    }
}
