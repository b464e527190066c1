//! Named views and their pipeline presets
//!
//! Each view of the dashboard maps onto one pipeline call. Presets carry the
//! per-view choices (excluded reason, fixed sex domain, months hidden from
//! the chart); [`ViewSettings`] lets the caller override them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::aggregate::{aggregate, default_baseline, AggregateConfig, CountTable};
use super::breakdown::{
    cross_tab, daily_counts, overview, peak_months, top_n, value_counts, CategoryCount, CrossTab,
    DailyCount, Overview, PeakMonth,
};
use super::canonical::{INCOME_BRACKETS, SEX_DOMAIN, UNJUSTIFIED_REASON};
use super::filter::RecordFilter;
use super::period::{LabelStyle, Period};
use super::schema::{Dimension, EnrollmentRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Withdrawals per month
    Monthly,
    /// Withdrawals per month and reason
    Reason,
    /// Share of each withdrawal reason
    Reasons,
    /// Withdrawals per month and sex
    Sex,
    /// States with most withdrawals
    State,
    /// Withdrawals per age bracket
    Age,
    /// Origin channel by sex
    Origin,
    /// Withdrawals per family income bracket
    Income,
    /// Income bracket by reason
    Heatmap,
    /// Months above the peak threshold
    Peaks,
    /// Withdrawals per day
    Timeline,
    /// Headline numbers
    Overview,
}

impl View {
    pub const ALL: [View; 12] = [
        View::Overview,
        View::Monthly,
        View::Reason,
        View::Reasons,
        View::Sex,
        View::State,
        View::Age,
        View::Origin,
        View::Income,
        View::Heatmap,
        View::Peaks,
        View::Timeline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            View::Monthly => "monthly",
            View::Reason => "reason",
            View::Reasons => "reasons",
            View::Sex => "sex",
            View::State => "state",
            View::Age => "age",
            View::Origin => "origin",
            View::Income => "income",
            View::Heatmap => "heatmap",
            View::Peaks => "peaks",
            View::Timeline => "timeline",
            View::Overview => "overview",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Monthly => "Desistências por Mês/Ano",
            View::Reason => "Desistências por período por motivo",
            View::Reasons => "Motivos de desistência",
            View::Sex => "Desistências por período e sexo",
            View::State => "Estados com mais desistências",
            View::Age => "Desistências por faixa etária",
            View::Origin => "Origem dos alunos desistentes por sexo",
            View::Income => "Desistências por faixa de renda familiar",
            View::Heatmap => "Desistências por motivo e faixa de renda",
            View::Peaks => "Meses com picos de desistência",
            View::Timeline => "Linha do tempo das desistências",
            View::Overview => "Visão geral",
        }
    }

    /// Categories split out of the charted table by default
    pub fn default_excluded_categories(&self) -> Vec<String> {
        match self {
            View::Reason => vec![UNJUSTIFIED_REASON.to_string()],
            _ => Vec::new(),
        }
    }

    /// Months hidden from the charted table by default
    pub fn default_dropped_periods(&self) -> Vec<Period> {
        let months: &[(i32, u32)] = match self {
            View::Reason => &[(2022, 8), (2022, 12), (2023, 1)],
            View::Sex => &[
                (2022, 8),
                (2022, 12),
                (2023, 1),
                (2024, 8),
                (2024, 9),
                (2024, 10),
                (2024, 11),
            ],
            _ => &[],
        };
        months
            .iter()
            .filter_map(|&(y, m)| Period::new(y, m))
            .collect()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        View::ALL
            .iter()
            .copied()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = View::ALL.iter().map(|v| v.name()).collect();
                format!("unknown view '{}'. Options: {}", s, names.join(", "))
            })
    }
}

/// Caller-controlled knobs shared by every view
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub filter: RecordFilter,
    pub baseline: Period,
    pub label_style: LabelStyle,
    /// Overrides the view's default excluded categories
    pub excluded_categories: Option<Vec<String>>,
    /// Overrides the view's default dropped months
    pub dropped_periods: Option<Vec<Period>>,
    pub top: usize,
    pub peak_threshold: u64,
    pub peak_top: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            filter: RecordFilter::default(),
            baseline: default_baseline(),
            label_style: LabelStyle::default(),
            excluded_categories: None,
            dropped_periods: None,
            top: 10,
            peak_threshold: 25,
            peak_top: 2,
        }
    }
}

/// Result of running one view
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewOutput {
    Series { table: CountTable },
    Ranking {
        dimension: Dimension,
        counts: Vec<CategoryCount>,
    },
    Matrix { cross_tab: CrossTab },
    Peaks {
        threshold: u64,
        months: Vec<PeakMonth>,
    },
    Timeline { days: Vec<DailyCount> },
    Overview {
        overview: Overview,
        monthly: CountTable,
    },
}

impl View {
    /// True for views keyed by month
    pub fn is_time_series(&self) -> bool {
        matches!(self, View::Monthly | View::Reason | View::Sex | View::Overview)
    }

    /// Aggregation config for the month-keyed views
    pub fn aggregate_config(&self, settings: &ViewSettings) -> Option<AggregateConfig> {
        self.is_time_series().then(|| self.series_config(settings))
    }

    fn series_config(&self, settings: &ViewSettings) -> AggregateConfig {
        let (dimension, domain) = match self {
            View::Reason => (Some(Dimension::Reason), None),
            View::Sex => (
                Some(Dimension::Sex),
                Some(SEX_DOMAIN.iter().map(|s| s.to_string()).collect()),
            ),
            _ => (None, None),
        };

        // The overview shows the plain monthly series
        let (excluded_categories, dropped_periods) = if *self == View::Overview {
            (Vec::new(), Vec::new())
        } else {
            (
                settings
                    .excluded_categories
                    .clone()
                    .unwrap_or_else(|| self.default_excluded_categories()),
                settings
                    .dropped_periods
                    .clone()
                    .unwrap_or_else(|| self.default_dropped_periods()),
            )
        };

        AggregateConfig {
            filter: settings.filter.clone(),
            dimension,
            excluded_categories,
            category_domain: domain,
            baseline: settings.baseline,
            dropped_periods,
            label_style: settings.label_style,
        }
    }

    /// Run the view over loaded records
    pub fn run(&self, records: &[EnrollmentRecord], settings: &ViewSettings) -> ViewOutput {
        let filter = &settings.filter;
        match self {
            View::Monthly | View::Reason | View::Sex => ViewOutput::Series {
                table: aggregate(records, &self.series_config(settings)),
            },
            View::State => ViewOutput::Ranking {
                dimension: Dimension::State,
                counts: top_n(
                    &value_counts(records, filter, Dimension::State),
                    settings.top,
                ),
            },
            View::Reasons => ViewOutput::Ranking {
                dimension: Dimension::Reason,
                counts: value_counts(records, filter, Dimension::Reason),
            },
            View::Age => ViewOutput::Ranking {
                dimension: Dimension::AgeBracket,
                counts: value_counts(records, filter, Dimension::AgeBracket),
            },
            View::Income => ViewOutput::Ranking {
                dimension: Dimension::IncomeBracket,
                counts: value_counts(records, filter, Dimension::IncomeBracket),
            },
            View::Origin => ViewOutput::Matrix {
                cross_tab: cross_tab(records, filter, Dimension::Origin, Dimension::Sex, None),
            },
            View::Heatmap => {
                let brackets: Vec<String> = INCOME_BRACKETS.iter().map(|s| s.to_string()).collect();
                ViewOutput::Matrix {
                    cross_tab: cross_tab(
                        records,
                        filter,
                        Dimension::IncomeBracket,
                        Dimension::Reason,
                        Some(&brackets),
                    ),
                }
            }
            View::Peaks => ViewOutput::Peaks {
                threshold: settings.peak_threshold,
                months: peak_months(
                    records,
                    filter,
                    settings.peak_threshold,
                    settings.peak_top,
                    settings.label_style,
                ),
            },
            View::Timeline => ViewOutput::Timeline {
                days: daily_counts(records, filter),
            },
            View::Overview => ViewOutput::Overview {
                overview: overview(records, filter),
                monthly: aggregate(records, &self.series_config(settings)),
            },
        }
    }
}
