//! Year-month period keys and their localized labels
//!
//! A [`Period`] orders chronologically. Labels such as `"Janeiro/25"` are for
//! display only and must never be used as a sort key.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use super::error::PipelineError;

const MONTHS_FULL: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// How a period is rendered for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    /// `Outubro/24`
    #[default]
    Full,
    /// `Out/24`
    Short,
}

/// A calendar month, the bucket every time series is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

/// October 2024
pub const DEFAULT_BASELINE: Period = Period {
    year: 2024,
    month: 10,
};

impl Period {
    /// Create a period, returning `None` when `month` is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Truncate a date to its month
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month immediately after this one
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The month `n` months before this one
    pub fn months_before(&self, n: u32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 - n as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Every month from `start` to `end` inclusive. Empty when `start > end`.
    pub fn range_inclusive(start: Period, end: Period) -> Vec<Period> {
        let mut periods = Vec::new();
        let mut current = start;
        while current <= end {
            periods.push(current);
            current = current.succ();
        }
        periods
    }

    /// Localized "Month/YY" label
    pub fn label(&self, style: LabelStyle) -> String {
        let idx = (self.month - 1) as usize;
        let name = match style {
            LabelStyle::Full => MONTHS_FULL[idx],
            LabelStyle::Short => MONTHS_SHORT[idx],
        };
        format!("{}/{:02}", name, self.year.rem_euclid(100))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PipelineError;

    /// Parse `YYYY-MM` (also accepts `YYYY/MM`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PipelineError::InvalidPeriod(s.to_string());
        let (year, month) = s
            .trim()
            .split_once(['-', '/'])
            .ok_or_else(invalid)?;
        if year.len() != 4 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
