//! Inclusion predicates for time-series aggregation

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use super::canonical::WITHDRAWAL_STATUSES;
use super::dates::DateValue;
use super::schema::EnrollmentRecord;

/// Sentinel year observed as a placeholder in the source data
pub const DEFAULT_EXCLUDED_YEAR: i32 = 2026;

/// Why a record did not contribute to a count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Status is not a withdrawal status
    Status,
    /// No withdrawal date at all
    MissingDate,
    /// Date present but not coercible
    FieldCoercion,
    /// Date falls in the excluded sentinel year
    ExcludedYear,
    /// Grouped dimension has no value
    MissingDimension,
    /// Grouped dimension value is outside the view's fixed domain
    OutsideDomain,
}

/// Status / sentinel-year / parseable-date predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub statuses: Vec<String>,
    pub excluded_year: Option<i32>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            statuses: WITHDRAWAL_STATUSES.iter().map(|s| s.to_string()).collect(),
            excluded_year: Some(DEFAULT_EXCLUDED_YEAR),
        }
    }
}

impl RecordFilter {
    /// True when the record's status marks a withdrawal
    pub fn admits_status(&self, record: &EnrollmentRecord) -> bool {
        record
            .status
            .as_deref()
            .is_some_and(|s| self.statuses.iter().any(|allowed| allowed == s))
    }

    /// The record's withdrawal date when it passes every predicate
    pub fn admit(&self, record: &EnrollmentRecord) -> Result<NaiveDate, SkipReason> {
        if !self.admits_status(record) {
            return Err(SkipReason::Status);
        }

        let date = match &record.withdrawal_date {
            DateValue::Parsed(d) => *d,
            DateValue::Missing => return Err(SkipReason::MissingDate),
            DateValue::Unparseable(raw) => {
                debug!(value = %raw, "withdrawal date could not be parsed, row skipped");
                return Err(SkipReason::FieldCoercion);
            }
        };

        if self.excluded_year == Some(date.year()) {
            return Err(SkipReason::ExcludedYear);
        }

        Ok(date)
    }
}

/// Counts of records seen, admitted and skipped by reason
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub considered: u64,
    pub counted: u64,
    pub skipped_status: u64,
    pub skipped_missing_date: u64,
    pub skipped_coercion: u64,
    pub skipped_excluded_year: u64,
    pub skipped_missing_dimension: u64,
    pub skipped_outside_domain: u64,
}

impl FilterStats {
    pub fn record_counted(&mut self) {
        self.considered += 1;
        self.counted += 1;
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        self.considered += 1;
        match reason {
            SkipReason::Status => self.skipped_status += 1,
            SkipReason::MissingDate => self.skipped_missing_date += 1,
            SkipReason::FieldCoercion => self.skipped_coercion += 1,
            SkipReason::ExcludedYear => self.skipped_excluded_year += 1,
            SkipReason::MissingDimension => self.skipped_missing_dimension += 1,
            SkipReason::OutsideDomain => self.skipped_outside_domain += 1,
        }
    }

    pub fn skipped(&self) -> u64 {
        self.considered - self.counted
    }
}
