//! Best-effort coercion of withdrawal dates
//!
//! Cells arrive as text: ISO dates, Brazilian `dd/mm/yyyy` dates, timestamps
//! rendered by polars, or raw Excel serial numbers. Anything else is kept as
//! [`DateValue::Unparseable`] so the filter can count it.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Largest serial Excel accepts (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Smallest serial accepted from text cells (1950-01-01). Below it a bare
/// number is more likely a year or an id than a date.
const MIN_TEXT_SERIAL: f64 = 18_264.0;

/// Outcome of coercing one date cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Parsed(NaiveDate),
    Missing,
    Unparseable(String),
}

impl DateValue {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Parsed(d) => Some(*d),
            _ => None,
        }
    }
}

/// Coerce an optional cell into a [`DateValue`]
pub fn coerce_date(raw: Option<&str>) -> DateValue {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DateValue::Missing;
    };

    match parse_date(raw) {
        Some(date) => DateValue::Parsed(date),
        None => DateValue::Unparseable(raw.to_string()),
    }
}

/// Parse a date string in any of the accepted layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }

    // Timestamps with offsets or odd fractional precision: the date prefix is enough
    if raw.len() > 10 && raw.is_char_boundary(10) {
        if let Ok(d) = NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d") {
            return Some(d);
        }
    }

    raw.parse::<f64>()
        .ok()
        .filter(|serial| *serial >= MIN_TEXT_SERIAL)
        .and_then(excel_serial_to_date)
}

/// Convert an Excel serial day number (1900 date system) to a date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    // Day 0 is 1899-12-30 once Excel's fictitious 1900-02-29 is accounted for
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}
