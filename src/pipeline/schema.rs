//! Fixed enrollment-record schema
//!
//! The dynamic, string-keyed frame produced by the loader is checked once
//! here and turned into typed [`EnrollmentRecord`]s. Aggregation never looks
//! columns up by name.

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use super::canonical::{canonical_reason, categorize_income};
use super::dates::{coerce_date, DateValue};
use super::error::{PipelineError, PipelineResult};

pub const COL_STATUS: &str = "estágio";
pub const COL_WITHDRAWAL_DATE: &str = "data_de_desistência_do_curso";
pub const COL_REASON: &str = "motivo_da_desistência";
pub const COL_SEX: &str = "sexo";
pub const COL_STATE: &str = "estado";
pub const COL_FAMILY_INCOME: &str = "renda_familiar_mensal_aproximada";
pub const COL_ORIGIN: &str = "origem";
pub const COL_AGE_BRACKET: &str = "faixa_etária";
pub const COL_AGE: &str = "idade";

/// Columns a dataset must carry to be aggregated at all
pub const REQUIRED_COLUMNS: &[&str] = &[COL_STATUS, COL_WITHDRAWAL_DATE];

/// One row of the source dataset
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRecord {
    pub status: Option<String>,
    pub withdrawal_date: DateValue,
    /// Canonicalized
    pub withdrawal_reason: Option<String>,
    pub sex: Option<String>,
    pub state: Option<String>,
    /// Derived from the family income column
    pub income_bracket: Option<String>,
    pub origin_channel: Option<String>,
    pub age_bracket: Option<String>,
    pub age: Option<f64>,
}

impl EnrollmentRecord {
    /// A record with only the fields every view needs
    pub fn new(status: Option<&str>, withdrawal_date: Option<&str>) -> Self {
        Self {
            status: clean(status),
            withdrawal_date: coerce_date(withdrawal_date),
            withdrawal_reason: None,
            sex: None,
            state: None,
            income_bracket: None,
            origin_channel: None,
            age_bracket: None,
            age: None,
        }
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.withdrawal_reason = clean(Some(reason)).map(|r| canonical_reason(&r));
        self
    }

    pub fn with_sex(mut self, sex: &str) -> Self {
        self.sex = clean(Some(sex));
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = clean(Some(state));
        self
    }

    pub fn with_family_income(mut self, income: &str) -> Self {
        self.income_bracket = Some(categorize_income(Some(income)).to_string());
        self
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin_channel = clean(Some(origin));
        self
    }

    pub fn with_age_bracket(mut self, bracket: &str) -> Self {
        self.age_bracket = clean(Some(bracket));
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    /// Value of a categorical dimension
    pub fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Reason => self.withdrawal_reason.as_deref(),
            Dimension::Sex => self.sex.as_deref(),
            Dimension::State => self.state.as_deref(),
            Dimension::IncomeBracket => self.income_bracket.as_deref(),
            Dimension::Origin => self.origin_channel.as_deref(),
            Dimension::AgeBracket => self.age_bracket.as_deref(),
        }
    }
}

/// Secondary categorical dimensions available for cross-tabulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Reason,
    Sex,
    State,
    IncomeBracket,
    Origin,
    AgeBracket,
}

impl Dimension {
    /// Machine-readable name, used as the column name in exports
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Reason => "reason",
            Dimension::Sex => "sex",
            Dimension::State => "state",
            Dimension::IncomeBracket => "income_bracket",
            Dimension::Origin => "origin",
            Dimension::AgeBracket => "age_bracket",
        }
    }

    /// Display title for table headers
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Reason => "Motivo",
            Dimension::Sex => "Sexo",
            Dimension::State => "Estado",
            Dimension::IncomeBracket => "Faixa de renda",
            Dimension::Origin => "Origem",
            Dimension::AgeBracket => "Faixa etária",
        }
    }
}

/// Check the required columns and convert every row into a record
pub fn records_from_frame(df: &DataFrame) -> PipelineResult<Vec<EnrollmentRecord>> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !available.iter().any(|a| a == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::SchemaMismatch { missing, available });
    }

    let height = df.height();
    let status = text_column(df, COL_STATUS)?.unwrap_or_else(|| vec![None; height]);
    let dates = text_column(df, COL_WITHDRAWAL_DATE)?.unwrap_or_else(|| vec![None; height]);
    let reasons = text_column(df, COL_REASON)?;
    let sexes = text_column(df, COL_SEX)?;
    let states = text_column(df, COL_STATE)?;
    let incomes = text_column(df, COL_FAMILY_INCOME)?;
    let origins = text_column(df, COL_ORIGIN)?;
    let age_brackets = text_column(df, COL_AGE_BRACKET)?;
    let ages = text_column(df, COL_AGE)?;

    let records: Vec<EnrollmentRecord> = (0..height)
        .map(|i| {
            let at = |col: &Option<Vec<Option<String>>>| -> Option<String> {
                col.as_ref().and_then(|v| clean(v[i].as_deref()))
            };

            EnrollmentRecord {
                status: clean(status[i].as_deref()),
                withdrawal_date: coerce_date(dates[i].as_deref()),
                withdrawal_reason: at(&reasons).map(|r| canonical_reason(&r)),
                sex: at(&sexes),
                state: at(&states),
                income_bracket: incomes
                    .as_ref()
                    .map(|v| categorize_income(v[i].as_deref()).to_string()),
                origin_channel: at(&origins),
                age_bracket: at(&age_brackets),
                age: at(&ages).and_then(|a| a.replace(',', ".").parse::<f64>().ok()),
            }
        })
        .collect();

    info!(records = records.len(), "records extracted");
    Ok(records)
}

/// A column rendered as text, `None` when the column is absent
fn text_column(df: &DataFrame, name: &str) -> PipelineResult<Option<Vec<Option<String>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };
    let as_text = column.cast(&DataType::String)?;
    let values = as_text
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(Some(values))
}

/// Trim and drop empty values
fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
