//! Canonical category labels
//!
//! Merges are explicit lookup tables. Nothing here does fuzzy matching: a
//! variant is merged only when it is listed.

/// Status values that mark a withdrawal
pub const WITHDRAWAL_STATUSES: &[&str] = &["Desistiu", "Desistência"];

/// Reason reported as a separate total instead of being charted
pub const UNJUSTIFIED_REASON: &str = "Evasão sem justificativa/sem retorno";

/// Label used when a value is missing or cannot be categorized
pub const NOT_INFORMED: &str = "Não informado";

/// Known spellings of withdrawal reasons and their canonical label
const REASON_SYNONYMS: &[(&str, &str)] = &[
    ("Motivos de sáude/pessoal", "Motivos de saúde/pessoal"),
    ("Motivos de saúde/pessoal.", "Motivos de saúde/pessoal"),
];

pub const INCOME_UP_TO_1000: &str = "Até R$1.000";
pub const INCOME_1001_TO_2000: &str = "R$1.001 - R$2.000";
pub const INCOME_2001_TO_4000: &str = "R$2.001 - R$4.000";
pub const INCOME_ABOVE_4000: &str = "Acima de R$4.000";

/// Income brackets in ascending order, excluding [`NOT_INFORMED`]
pub const INCOME_BRACKETS: &[&str] = &[
    INCOME_UP_TO_1000,
    INCOME_1001_TO_2000,
    INCOME_2001_TO_4000,
    INCOME_ABOVE_4000,
];

/// Sex categories charted by the per-period sex view
pub const SEX_DOMAIN: &[&str] = &["Feminino", "Masculino", "Não binário"];

/// Map a withdrawal reason onto its canonical label
pub fn canonical_reason(raw: &str) -> String {
    let trimmed = raw.trim();
    REASON_SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == trimmed)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Categorize a raw monthly income cell into a bracket label
///
/// Accepts plain numbers (`1500`, `1500.5`) and Brazilian currency text
/// (`R$ 1.500,00`, `1.500`).
pub fn categorize_income(raw: Option<&str>) -> &'static str {
    let Some(amount) = raw.and_then(parse_income) else {
        return NOT_INFORMED;
    };

    if amount <= 1000 {
        INCOME_UP_TO_1000
    } else if amount <= 2000 {
        INCOME_1001_TO_2000
    } else if amount <= 4000 {
        INCOME_2001_TO_4000
    } else {
        INCOME_ABOVE_4000
    }
}

/// Integer amount of an income cell, `None` when it is not a number
fn parse_income(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let integer_part = if let Some((int, _cents)) = cleaned.split_once(',') {
        // 1.500,00
        int.replace('.', "")
    } else if is_dot_grouped(&cleaned) {
        // 1.500 or 12.000.000
        cleaned.replace('.', "")
    } else {
        let value: f64 = cleaned.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        return Some(value.trunc() as i64);
    };

    integer_part.parse().ok()
}

/// True for `1.500`, `12.000.000`: digit groups of three after the first dot
fn is_dot_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let Some(head) = groups.next() else {
        return false;
    };
    let rest: Vec<&str> = groups.collect();
    !rest.is_empty()
        && (1..=3).contains(&head.len())
        && head.chars().all(|c| c.is_ascii_digit())
        && rest
            .iter()
            .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}
