//! Shared test utilities and fixture generators

#![allow(dead_code)]

use dropstat::pipeline::EnrollmentRecord;
use polars::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub const WITHDREW: &str = "Desistiu";
pub const ENROLLED: &str = "Cursando";

/// A withdrawn student with a date and a reason
pub fn withdrawal(date: &str, reason: &str) -> EnrollmentRecord {
    EnrollmentRecord::new(Some(WITHDREW), Some(date)).with_reason(reason)
}

/// A withdrawn student with a date and a sex
pub fn withdrawal_by_sex(date: &str, sex: &str) -> EnrollmentRecord {
    EnrollmentRecord::new(Some(WITHDREW), Some(date)).with_sex(sex)
}

/// A student who did not withdraw
pub fn enrolled(date: &str, reason: &str) -> EnrollmentRecord {
    EnrollmentRecord::new(Some(ENROLLED), Some(date)).with_reason(reason)
}

/// Fully populated withdrawn student
pub fn full_record(
    date: &str,
    reason: &str,
    sex: &str,
    state: &str,
    income: &str,
    origin: &str,
    age: f64,
) -> EnrollmentRecord {
    EnrollmentRecord::new(Some(WITHDREW), Some(date))
        .with_reason(reason)
        .with_sex(sex)
        .with_state(state)
        .with_family_income(income)
        .with_origin(origin)
        .with_age(age)
}

/// A small mixed dataset covering every dimension
pub fn create_sample_records() -> Vec<EnrollmentRecord> {
    vec![
        full_record("2024-10-03", "Mudança de emprego", "Feminino", "SP", "800", "Instagram", 22.0),
        full_record("2024-10-20", "Motivos de saúde/pessoal", "Masculino", "SP", "R$ 1.500,00", "Indicação", 30.0),
        full_record("2024-11-02", "Motivos de sáude/pessoal", "Feminino", "RJ", "3000", "Instagram", 26.0),
        full_record("2024-12-15", "Evasão sem justificativa/sem retorno", "Feminino", "MG", "5000", "Site", 41.0),
        full_record("2025-01-08", "Mudança de emprego", "Não binário", "SP", "", "Instagram", 19.0),
        full_record("2026-01-08", "Mudança de emprego", "Masculino", "BA", "900", "Site", 35.0),
        enrolled("2024-11-10", "Mudança de emprego"),
    ]
}

/// Raw headers as they appear in the spreadsheet export
pub const RAW_HEADERS: &str = "Nome,Estágio,Data de desistência do curso,Motivo da desistência,Sexo,Estado,Renda familiar mensal aproximada,Origem,Faixa etária,Idade";

/// Write a CSV export with the raw (un-normalized) headers
pub fn write_raw_csv(dir: &TempDir, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", RAW_HEADERS).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    path
}

/// The three-row scenario: two withdrawals after the baseline, one non-withdrawal
pub fn write_three_row_csv(dir: &TempDir) -> PathBuf {
    write_raw_csv(
        dir,
        "alunos.csv",
        &[
            "Ana,Desistiu,05/11/2024,A,Feminino,SP,1500,Instagram,18-24,22",
            "Bia,Ativo,20/12/2024,B,Feminino,RJ,900,Site,25-34,30",
            "Caio,Desistência,20/12/2024,A,Masculino,SP,5000,Site,25-34,28",
        ],
    )
}

/// Frame with normalized headers, as the loader returns it
pub fn create_normalized_dataframe() -> DataFrame {
    df! {
        "estágio" => ["Desistiu", "Desistência", "Cursando", "Desistiu"],
        "data_de_desistência_do_curso" => [Some("2024-10-05"), Some("15/11/2024"), None, Some("não sei")],
        "motivo_da_desistência" => [Some("Motivos de saúde/pessoal."), Some("Mudança de emprego"), None, Some("Mudança de emprego")],
        "sexo" => [Some("Feminino"), Some(" Masculino "), Some(""), None],
        "renda_familiar_mensal_aproximada" => [Some("1.500"), Some("4500"), None, Some("abc")],
        "idade" => [Some(22i64), Some(31), None, Some(40)],
    }
    .unwrap()
}

/// Deterministic pseudo-random records for volume tests
pub fn create_large_record_set(rows: usize, seed: u64) -> Vec<EnrollmentRecord> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let reasons = ["Mudança de emprego", "Motivos de saúde/pessoal", "Financeiro"];
    let sexes = ["Feminino", "Masculino", "Não binário"];
    let mut rng = StdRng::seed_from_u64(seed);

    (0..rows)
        .map(|_| {
            let status = if rng.gen_bool(0.7) { WITHDREW } else { ENROLLED };
            let date = format!(
                "{:04}-{:02}-{:02}",
                rng.gen_range(2022..=2025),
                rng.gen_range(1..=12),
                rng.gen_range(1..=28)
            );
            EnrollmentRecord::new(Some(status), Some(&date))
                .with_reason(reasons[rng.gen_range(0..reasons.len())])
                .with_sex(sexes[rng.gen_range(0..sexes.len())])
        })
        .collect()
}
