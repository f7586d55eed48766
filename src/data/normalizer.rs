//! Normalizer Module
//! Turns the raw text table into typed absence records: header cleanup,
//! canonical column resolution and lenient date coercion.

use crate::data::record::{AbsenceRecord, AbsenceTable, SOURCE_COLUMNS};
use chrono::{NaiveDate, NaiveTime};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Expected at least {expected} columns, found {found}")]
    MissingColumns { expected: usize, found: usize },
}

/// Accepted header labels for each canonical field, lowercase.
const HEADER_ALIASES: [&[&str]; 6] = [
    &["data de envio", "carimbo de data/hora", "timestamp"],
    &["nome do funcionário", "nome do funcionario", "funcionário", "funcionario", "nome"],
    &["setor", "unidade", "setor/unidade"],
    &["data da falta", "data"],
    &["motivo", "motivo da falta"],
    &["observações", "observacoes", "observação", "observacao", "obs"],
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];
const SHORT_YEAR_FORMATS: [&str; 2] = ["%d/%m/%y", "%m/%d/%y"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Source column index for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub indices: [usize; 6],
    /// Canonical fields that had to be mapped by position.
    pub positional: Vec<&'static str>,
}

/// Resolve canonical fields against trimmed header labels.
///
/// Each field is matched by name first; a field with no matching header falls
/// back to its position among the first six columns. A source column is never
/// assigned to two fields: when that position is already taken, the field gets
/// the first column nobody claimed.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMapping, NormalizeError> {
    let expected = SOURCE_COLUMNS.len();
    let missing = || NormalizeError::MissingColumns {
        expected,
        found: headers.len(),
    };
    if headers.len() < expected {
        return Err(missing());
    }

    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut claimed = vec![false; lowered.len()];
    let mut by_name: [Option<usize>; 6] = [None; 6];

    // ===== Pass 1: header names =====
    for (field, aliases) in HEADER_ALIASES.iter().enumerate() {
        let canonical = SOURCE_COLUMNS[field].to_lowercase();
        let found = (0..lowered.len()).find(|&idx| {
            let h = lowered[idx].as_str();
            !claimed[idx] && (h == canonical || aliases.contains(&h))
        });
        if let Some(idx) = found {
            claimed[idx] = true;
            by_name[field] = Some(idx);
        }
    }

    // ===== Pass 2: own position, when still free =====
    let mut indices = by_name;
    for (field, slot) in indices.iter_mut().enumerate() {
        if slot.is_none() && !claimed[field] {
            claimed[field] = true;
            *slot = Some(field);
        }
    }

    // ===== Pass 3: first unclaimed column =====
    for slot in indices.iter_mut().filter(|s| s.is_none()) {
        let idx = claimed.iter().position(|c| !c).ok_or_else(missing)?;
        claimed[idx] = true;
        *slot = Some(idx);
    }

    let mut resolved = [0usize; 6];
    let mut positional = Vec::new();
    for field in 0..expected {
        if by_name[field].is_none() {
            positional.push(SOURCE_COLUMNS[field]);
        }
        resolved[field] = indices[field].ok_or_else(missing)?;
    }

    Ok(ColumnMapping {
        indices: resolved,
        positional,
    })
}

/// Parse an absence date leniently; anything unrecognised becomes `None`.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (date_part, time_part) = match raw.split_once([' ', 'T']) {
        Some((date, time)) => (date, Some(time.trim())),
        None => (raw, None),
    };

    if let Some(time) = time_part {
        let time_ok = TIME_FORMATS
            .iter()
            .any(|fmt| NaiveTime::parse_from_str(time, fmt).is_ok());
        if !time_ok {
            return None;
        }
    }

    let short_year = date_part
        .rsplit('/')
        .next()
        .is_some_and(|year| year.len() == 2);
    let formats: &[&str] = if short_year {
        &SHORT_YEAR_FORMATS
    } else {
        &DATE_FORMATS
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Converts the raw text table into an [`AbsenceTable`].
pub struct Normalizer;

impl Normalizer {
    pub fn normalize(df: &DataFrame) -> Result<AbsenceTable, NormalizeError> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        let mapping = resolve_columns(&headers)?;
        if !mapping.positional.is_empty() {
            warn!(
                fields = ?mapping.positional,
                "Columns not found by header name, mapped by position"
            );
        }

        let columns = df.get_columns();
        let mut texts: Vec<Vec<String>> = Vec::with_capacity(mapping.indices.len());
        for &idx in &mapping.indices {
            texts.push(Self::column_text(&columns[idx])?);
        }

        let mut unparsed_dates = 0usize;
        let records: Vec<AbsenceRecord> = (0..df.height())
            .map(|row| {
                let date_text = &texts[3][row];
                let absence_date = parse_date_lenient(date_text);
                if absence_date.is_none() && !date_text.trim().is_empty() {
                    unparsed_dates += 1;
                }
                AbsenceRecord::new(
                    texts[0][row].clone(),
                    texts[1][row].clone(),
                    texts[2][row].clone(),
                    absence_date,
                    texts[4][row].clone(),
                    texts[5][row].clone(),
                )
            })
            .collect();

        if unparsed_dates > 0 {
            warn!(count = unparsed_dates, "Absence dates could not be parsed");
        }
        debug!(rows = records.len(), "Normalized absence records");

        Ok(AbsenceTable::new(records))
    }

    /// Column values as text, nulls as the empty string.
    fn column_text(column: &Column) -> Result<Vec<String>, NormalizeError> {
        let series = column.as_materialized_series().cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect();
        Ok(values)
    }
}
