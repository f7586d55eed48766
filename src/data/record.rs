//! Absence Record Module
//! The single entity of the dashboard and the flat table that holds it.

use chrono::{Datelike, Month, NaiveDate};
use std::collections::HashSet;

/// Canonical column names, in source order.
pub const COL_SUBMITTED_AT: &str = "Data de Envio";
pub const COL_EMPLOYEE: &str = "Nome do Funcionário";
pub const COL_SECTOR: &str = "Setor";
pub const COL_ABSENCE_DATE: &str = "Data da Falta";
pub const COL_REASON: &str = "Motivo";
pub const COL_NOTE: &str = "Observações";

/// Derived columns.
pub const COL_YEAR: &str = "Ano";
pub const COL_MONTH: &str = "Mês";

/// The six source columns, in positional order.
pub const SOURCE_COLUMNS: [&str; 6] = [
    COL_SUBMITTED_AT,
    COL_EMPLOYEE,
    COL_SECTOR,
    COL_ABSENCE_DATE,
    COL_REASON,
    COL_NOTE,
];

/// Every column of the table view and of exports.
pub const ALL_COLUMNS: [&str; 8] = [
    COL_SUBMITTED_AT,
    COL_EMPLOYEE,
    COL_SECTOR,
    COL_ABSENCE_DATE,
    COL_REASON,
    COL_NOTE,
    COL_YEAR,
    COL_MONTH,
];

/// One reported employee absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceRecord {
    pub submitted_at: String,
    pub employee: String,
    pub sector: String,
    pub absence_date: Option<NaiveDate>,
    pub reason: String,
    pub note: String,
    pub year: Option<i32>,
    pub month: Option<String>,
}

impl AbsenceRecord {
    /// Build a record, deriving year and month name from the absence date.
    pub fn new(
        submitted_at: impl Into<String>,
        employee: impl Into<String>,
        sector: impl Into<String>,
        absence_date: Option<NaiveDate>,
        reason: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            submitted_at: submitted_at.into(),
            employee: employee.into(),
            sector: sector.into(),
            absence_date,
            reason: reason.into(),
            note: note.into(),
            year: absence_date.map(|d| d.year()),
            month: absence_date.and_then(month_name),
        }
    }

    /// Cell text for a column of [`ALL_COLUMNS`], as shown in the table and exports.
    pub fn cell(&self, column: &str) -> String {
        match column {
            COL_SUBMITTED_AT => self.submitted_at.clone(),
            COL_EMPLOYEE => self.employee.clone(),
            COL_SECTOR => self.sector.clone(),
            COL_ABSENCE_DATE => self.date_text(),
            COL_REASON => self.reason.clone(),
            COL_NOTE => self.note.clone(),
            COL_YEAR => self.year.map(|y| y.to_string()).unwrap_or_default(),
            COL_MONTH => self.month.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Absence date formatted as ISO `YYYY-MM-DD`, empty when missing.
    pub fn date_text(&self) -> String {
        self.absence_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// English month name for a date (e.g. "March").
pub fn month_name(date: NaiveDate) -> Option<String> {
    let month = Month::try_from(u8::try_from(date.month()).ok()?).ok()?;
    Some(month.name().to_string())
}

/// Calendar position (1-12) of an English month name.
pub fn month_number(name: &str) -> Option<u32> {
    name.parse::<Month>().ok().map(|m| m.number_from_month())
}

/// Flat ordered collection of absence records with a uniform schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsenceTable {
    records: Vec<AbsenceRecord>,
}

impl AbsenceTable {
    pub fn new(records: Vec<AbsenceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AbsenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AbsenceRecord> {
        self.records.iter()
    }

    /// Distinct employee names, in first-appearance order.
    pub fn unique_employees(&self) -> Vec<String> {
        Self::unique_by(&self.records, |r| &r.employee)
    }

    /// Distinct sectors, in first-appearance order.
    pub fn unique_sectors(&self) -> Vec<String> {
        Self::unique_by(&self.records, |r| &r.sector)
    }

    /// Distinct reasons, in first-appearance order.
    pub fn unique_reasons(&self) -> Vec<String> {
        Self::unique_by(&self.records, |r| &r.reason)
    }

    /// Distinct years present in the table, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().filter_map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Earliest and latest absence dates, or `None` if no record has a date.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.absence_date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    fn unique_by<F>(records: &[AbsenceRecord], key: F) -> Vec<String>
    where
        F: Fn(&AbsenceRecord) -> &String,
    {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for record in records {
            let value = key(record);
            if !value.is_empty() && seen.insert(value.as_str()) {
                values.push(value.clone());
            }
        }
        values
    }
}

impl FromIterator<AbsenceRecord> for AbsenceTable {
    fn from_iter<I: IntoIterator<Item = AbsenceRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AbsenceTable {
    type Item = &'a AbsenceRecord;
    type IntoIter = std::slice::Iter<'a, AbsenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_derived_fields() {
        let rec = AbsenceRecord::new("ts", "Ana", "A", date(2024, 3, 15), "Doença", "");
        assert_eq!(rec.year, Some(2024));
        assert_eq!(rec.month.as_deref(), Some("March"));

        let missing = AbsenceRecord::new("ts", "Ana", "A", None, "Doença", "");
        assert_eq!(missing.year, None);
        assert_eq!(missing.month, None);
        assert_eq!(missing.cell(COL_ABSENCE_DATE), "");
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("January"), Some(1));
        assert_eq!(month_number("December"), Some(12));
        assert_eq!(month_number("Smarch"), None);
    }

    #[test]
    fn test_unique_values_keep_first_appearance() {
        let table: AbsenceTable = vec![
            AbsenceRecord::new("", "Bia", "B", None, "x", ""),
            AbsenceRecord::new("", "Ana", "A", None, "y", ""),
            AbsenceRecord::new("", "Bia", "A", None, "x", ""),
            AbsenceRecord::new("", "", "", None, "", ""),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.unique_employees(), vec!["Bia", "Ana"]);
        assert_eq!(table.unique_sectors(), vec!["B", "A"]);
        assert_eq!(table.unique_reasons(), vec!["x", "y"]);
    }

    #[test]
    fn test_years_and_bounds() {
        let table: AbsenceTable = vec![
            AbsenceRecord::new("", "a", "A", date(2024, 5, 1), "", ""),
            AbsenceRecord::new("", "b", "A", None, "", ""),
            AbsenceRecord::new("", "c", "A", date(2023, 12, 31), "", ""),
            AbsenceRecord::new("", "d", "A", date(2024, 1, 2), "", ""),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.years(), vec![2023, 2024]);
        assert_eq!(
            table.date_bounds(),
            Some((date(2023, 12, 31).unwrap(), date(2024, 5, 1).unwrap()))
        );
        assert_eq!(AbsenceTable::default().date_bounds(), None);
    }
}
