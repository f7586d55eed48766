//! Filter module - viewer predicates over the absence table

mod window;

pub use window::{WindowPolicy, WindowWarning};

use crate::data::{AbsenceRecord, AbsenceTable};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Time predicate applied to the absence date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// No time restriction.
    #[default]
    All,
    /// Records whose derived year equals the given year.
    Year(i32),
    /// Records dated within `[start, end]`, inclusive.
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Records with a missing date only match [`Period::All`].
    pub fn matches(&self, record: &AbsenceRecord) -> bool {
        match *self {
            Period::All => true,
            Period::Year(year) => record.year == Some(year),
            Period::Range { start, end } => record
                .absence_date
                .is_some_and(|d| start <= d && d <= end),
        }
    }
}

/// Independently optional predicates, composed with AND.
/// An empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub employees: BTreeSet<String>,
    pub sectors: BTreeSet<String>,
    pub reasons: BTreeSet<String>,
    pub period: Period,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
            && self.sectors.is_empty()
            && self.reasons.is_empty()
            && self.period == Period::All
    }

    pub fn matches(&self, record: &AbsenceRecord) -> bool {
        Self::in_set(&self.employees, &record.employee)
            && Self::in_set(&self.sectors, &record.sector)
            && Self::in_set(&self.reasons, &record.reason)
            && self.period.matches(record)
    }

    /// Produce the filtered view as a new table, preserving record order.
    pub fn apply(&self, table: &AbsenceTable) -> AbsenceTable {
        table.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// The selected employee, when exactly one is selected.
    pub fn single_employee(&self) -> Option<&str> {
        if self.employees.len() == 1 {
            self.employees.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    fn in_set(set: &BTreeSet<String>, value: &str) -> bool {
        set.is_empty() || set.contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Summary;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(employee: &str, sector: &str, reason: &str, d: Option<NaiveDate>) -> AbsenceRecord {
        AbsenceRecord::new("", employee, sector, d, reason, "")
    }

    fn sample_table() -> AbsenceTable {
        vec![
            rec("Ana", "A", "Doença", Some(date(2024, 1, 1))),
            rec("Bia", "B", "Consulta", Some(date(2024, 1, 15))),
            rec("Ana", "A", "Consulta", Some(date(2024, 2, 1))),
            rec("Caio", "A", "Doença", Some(date(2024, 2, 10))),
            rec("Bia", "B", "Doença", Some(date(2024, 3, 1))),
            rec("Caio", "A", "Luto", None),
            rec("Duda", "B", "Consulta", Some(date(2023, 12, 20))),
        ]
        .into_iter()
        .collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_returns_full_table() {
        let table = sample_table();
        let filters = FilterSet::new();

        assert!(filters.is_empty());
        assert_eq!(filters.apply(&table), table);
    }

    #[test]
    fn test_filter_by_sector_example() {
        let table = sample_table();
        let filters = FilterSet {
            sectors: set(&["A"]),
            ..FilterSet::default()
        };

        let result = filters.apply(&table);
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|r| r.sector == "A"));

        let summary = Summary::from_table(&result);
        assert_eq!(summary.total, result.len());
        assert_eq!(summary.employees, 2); // Ana, Caio
        assert_eq!(summary.sectors, 1);
    }

    #[test]
    fn test_active_predicates_are_all_satisfied() {
        let table = sample_table();
        let filters = FilterSet {
            employees: set(&["Ana", "Bia"]),
            sectors: set(&["A", "B"]),
            reasons: set(&["Doença"]),
            period: Period::Range {
                start: date(2024, 1, 1),
                end: date(2024, 2, 28),
            },
        };

        let result = filters.apply(&table);
        assert_eq!(result.len(), 1);
        for r in &result {
            assert!(filters.employees.contains(&r.employee));
            assert!(filters.sectors.contains(&r.sector));
            assert!(filters.reasons.contains(&r.reason));
            assert!(filters.period.matches(r));
        }
    }

    #[test]
    fn test_year_filter_excludes_missing_dates() {
        let table = sample_table();
        let filters = FilterSet {
            period: Period::Year(2024),
            ..FilterSet::default()
        };

        let result = filters.apply(&table);
        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|r| r.year == Some(2024)));
    }

    #[test]
    fn test_range_is_inclusive() {
        let table = sample_table();
        let filters = FilterSet {
            period: Period::Range {
                start: date(2024, 1, 15),
                end: date(2024, 3, 1),
            },
            ..FilterSet::default()
        };

        let result = filters.apply(&table);
        let dates: Vec<NaiveDate> = result.iter().filter_map(|r| r.absence_date).collect();
        assert_eq!(result.len(), 4);
        assert_eq!(dates.first(), Some(&date(2024, 1, 15)));
        assert_eq!(dates.last(), Some(&date(2024, 3, 1)));
    }

    #[test]
    fn test_single_employee_detection() {
        let mut filters = FilterSet::new();
        assert_eq!(filters.single_employee(), None);

        filters.employees.insert("Ana".to_string());
        assert_eq!(filters.single_employee(), Some("Ana"));

        filters.employees.insert("Bia".to_string());
        assert_eq!(filters.single_employee(), None);
    }
}
