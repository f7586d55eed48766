//! Summary Statistics Module
//! Headline counts, grouped counts for the histograms and the per-employee chronology.

use crate::data::{month_number, AbsenceRecord, AbsenceTable};
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Headline metrics of the filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of matching records.
    pub total: usize,
    /// Distinct employee names.
    pub employees: usize,
    /// Distinct sectors.
    pub sectors: usize,
}

impl Summary {
    pub fn from_table(table: &AbsenceTable) -> Self {
        let employees: HashSet<&str> = table
            .iter()
            .map(|r| r.employee.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        let sectors: HashSet<&str> = table
            .iter()
            .map(|r| r.sector.as_str())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            total: table.len(),
            employees: employees.len(),
            sectors: sectors.len(),
        }
    }
}

/// Record counts per (category, series) pair, e.g. reason by sector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedCounts {
    /// X-axis categories, in display order.
    pub categories: Vec<String>,
    /// Stacked series (sectors), in first-appearance order.
    pub series: Vec<String>,
    counts: HashMap<(String, String), usize>,
}

impl GroupedCounts {
    /// Count records by category and series. Records with no or an empty
    /// category are skipped; categories keep first-appearance order.
    pub fn build<C, S>(table: &AbsenceTable, category: C, series: S) -> Self
    where
        C: Fn(&AbsenceRecord) -> Option<&str>,
        S: Fn(&AbsenceRecord) -> &str,
    {
        let mut grouped = Self::default();
        for record in table {
            let Some(cat) = category(record).filter(|c| !c.is_empty()) else {
                continue;
            };
            let ser = series(record);

            if !grouped.categories.iter().any(|c| c == cat) {
                grouped.categories.push(cat.to_string());
            }
            if !grouped.series.iter().any(|s| s == ser) {
                grouped.series.push(ser.to_string());
            }
            *grouped
                .counts
                .entry((cat.to_string(), ser.to_string()))
                .or_default() += 1;
        }
        grouped
    }

    /// Absences per reason, stacked by sector.
    pub fn by_reason_and_sector(table: &AbsenceTable) -> Self {
        Self::build(table, |r| Some(r.reason.as_str()), |r| r.sector.as_str())
    }

    /// Absences per month, stacked by sector. Months are in calendar order.
    pub fn by_month_and_sector(table: &AbsenceTable) -> Self {
        let mut grouped = Self::build(table, |r| r.month.as_deref(), |r| r.sector.as_str());
        grouped
            .categories
            .sort_by_key(|m| month_number(m).unwrap_or(u32::MAX));
        grouped
    }

    pub fn count(&self, category: &str, series: &str) -> usize {
        self.counts
            .get(&(category.to_string(), series.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Height of a category's stacked bar.
    pub fn category_total(&self, category: &str) -> usize {
        self.series.iter().map(|s| self.count(category, s)).sum()
    }

    pub fn max_category_total(&self) -> usize {
        self.categories
            .iter()
            .map(|c| self.category_total(c))
            .max()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// One absence in an employee's chronology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub date: Option<NaiveDate>,
    pub reason: String,
    pub note: String,
}

/// Absences of a single employee, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeTimeline {
    pub employee: String,
    pub entries: Vec<TimelineEntry>,
}

impl EmployeeTimeline {
    /// Entries sorted descending by date; undated entries go last.
    pub fn for_employee(table: &AbsenceTable, employee: &str) -> Self {
        let mut entries: Vec<TimelineEntry> = table
            .iter()
            .filter(|r| r.employee == employee)
            .map(|r| TimelineEntry {
                date: r.absence_date,
                reason: r.reason.clone(),
                note: r.note.clone(),
            })
            .collect();
        entries.sort_by_key(|e| Reverse(e.date));

        Self {
            employee: employee.to_string(),
            entries,
        }
    }
}
