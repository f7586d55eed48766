//! Date Window Policy
//! Default range and span limit for the start/end date filter.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const DEFAULT_WINDOW_DAYS: i64 = 30;
pub const MAX_WINDOW_DAYS: i64 = 365;

/// Display-time policy for the date range picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPolicy {
    pub default_days: i64,
    pub max_days: i64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            default_days: DEFAULT_WINDOW_DAYS,
            max_days: MAX_WINDOW_DAYS,
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowWarning {
    SpanTooLong { requested_days: i64, max_days: i64 },
}

impl fmt::Display for WindowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowWarning::SpanTooLong {
                requested_days,
                max_days,
            } => write!(
                f,
                "O período selecionado tem {} dias; o máximo é {} dias. \
                 A data inicial foi ajustada.",
                requested_days, max_days
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedWindow {
    pub window: DateWindow,
    pub warning: Option<WindowWarning>,
}

impl WindowPolicy {
    /// Last `default_days` of data, never starting before the earliest date.
    pub fn default_window(&self, earliest: NaiveDate, latest: NaiveDate) -> DateWindow {
        let (earliest, latest) = ordered(earliest, latest);
        let start = TimeDelta::try_days(self.default_days)
            .and_then(|span| latest.checked_sub_signed(span))
            .map_or(earliest, |d| d.max(earliest));
        DateWindow { start, end: latest }
    }

    /// Clamp a requested range into the data bounds and the span limit.
    ///
    /// Both ends are kept within `[earliest, latest]`. A span longer than
    /// `max_days` pulls the start forward to `end - max_days`.
    pub fn clamp(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        bounds: (NaiveDate, NaiveDate),
    ) -> ClampedWindow {
        let (earliest, latest) = ordered(bounds.0, bounds.1);
        let (start, end) = ordered(
            start.clamp(earliest, latest),
            end.clamp(earliest, latest),
        );

        let mut window = DateWindow { start, end };
        let mut warning = None;

        let requested_days = window.span_days();
        if requested_days > self.max_days {
            window.start = TimeDelta::try_days(self.max_days)
                .and_then(|span| end.checked_sub_signed(span))
                .unwrap_or(start);
            warn!(
                requested_days,
                max_days = self.max_days,
                start = %window.start,
                "Date range too long, start date pulled forward"
            );
            warning = Some(WindowWarning::SpanTooLong {
                requested_days,
                max_days: self.max_days,
            });
        }

        ClampedWindow { window, warning }
    }
}

fn ordered(a: NaiveDate, b: NaiveDate) -> (NaiveDate, NaiveDate) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_is_last_30_days() {
        let policy = WindowPolicy::default();
        let window = policy.default_window(date(2023, 1, 1), date(2024, 3, 31));

        assert_eq!(window.start, date(2024, 3, 1));
        assert_eq!(window.end, date(2024, 3, 31));
    }

    #[test]
    fn test_default_window_never_precedes_earliest() {
        let policy = WindowPolicy::default();
        let window = policy.default_window(date(2024, 3, 20), date(2024, 3, 31));

        assert_eq!(window.start, date(2024, 3, 20));
        assert_eq!(window.end, date(2024, 3, 31));
    }

    #[test]
    fn test_huge_day_counts_do_not_overflow() {
        let policy = WindowPolicy {
            default_days: 200_000_000_000_000,
            max_days: MAX_WINDOW_DAYS,
        };
        let window = policy.default_window(date(2024, 1, 1), date(2024, 3, 31));

        assert_eq!(window.start, date(2024, 1, 1));
        assert_eq!(window.end, date(2024, 3, 31));
    }

    #[test]
    fn test_clamp_long_span_pulls_start_forward() {
        let policy = WindowPolicy::default();
        let bounds = (date(2020, 1, 1), date(2024, 12, 31));
        let clamped = policy.clamp(date(2022, 1, 1), date(2024, 6, 30), bounds);

        assert_eq!(clamped.window.end, date(2024, 6, 30));
        assert_eq!(clamped.window.span_days(), MAX_WINDOW_DAYS);
        assert!(clamped.window.span_days() <= MAX_WINDOW_DAYS);
        assert!(matches!(
            clamped.warning,
            Some(WindowWarning::SpanTooLong { max_days: 365, .. })
        ));
    }

    #[test]
    fn test_clamp_keeps_short_span_and_bounds() {
        let policy = WindowPolicy::default();
        let bounds = (date(2024, 1, 1), date(2024, 3, 1));

        let clamped = policy.clamp(date(2023, 6, 1), date(2024, 12, 1), bounds);
        assert_eq!(clamped.window.start, date(2024, 1, 1));
        assert_eq!(clamped.window.end, date(2024, 3, 1));
        assert_eq!(clamped.warning, None);
    }

    #[test]
    fn test_clamp_reorders_reversed_range() {
        let policy = WindowPolicy::default();
        let bounds = (date(2024, 1, 1), date(2024, 3, 1));
        let clamped = policy.clamp(date(2024, 2, 10), date(2024, 1, 10), bounds);

        assert_eq!(clamped.window.start, date(2024, 1, 10));
        assert_eq!(clamped.window.end, date(2024, 2, 10));
    }

    #[test]
    fn test_exactly_max_span_is_allowed() {
        let policy = WindowPolicy::default();
        let bounds = (date(2023, 1, 1), date(2024, 12, 31));
        let clamped = policy.clamp(date(2023, 1, 1), date(2024, 1, 1), bounds);

        assert_eq!(clamped.window.span_days(), 365);
        assert_eq!(clamped.warning, None);
        assert_eq!(clamped.window.start, date(2023, 1, 1));
    }
}
