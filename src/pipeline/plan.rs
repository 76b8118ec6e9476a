// src/pipeline/plan.rs

//! Date range planning.

use chrono::{Days, NaiveDate};

use crate::models::DateKey;

/// Inclusive range of calendar days, empty when `end < start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Number of days in the range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    /// Iterate the days in ascending order. Each call starts over.
    pub fn iter(&self) -> DateRangeIter {
        DateRangeIter {
            next: (!self.is_empty()).then_some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = DateKey;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DateRangeIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateRangeIter {
    type Item = DateKey;

    fn next(&mut self) -> Option<DateKey> {
        let current = self.next?;
        self.next = current
            .checked_add_days(Days::new(1))
            .filter(|next| *next <= self.end);
        Some(DateKey::new(current))
    }
}

/// Plan every day from `start` through `today`, both inclusive.
pub fn plan_dates(start: NaiveDate, today: NaiveDate) -> DateRange {
    DateRange::new(start, today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn keys(range: DateRange) -> Vec<String> {
        range.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_inclusive_both_ends() {
        let range = plan_dates(date(2025, 1, 1), date(2025, 1, 3));
        assert_eq!(keys(range), ["2025-01-01", "2025-01-02", "2025-01-03"]);
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn test_single_day() {
        let range = plan_dates(date(2025, 1, 1), date(2025, 1, 1));
        assert_eq!(keys(range), ["2025-01-01"]);
    }

    #[test]
    fn test_today_before_start_is_empty() {
        let range = plan_dates(date(2025, 1, 1), date(2024, 12, 31));
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn test_crosses_month_and_leap_day() {
        let range = plan_dates(date(2024, 2, 28), date(2024, 3, 1));
        assert_eq!(keys(range), ["2024-02-28", "2024-02-29", "2024-03-01"]);
    }

    #[test]
    fn test_restartable() {
        let range = plan_dates(date(2025, 1, 1), date(2025, 1, 10));
        let first: Vec<_> = range.iter().take(3).collect();
        let again: Vec<_> = range.iter().take(3).collect();
        assert_eq!(first, again);
        assert_eq!(range.into_iter().count(), 10);
    }
}
