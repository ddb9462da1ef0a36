// src/months.rs

use chrono::{Datelike, Months, NaiveDate};

/// Iterator over first-of-month dates from `start`'s month through `end`, inclusive.
///
/// The start date is truncated to day 1, so `2023-01-15..=2023-01-20` yields
/// `2023-01-01` once. A start after the end yields nothing.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl MonthRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            next: start.with_day(1),
            end,
        }
    }
}

impl Iterator for MonthRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|month| *month <= self.end)?;
        self.next = current.checked_add_months(Months::new(1));
        Some(current)
    }
}
