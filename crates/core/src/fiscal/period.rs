//! Monthly fiscal periods.
//!
//! A period is identified by its `YYYY-MM` key. Periods nobody has touched
//! are open; closing and reopening only flips a flag.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// A `YYYY-MM` period key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Builds a key, validating the month.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a month outside 1..=12 or a year outside 1..=9999.
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(LedgerError::Validation(format!(
                "invalid fiscal period {year:04}-{month:02}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month component, 1-based.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Whether `date` falls inside this period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::Validation(format!("invalid fiscal period key: {s}"));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lock state of a fiscal period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriodState {
    /// Period key.
    pub period_key: PeriodKey,
    /// Whether postings into the period are rejected.
    pub is_closed: bool,
    /// Who closed it. Cleared on reopen.
    pub closed_by: Option<String>,
    /// When it was closed. Cleared on reopen.
    pub closed_at: Option<DateTime<Utc>>,
}

impl FiscalPeriodState {
    /// State of a period nobody has closed.
    #[must_use]
    pub fn open(period_key: PeriodKey) -> Self {
        Self {
            period_key,
            is_closed: false,
            closed_by: None,
            closed_at: None,
        }
    }

    /// Rejects postings into a closed period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodLocked` when closed.
    pub fn ensure_open(&self) -> Result<(), LedgerError> {
        if self.is_closed {
            return Err(LedgerError::PeriodLocked(self.period_key.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_key_of_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let key = PeriodKey::of(date);
        assert_eq!(key.to_string(), "2026-01");
        assert!(key.contains(date));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
    }

    #[rstest]
    #[case("2026-01", 2026, 1)]
    #[case("1999-12", 1999, 12)]
    fn test_parse_valid(#[case] input: &str, #[case] year: i32, #[case] month: u32) {
        let key: PeriodKey = input.parse().unwrap();
        assert_eq!((key.year(), key.month()), (year, month));
        assert_eq!(key.to_string(), input);
    }

    #[rstest]
    #[case("2026-13")]
    #[case("2026-00")]
    #[case("2026-1")]
    #[case("26-01")]
    #[case("2026/01")]
    #[case("")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(matches!(
            input.parse::<PeriodKey>(),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_ordering() {
        let a: PeriodKey = "2025-12".parse().unwrap();
        let b: PeriodKey = "2026-01".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_ensure_open() {
        let key: PeriodKey = "2026-01".parse().unwrap();
        let mut state = FiscalPeriodState::open(key);
        assert!(state.ensure_open().is_ok());

        state.is_closed = true;
        assert_eq!(
            state.ensure_open(),
            Err(LedgerError::PeriodLocked("2026-01".into()))
        );
    }
}
