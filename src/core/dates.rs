//! Date handling for stored `DD/MM/YYYY` values and month periods.
//!
//! Every date in the sheets is text in `DD/MM/YYYY`. Anything that groups or sorts
//! by date goes through [`parse_date`] so a malformed cell fails loudly instead of
//! landing in the wrong month.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Storage format of every date cell
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a `DD/MM/YYYY` date.
///
/// # Errors
/// Returns [`Error::MalformedDate`] for anything else, including impossible dates
/// such as `31/02/2025`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let well_formed = trimmed.len() == 10
        && trimmed
            .char_indices()
            .all(|(i, c)| if i == 2 || i == 5 { c == '/' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(Error::MalformedDate {
            value: value.to_string(),
        });
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| Error::MalformedDate {
        value: value.to_string(),
    })
}

/// Formats a date for storage.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A calendar month, shown as `M/YYYY` (e.g. `3/2025`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    /// Calendar year
    pub year: i32,
    /// Month, 1-12
    pub month: u32,
}

impl Period {
    /// Month a date falls in.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Whether `date` falls in this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    /// Parses `M/YYYY` or `MM/YYYY`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedDate`] when the text is not a valid month.
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = || Error::MalformedDate {
            value: value.to_string(),
        };
        let (month, year) = value.trim().split_once('/').ok_or_else(malformed)?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) || year.to_string().len() != 4 {
            return Err(malformed());
        }
        Ok(Self { year, month })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

/// Distinct months present in `dates`, newest first.
///
/// # Errors
/// Fails on the first malformed date rather than skipping it.
pub fn available_periods<'a, I>(dates: I) -> Result<Vec<Period>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut periods = dates
        .into_iter()
        .map(|d| parse_date(d).map(Period::of))
        .collect::<Result<Vec<_>>>()?;
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();
    Ok(periods)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_and_format_round_trip() {
        let date = parse_date("05/01/2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(format_date(date), "05/01/2025");
    }

    #[test]
    fn test_parse_date_rejects_malformed_input() {
        for bad in ["2025-01-05", "5/1/2025", "31/02/2025", "", "aa/bb/cccc", "05/01/25"] {
            assert!(
                matches!(parse_date(bad), Err(Error::MalformedDate { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_period_display_and_parse() {
        let period = Period::of(parse_date("10/03/2025").unwrap());
        assert_eq!(period.to_string(), "3/2025");
        assert_eq!(Period::parse("3/2025").unwrap(), period);
        assert_eq!(Period::parse("03/2025").unwrap(), period);
        assert!(Period::parse("13/2025").is_err());
        assert!(Period::parse("march").is_err());
    }

    #[test]
    fn test_available_periods_newest_first() {
        let dates = ["05/01/2025", "20/12/2024", "07/01/2025", "01/03/2025"];
        let periods = available_periods(dates).unwrap();
        let shown: Vec<String> = periods.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["3/2025", "1/2025", "12/2024"]);
    }

    #[test]
    fn test_available_periods_fails_on_malformed_date() {
        let result = available_periods(["05/01/2025", "2025-01-07"]);
        assert!(matches!(result, Err(Error::MalformedDate { .. })));
    }
}
