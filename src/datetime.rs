//! Calendar date-time values used by `#...#` literals.

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConversionError;

static ISO_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("static pattern is valid")
});

static US_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?: (\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("static pattern is valid")
});

/// A date and wall-clock time with second precision and no time zone.
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub fn date(year: i32, month: u8, day: u8) -> Option<Self> {
        Self::new(year, month, day, 0, 0, 0)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Parses the content of a date literal.
    ///
    /// Accepted shapes: `yyyy-mm-dd`, `yyyy-mm-dd hh:mm[:ss]`,
    /// `yyyy-mm-ddThh:mm[:ss]` and `mm/dd/yyyy [hh:mm[:ss]]`.
    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        let trimmed = text.trim();
        let invalid = || ConversionError::InvalidDateTime(text.to_string());

        let (year, month, day, time) = if let Some(caps) = ISO_FORMAT.captures(trimmed) {
            (
                number(caps.get(1))?,
                number(caps.get(2))?,
                number(caps.get(3))?,
                (caps.get(4), caps.get(5), caps.get(6)),
            )
        } else if let Some(caps) = US_FORMAT.captures(trimmed) {
            (
                number(caps.get(3))?,
                number(caps.get(1))?,
                number(caps.get(2))?,
                (caps.get(4), caps.get(5), caps.get(6)),
            )
        } else {
            return Err(invalid());
        };

        let hour = number(time.0)?;
        let minute = number(time.1)?;
        let second = number(time.2)?;

        let narrow = |n: u32| u8::try_from(n).map_err(|_| invalid());
        let year = i32::try_from(year).map_err(|_| invalid())?;

        DateTime::new(
            year,
            narrow(month)?,
            narrow(day)?,
            narrow(hour)?,
            narrow(minute)?,
            narrow(second)?,
        )
        .ok_or_else(invalid)
    }
}

fn number(m: Option<regex::Match<'_>>) -> Result<u32, ConversionError> {
    match m {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| ConversionError::InvalidDateTime(m.as_str().to_string())),
        None => Ok(0),
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

impl FromStr for DateTime {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse(s)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let dt = DateTime::parse("2024-02-29").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 2, 29));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn parses_iso_date_time() {
        let dt = DateTime::parse("2023-07-04T18:30:15").unwrap();
        assert_eq!(dt.to_string(), "2023-07-04 18:30:15");

        let dt = DateTime::parse("2023-07-04 08:05").unwrap();
        assert_eq!(dt.to_string(), "2023-07-04 08:05:00");
    }

    #[test]
    fn parses_us_date() {
        let dt = DateTime::parse("12/31/1999 23:59:59").unwrap();
        assert_eq!(dt.to_string(), "1999-12-31 23:59:59");
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(DateTime::parse("2023-02-29").is_err());
        assert!(DateTime::parse("1900-02-29").is_err());
        assert!(DateTime::parse("2023-13-01").is_err());
        assert!(DateTime::parse("2023-01-01 24:00").is_err());
        assert!(DateTime::parse("yesterday").is_err());
    }

    #[test]
    fn orders_chronologically() {
        let earlier = DateTime::parse("2020-01-01 10:00").unwrap();
        let later = DateTime::parse("2020-01-01 10:01").unwrap();
        assert!(earlier < later);
    }
}
