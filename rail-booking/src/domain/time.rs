//! Timetable clock times.
//!
//! Catalog legs give times as "HH:MM" minute-of-day values. A leg that runs
//! past midnight arrives on a later day than it departs, which timetables
//! mark either explicitly with a "(+1d)" suffix or implicitly by an arrival
//! that is numerically earlier than the departure. This module provides the
//! minute-of-day type and the wrap-around arithmetic used for durations and
//! transfer gaps.

use std::fmt;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A minute of the day on a timetable, from 00:00 to 23:59.
///
/// `ClockTime` carries no date. Arithmetic that needs to cross midnight
/// goes through [`ClockTime::minutes_until`], which always looks forward.
///
/// # Examples
///
/// ```
/// use rail_booking::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(t.minute_of_day(), 14 * 60 + 30);
/// assert_eq!(t.to_string(), "14:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Create a time from constant components.
    ///
    /// Intended for compile-time constants; panics if out of range.
    pub const fn at(hour: u16, minute: u16) -> Self {
        assert!(hour < 24 && minute < 60, "clock time out of range");
        Self(hour * 60 + minute)
    }

    /// Create a time from minutes since midnight.
    ///
    /// Returns an error if `minutes` is not below [`MINUTES_PER_DAY`].
    pub fn from_minutes(minutes: u32) -> Result<Self, TimeError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(TimeError::new("minute of day must be below 1440"));
        }
        Ok(Self(minutes as u16))
    }

    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Parse a time from "HH:MM" (or "H:MM") format.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_booking::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("8:05").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("1430").is_err());
    /// assert!(ClockTime::parse_hhmm("14:3").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        if hour.is_empty() || hour.len() > 2 {
            return Err(TimeError::new("expected one or two hour digits"));
        }
        if minute.len() != 2 {
            return Err(TimeError::new("expected two minute digits"));
        }

        let hour = parse_digits(hour).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute =
            parse_digits(minute).ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::from_hm(hour, minute)
    }

    /// Returns minutes since midnight (0-1439).
    pub fn minute_of_day(self) -> u32 {
        u32::from(self.0)
    }

    /// Returns the hour (0-23).
    pub fn hour(self) -> u32 {
        self.minute_of_day() / 60
    }

    /// Returns the minute (0-59).
    pub fn minute(self) -> u32 {
        self.minute_of_day() % 60
    }

    /// Minutes from `self` forward to the next occurrence of `later`.
    ///
    /// When `later` is numerically earlier than `self` the interval wraps
    /// across midnight. Equal times give zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_booking::domain::ClockTime;
    ///
    /// let arrive = ClockTime::parse_hhmm("23:50").unwrap();
    /// let depart = ClockTime::parse_hhmm("00:10").unwrap();
    /// assert_eq!(arrive.minutes_until(depart), 20);
    /// ```
    pub fn minutes_until(self, later: ClockTime) -> u32 {
        let from = self.minute_of_day();
        let to = later.minute_of_day();
        if to >= from {
            to - from
        } else {
            to + MINUTES_PER_DAY - from
        }
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse a timetable time with an optional explicit day offset.
///
/// Accepts "HH:MM", "HH:MM (+1d)" and "HH:MM(+2d)". The returned offset is
/// `None` when the string carries no suffix, so callers can tell an explicit
/// "(+0d)" from an absent one.
///
/// # Examples
///
/// ```
/// use rail_booking::domain::{ClockTime, parse_timetable_time};
///
/// let (time, offset) = parse_timetable_time("06:15 (+1d)").unwrap();
/// assert_eq!(time, ClockTime::parse_hhmm("06:15").unwrap());
/// assert_eq!(offset, Some(1));
///
/// let (_, offset) = parse_timetable_time("06:15").unwrap();
/// assert_eq!(offset, None);
/// ```
pub fn parse_timetable_time(s: &str) -> Result<(ClockTime, Option<u8>), TimeError> {
    let s = s.trim();

    let Some(open) = s.find('(') else {
        return Ok((ClockTime::parse_hhmm(s)?, None));
    };

    let suffix = s[open..]
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| TimeError::new("unterminated day offset"))?;
    let days = suffix
        .trim()
        .strip_prefix('+')
        .and_then(|rest| rest.trim_end().strip_suffix('d'))
        .ok_or_else(|| TimeError::new("day offset must look like (+1d)"))?;
    let days = parse_digits(days.trim()).ok_or_else(|| TimeError::new("invalid day offset"))?;
    let days = u8::try_from(days).map_err(|_| TimeError::new("day offset too large"))?;

    let time = ClockTime::parse_hhmm(s[..open].trim_end())?;
    Ok((time, Some(days)))
}

/// Parse a short run of ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        let time = t("00:00");
        assert_eq!(time.hour(), 0);
        assert_eq!(time.minute(), 0);

        let time = t("23:59");
        assert_eq!(time.hour(), 23);
        assert_eq!(time.minute(), 59);

        let time = t("8:30");
        assert_eq!(time.minute_of_day(), 510);
    }

    #[test]
    fn parse_invalid_format() {
        assert!(ClockTime::parse_hhmm("1430").is_err());
        assert!(ClockTime::parse_hhmm("14:3").is_err());
        assert!(ClockTime::parse_hhmm("14:300").is_err());
        assert!(ClockTime::parse_hhmm("14-30").is_err());
        assert!(ClockTime::parse_hhmm("ab:cd").is_err());
        assert!(ClockTime::parse_hhmm(":30").is_err());
        assert!(ClockTime::parse_hhmm("").is_err());
    }

    #[test]
    fn parse_invalid_values() {
        assert!(ClockTime::parse_hhmm("24:00").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::from_minutes(1440).is_err());
    }

    #[test]
    fn display_format() {
        assert_eq!(t("9:05").to_string(), "09:05");
        assert_eq!(t("23:59").to_string(), "23:59");
        assert_eq!(format!("{:?}", t("07:00")), "ClockTime(07:00)");
    }

    #[test]
    fn minutes_until_same_day() {
        assert_eq!(t("16:45").minutes_until(t("18:00")), 75);
        assert_eq!(t("10:00").minutes_until(t("10:00")), 0);
    }

    #[test]
    fn minutes_until_wraps_midnight() {
        assert_eq!(t("23:00").minutes_until(t("00:15")), 75);
        assert_eq!(t("18:00").minutes_until(t("17:59")), 1439);
    }

    #[test]
    fn timetable_time_with_offsets() {
        assert_eq!(parse_timetable_time("08:00").unwrap(), (t("08:00"), None));
        assert_eq!(
            parse_timetable_time("08:00 (+1d)").unwrap(),
            (t("08:00"), Some(1))
        );
        assert_eq!(
            parse_timetable_time("8:00(+2d)").unwrap(),
            (t("08:00"), Some(2))
        );
        assert_eq!(
            parse_timetable_time(" 08:00 ( +1d ) ").unwrap(),
            (t("08:00"), Some(1))
        );
    }

    #[test]
    fn timetable_time_rejects_bad_offsets() {
        assert!(parse_timetable_time("08:00 (+1").is_err());
        assert!(parse_timetable_time("08:00 (1d)").is_err());
        assert!(parse_timetable_time("08:00 (+xd)").is_err());
        assert!(parse_timetable_time("08:00 (+999d)").is_err());
        assert!(parse_timetable_time("(+1d)").is_err());
    }
}
