//! Weekly operating patterns for catalog legs.

use std::fmt;

use chrono::Weekday;

/// Error returned when parsing an operating-days pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid operating days {input:?}: {reason}")]
pub struct InvalidOperatingDays {
    input: String,
    reason: &'static str,
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// The set of weekdays a leg runs on.
///
/// Parsed from timetable patterns such as "Daily", "Mon-Fri", "Sat,Sun" or
/// "Mon,Wed-Fri". Day names are matched case-insensitively and may be given
/// in full.
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use rail_booking::domain::OperatingDays;
///
/// let days = OperatingDays::parse("Mon-Fri").unwrap();
/// assert!(days.contains(Weekday::Wed));
/// assert!(!days.contains(Weekday::Sat));
/// assert_eq!(days.to_string(), "Mon,Tue,Wed,Thu,Fri");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatingDays(u8);

impl OperatingDays {
    /// Every day of the week.
    pub const DAILY: OperatingDays = OperatingDays(0b111_1111);

    /// Parse a pattern of day names, ranges and commas.
    pub fn parse(s: &str) -> Result<Self, InvalidOperatingDays> {
        let err = |reason| InvalidOperatingDays {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(err("pattern cannot be empty"));
        }
        if trimmed.eq_ignore_ascii_case("daily") {
            return Ok(Self::DAILY);
        }

        let mut bits = 0u8;
        for part in trimmed.split(',') {
            let part = part.trim();
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_weekday(start).ok_or_else(|| err("unknown day name"))?;
                    let end = parse_weekday(end).ok_or_else(|| err("unknown day name"))?;
                    let mut day = start;
                    loop {
                        bits |= bit(day);
                        if day == end {
                            break;
                        }
                        day = day.succ();
                    }
                }
                None => {
                    let day = parse_weekday(part).ok_or_else(|| err("unknown day name"))?;
                    bits |= bit(day);
                }
            }
        }

        Ok(Self(bits))
    }

    /// Returns true if the leg runs on `day`.
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    /// Iterate over the days in the set, Monday first.
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        WEEK.into_iter().filter(move |d| self.contains(*d))
    }
}

impl Default for OperatingDays {
    fn default() -> Self {
        Self::DAILY
    }
}

impl fmt::Debug for OperatingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperatingDays({self})")
    }
}

impl fmt::Display for OperatingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::DAILY {
            return f.write_str("Daily");
        }
        for (i, day) in self.days().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{day}")?;
        }
        Ok(())
    }
}

/// Parse a day name such as "mon", "Tue" or "Wednesday".
///
/// Used both for operating patterns and for the search day filter.
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse().ok()
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}
