//! Layover policy.
//!
//! Decides whether the wait between two consecutive legs is reasonable.
//! Daytime changes may be long; after-hours changes must be short because
//! stations may be closed or unstaffed overnight. The policy is a plain value:
//! the mode is chosen per search call with [`LayoverPolicy::with_mode`].

use std::fmt;
use std::str::FromStr;

use crate::domain::ClockTime;

/// How strictly to apply the maximum layover bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolicyMode {
    /// Enforce both minimum and maximum bounds
    #[default]
    Strict,
    /// Enforce only the minimum
    Lenient,
}

impl PolicyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyMode::Strict => "strict",
            PolicyMode::Lenient => "lenient",
        }
    }
}

/// Error returned when parsing an unknown policy mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layover policy mode: {0:?}")]
pub struct InvalidPolicyMode(String);

impl FromStr for PolicyMode {
    type Err = InvalidPolicyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PolicyMode::Strict),
            "lenient" => Ok(PolicyMode::Lenient),
            _ => Err(InvalidPolicyMode(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part of the day an arrival falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPeriod {
    Daytime,
    AfterHours,
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPeriod::Daytime => f.write_str("daytime"),
            DayPeriod::AfterHours => f.write_str("after-hours"),
        }
    }
}

/// Accepted layover range, in minutes. `max_minutes` of `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GapBounds {
    pub min_minutes: u32,
    pub max_minutes: Option<u32>,
}

/// Why a layover was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoverRejection {
    #[error("Layover too short: {gap} min (min: {min} min)")]
    TooShort { gap: u32, min: u32 },

    #[error("Layover too long: {gap} min (max: {max} min for {period})")]
    TooLong {
        gap: u32,
        max: u32,
        period: DayPeriod,
    },
}

/// A rejected transfer within a multi-leg connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Transfer {transfer}: {rejection}")]
pub struct ConnectionRejection {
    /// 1-based transfer number
    pub transfer: usize,
    pub rejection: LayoverRejection,
}

const DEFAULT_DAY_START: ClockTime = ClockTime::at(6, 0);
const DEFAULT_DAY_END: ClockTime = ClockTime::at(22, 0);

/// Time-of-day dependent layover bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoverPolicy {
    pub mode: PolicyMode,
    /// First minute of daytime (inclusive)
    pub day_start: ClockTime,
    /// End of daytime (exclusive)
    pub day_end: ClockTime,
    pub daytime: GapBounds,
    pub after_hours: GapBounds,
}

impl Default for LayoverPolicy {
    fn default() -> Self {
        Self {
            mode: PolicyMode::Strict,
            day_start: DEFAULT_DAY_START,
            day_end: DEFAULT_DAY_END,
            daytime: GapBounds {
                min_minutes: 15,
                max_minutes: Some(120),
            },
            after_hours: GapBounds {
                min_minutes: 15,
                max_minutes: Some(30),
            },
        }
    }
}

impl LayoverPolicy {
    /// The same bounds under a different mode.
    pub fn with_mode(&self, mode: PolicyMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    /// Classify an arrival time.
    pub fn period_of(&self, arrival: ClockTime) -> DayPeriod {
        let daytime = if self.day_start <= self.day_end {
            self.day_start <= arrival && arrival < self.day_end
        } else {
            arrival >= self.day_start || arrival < self.day_end
        };
        if daytime {
            DayPeriod::Daytime
        } else {
            DayPeriod::AfterHours
        }
    }

    /// Effective bounds for a period under the current mode.
    pub fn bounds(&self, period: DayPeriod) -> GapBounds {
        let configured = match period {
            DayPeriod::Daytime => self.daytime,
            DayPeriod::AfterHours => self.after_hours,
        };
        match self.mode {
            PolicyMode::Strict => configured,
            PolicyMode::Lenient => GapBounds {
                min_minutes: configured.min_minutes,
                max_minutes: None,
            },
        }
    }

    /// Check one layover, returning the gap in minutes when accepted.
    ///
    /// The gap wraps past midnight when `departure` is earlier than
    /// `arrival`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_booking::domain::ClockTime;
    /// use rail_booking::planner::{LayoverPolicy, PolicyMode};
    ///
    /// let policy = LayoverPolicy::default();
    /// let arrive = ClockTime::parse_hhmm("23:00").unwrap();
    /// let depart = ClockTime::parse_hhmm("23:45").unwrap();
    ///
    /// assert!(policy.evaluate(arrive, depart).is_err());
    /// assert_eq!(policy.with_mode(PolicyMode::Lenient).evaluate(arrive, depart), Ok(45));
    /// ```
    pub fn evaluate(
        &self,
        arrival: ClockTime,
        departure: ClockTime,
    ) -> Result<u32, LayoverRejection> {
        let gap = arrival.minutes_until(departure);
        let period = self.period_of(arrival);
        let bounds = self.bounds(period);

        if gap < bounds.min_minutes {
            return Err(LayoverRejection::TooShort {
                gap,
                min: bounds.min_minutes,
            });
        }
        if let Some(max) = bounds.max_minutes.filter(|max| gap > *max) {
            return Err(LayoverRejection::TooLong { gap, max, period });
        }
        Ok(gap)
    }

    /// Check every transfer of a connection, given as (arrival, departure)
    /// pairs in order. Reports the first failing transfer.
    pub fn check_connection(
        &self,
        transfers: &[(ClockTime, ClockTime)],
    ) -> Result<(), ConnectionRejection> {
        for (i, (arrival, departure)) in transfers.iter().enumerate() {
            self.evaluate(*arrival, *departure)
                .map_err(|rejection| ConnectionRejection {
                    transfer: i + 1,
                    rejection,
                })?;
        }
        Ok(())
    }

    /// Human-readable summary of the active bounds.
    pub fn describe(&self) -> String {
        let mode = match self.mode {
            PolicyMode::Strict => "Strict",
            PolicyMode::Lenient => "Lenient",
        };
        format!(
            "Layover Policy ({mode} Mode):\n- Daytime ({}-{}): {}\n- After-hours ({}-{}): {}\n",
            self.day_start,
            self.day_end,
            describe_bounds(self.bounds(DayPeriod::Daytime)),
            self.day_end,
            self.day_start,
            describe_bounds(self.bounds(DayPeriod::AfterHours)),
        )
    }
}

fn describe_bounds(bounds: GapBounds) -> String {
    match bounds.max_minutes {
        Some(max) => format!("{}-{max} minutes", bounds.min_minutes),
        None => format!("at least {} minutes", bounds.min_minutes),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn clock() -> impl Strategy<Value = ClockTime> {
        (0u32..1440).prop_map(|m| ClockTime::from_minutes(m).unwrap())
    }

    proptest! {
        /// Anything strict accepts, lenient accepts too
        #[test]
        fn lenient_is_superset(arr in clock(), dep in clock()) {
            let strict = LayoverPolicy::default();
            if strict.evaluate(arr, dep).is_ok() {
                prop_assert!(strict.with_mode(PolicyMode::Lenient).evaluate(arr, dep).is_ok());
            }
        }

        /// Accepted gaps always lie within the effective bounds
        #[test]
        fn accepted_within_bounds(arr in clock(), dep in clock()) {
            let policy = LayoverPolicy::default();
            if let Ok(gap) = policy.evaluate(arr, dep) {
                let bounds = policy.bounds(policy.period_of(arr));
                prop_assert!(gap >= bounds.min_minutes);
                prop_assert!(bounds.max_minutes.is_none_or(|max| gap <= max));
            }
        }

        /// Lenient mode rejects exactly the gaps under the minimum
        #[test]
        fn lenient_only_checks_minimum(arr in clock(), dep in clock()) {
            let policy = LayoverPolicy::default().with_mode(PolicyMode::Lenient);
            let gap = arr.minutes_until(dep);
            prop_assert_eq!(policy.evaluate(arr, dep).is_ok(), gap >= 15);
        }
    }
}
