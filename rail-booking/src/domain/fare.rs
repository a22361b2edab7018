//! Travel classes and fares.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Error returned when parsing a travel class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown travel class: {0:?}")]
pub struct InvalidTravelClass(String);

/// Error returned when a fare amount is not a valid price.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid fare {0}: must be a finite, non-negative amount")]
pub struct InvalidFare(f64);

/// Seating class used for pricing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TravelClass {
    First,
    #[default]
    Second,
}

impl TravelClass {
    /// Lowercase name used in requests and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelClass::First => "first",
            TravelClass::Second => "second",
        }
    }
}

impl FromStr for TravelClass {
    type Err = InvalidTravelClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1st" | "1" | "first class" => Ok(TravelClass::First),
            "second" | "2nd" | "2" | "second class" => Ok(TravelClass::Second),
            _ => Err(InvalidTravelClass(s.to_string())),
        }
    }
}

impl fmt::Display for TravelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A price in minor currency units (cents).
///
/// Fares are stored as integers so that itinerary totals add up exactly.
///
/// # Examples
///
/// ```
/// use rail_booking::domain::Fare;
///
/// let a = Fare::from_decimal(49.0).unwrap();
/// let b = Fare::from_decimal(19.99).unwrap();
/// assert_eq!((a + b).to_string(), "68.99");
/// assert!(Fare::from_decimal(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fare(u64);

impl Fare {
    /// A zero fare.
    pub const ZERO: Fare = Fare(0);

    /// Create a fare from cents.
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create a fare from a decimal amount, rounding to the nearest cent.
    pub fn from_decimal(amount: f64) -> Result<Self, InvalidFare> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(InvalidFare(amount));
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(InvalidFare(amount));
        }
        Ok(Self(cents as u64))
    }

    /// Returns the amount in cents.
    pub fn cents(self) -> u64 {
        self.0
    }

    /// Returns the amount as a decimal, for display and JSON output.
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Fare {
    type Output = Fare;

    fn add(self, rhs: Fare) -> Fare {
        Fare(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Fare {
    fn sum<I: Iterator<Item = Fare>>(iter: I) -> Fare {
        iter.fold(Fare::ZERO, Add::add)
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
