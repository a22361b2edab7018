//! Catalog leg identifiers.

use std::fmt;

/// Error returned when parsing an invalid leg identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid leg id: {reason}")]
pub struct InvalidLegId {
    reason: &'static str,
}

/// Separator between leg ids in an itinerary signature.
pub(crate) const SIGNATURE_SEPARATOR: char = '>';

/// A catalog route identifier.
///
/// Leg ids are opaque strings assigned by the catalog. They must be
/// non-empty, free of whitespace, and must not contain the `>` used to
/// join ids into an itinerary signature.
///
/// # Examples
///
/// ```
/// use rail_booking::domain::LegId;
///
/// let id = LegId::new("R101".to_string()).unwrap();
/// assert_eq!(id.as_str(), "R101");
///
/// assert!(LegId::new("".to_string()).is_err());
/// assert!(LegId::new("A>B".to_string()).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LegId(String);

impl LegId {
    /// Create a leg id from a string.
    pub fn new(s: String) -> Result<Self, InvalidLegId> {
        if s.is_empty() {
            return Err(InvalidLegId {
                reason: "leg id cannot be empty",
            });
        }
        if s.contains(SIGNATURE_SEPARATOR) {
            return Err(InvalidLegId {
                reason: "leg id cannot contain '>'",
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidLegId {
                reason: "leg id cannot contain whitespace",
            });
        }
        Ok(LegId(s))
    }

    /// Parse a leg id from a borrowed string.
    pub fn parse(s: &str) -> Result<Self, InvalidLegId> {
        Self::new(s.to_string())
    }

    /// Returns the leg id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LegId({})", self.0)
    }
}

impl fmt::Display for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
