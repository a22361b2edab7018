//! Location names.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Error returned when parsing an invalid location name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location: {reason}")]
pub struct InvalidLocation {
    reason: &'static str,
}

/// Longest accepted location name, in characters.
const MAX_LOCATION_LEN: usize = 80;

/// A city or station served by the catalog.
///
/// Locations compare case-insensitively, so "Paris" and "PARIS" are the same
/// place. The first spelling seen is kept for display.
///
/// # Examples
///
/// ```
/// use rail_booking::domain::Location;
///
/// let paris = Location::parse("Paris").unwrap();
/// assert_eq!(paris, Location::parse("  paris ").unwrap());
/// assert_eq!(paris.as_str(), "Paris");
///
/// assert!(Location::parse("").is_err());
/// assert!(Location::parse("   ").is_err());
/// ```
#[derive(Clone)]
pub struct Location {
    name: String,
    key: String,
}

impl Location {
    /// Parse a location name, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidLocation> {
        let name = s.trim();

        if name.is_empty() {
            return Err(InvalidLocation {
                reason: "name cannot be empty",
            });
        }
        if name.chars().count() > MAX_LOCATION_LEN {
            return Err(InvalidLocation {
                reason: "name is too long",
            });
        }
        if name.chars().any(char::is_control) {
            return Err(InvalidLocation {
                reason: "name cannot contain control characters",
            });
        }

        Ok(Self {
            name: name.to_string(),
            key: name.to_lowercase(),
        })
    }

    /// Returns the display name.
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({})", self.name)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_names() {
        assert!(Location::parse("Paris").is_ok());
        assert!(Location::parse("Frankfurt am Main").is_ok());
        assert!(Location::parse("Zürich").is_ok());
    }

    #[test]
    fn reject_empty_and_control() {
        assert!(Location::parse("").is_err());
        assert!(Location::parse(" \t ").is_err());
        assert!(Location::parse("Pa\nris").is_err());
        assert!(Location::parse(&"x".repeat(81)).is_err());
    }

    #[test]
    fn equality_ignores_case() {
        let a = Location::parse("Berlin").unwrap();
        let b = Location::parse("BERLIN").unwrap();
        let c = Location::parse("Prague").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unicode_case_folding() {
        let a = Location::parse("ZÜRICH").unwrap();
        let b = Location::parse("zürich").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hash_consistent_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Location::parse("Paris").unwrap());
        assert!(set.contains(&Location::parse("paris").unwrap()));
        assert!(!set.contains(&Location::parse("Lyon").unwrap()));
    }

    #[test]
    fn display_keeps_spelling() {
        let loc = Location::parse("  Den Haag ").unwrap();
        assert_eq!(loc.to_string(), "Den Haag");
        assert_eq!(format!("{loc:?}"), "Location(Den Haag)");
    }
}
