//! Travelers and their identity.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::DomainError;

/// The identity that makes two traveler records the same person.
///
/// Last names compare case-insensitively; external ids (passport or
/// state id numbers) compare exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    last_name: String,
    external_id: String,
}

impl NaturalKey {
    pub fn new(last_name: &str, external_id: &str) -> Self {
        Self {
            last_name: last_name.trim().to_lowercase(),
            external_id: external_id.trim().to_string(),
        }
    }

    /// Case-folded last name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.last_name, self.external_id)
    }
}

/// A validated traveler.
///
/// Equality and hashing follow the [`NaturalKey`], so the same person
/// entered twice with different first-name spelling is still a duplicate.
#[derive(Debug, Clone)]
pub struct Client {
    first_name: String,
    last_name: String,
    external_id: String,
    age: u32,
    key: NaturalKey,
}

impl Client {
    /// Validate and construct a client.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a name or the external id is blank, or the age is
    /// negative.
    pub fn new(
        first_name: &str,
        last_name: &str,
        external_id: &str,
        age: i64,
    ) -> Result<Self, DomainError> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        let external_id = external_id.trim();

        if first_name.is_empty() || last_name.is_empty() {
            return Err(DomainError::InvalidTraveler("names cannot be empty"));
        }
        if external_id.is_empty() {
            return Err(DomainError::InvalidTraveler("id number cannot be empty"));
        }
        if age < 0 {
            return Err(DomainError::NegativeAge(age));
        }
        let age =
            u32::try_from(age).map_err(|_| DomainError::InvalidTraveler("age is out of range"))?;

        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            external_id: external_id.to_string(),
            age,
            key: NaturalKey::new(last_name, external_id),
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn natural_key(&self) -> &NaturalKey {
        &self.key
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Client {}

impl Hash for Client {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Unvalidated traveler details as supplied with a booking request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct TravelerInput {
    pub first_name: String,
    pub last_name: String,
    pub external_id: String,
    pub age: i64,
}

impl TravelerInput {
    pub fn new(first_name: &str, last_name: &str, external_id: &str, age: i64) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            external_id: external_id.to_string(),
            age,
        }
    }

    /// Validate into a [`Client`].
    pub fn to_client(&self) -> Result<Client, DomainError> {
        Client::new(
            &self.first_name,
            &self.last_name,
            &self.external_id,
            self.age,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_client() {
        let c = Client::new(" Ada ", "Lovelace", "P-1", 36).unwrap();
        assert_eq!(c.first_name(), "Ada");
        assert_eq!(c.age(), 36);
        assert_eq!(c.natural_key().to_string(), "lovelace/P-1");
    }

    #[test]
    fn zero_age_accepted() {
        assert!(Client::new("Baby", "Smith", "X1", 0).is_ok());
    }

    #[test]
    fn rejects_invalid_fields() {
        assert_eq!(
            Client::new("A", "B", "C", -1).unwrap_err(),
            DomainError::NegativeAge(-1)
        );
        assert!(matches!(
            Client::new("", "B", "C", 1),
            Err(DomainError::InvalidTraveler(_))
        ));
        assert!(matches!(
            Client::new("A", "  ", "C", 1),
            Err(DomainError::InvalidTraveler(_))
        ));
        assert!(matches!(
            Client::new("A", "B", "", 1),
            Err(DomainError::InvalidTraveler(_))
        ));
    }

    #[test]
    fn identity_by_natural_key() {
        let a = Client::new("John", "Smith", "ID1", 30).unwrap();
        let b = Client::new("Johnny", "SMITH", "ID1", 31).unwrap();
        let c = Client::new("John", "Smith", "id1", 30).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn input_converts() {
        let input = TravelerInput::new("Jane", "Doe", "D9", 28);
        let client = input.to_client().unwrap();
        assert_eq!(client.natural_key(), &NaturalKey::new("doe", "D9"));
    }
}
