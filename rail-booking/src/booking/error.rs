//! Booking errors.

use crate::domain::{DomainError, ItinerarySignature, NaturalKey};
use crate::store::StoreError;

/// A business rule that stops a booking before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("a booking needs at least one traveler")]
    NoTravelers,

    /// Traveler `index` (0-based) failed validation.
    #[error("traveler {index}: {source}")]
    InvalidTraveler { index: usize, source: DomainError },

    #[error("traveler {key} appears more than once in the request")]
    DuplicateTraveler { key: NaturalKey },

    #[error("{key} already holds a ticket for itinerary {signature}")]
    DuplicateBooking {
        key: NaturalKey,
        signature: ItinerarySignature,
    },
}

/// Error from the booking engine.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// The request broke a business rule; nothing was written.
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    /// The store failed; the transaction was rolled back.
    #[error("booking store failure: {0}")]
    Persistence(#[source] StoreError),
}

impl BookingError {
    /// Whether the same request might succeed if retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::Precondition(_) => false,
            BookingError::Persistence(e) => e.is_retryable(),
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateBooking { key, signature } => {
                PreconditionViolation::DuplicateBooking { key, signature }.into()
            }
            other => BookingError::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_duplicate_becomes_precondition() {
        let err: BookingError = StoreError::DuplicateBooking {
            key: NaturalKey::new("Smith", "PASS001"),
            signature: "R1".parse().unwrap(),
        }
        .into();

        assert!(matches!(
            err,
            BookingError::Precondition(PreconditionViolation::DuplicateBooking { .. })
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn other_store_errors_are_persistence() {
        let err: BookingError = StoreError::Migration("boom".to_string()).into();
        assert!(matches!(err, BookingError::Persistence(_)));
        assert_eq!(err.to_string(), "booking store failure: migration error: boom");
    }

    #[test]
    fn invalid_traveler_display() {
        let err = PreconditionViolation::InvalidTraveler {
            index: 1,
            source: DomainError::NegativeAge(-3),
        };
        assert!(err.to_string().starts_with("traveler 1: "));
    }
}
