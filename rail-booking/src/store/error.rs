//! Store errors.

use rusqlite::ErrorCode;

use crate::domain::{ItinerarySignature, LegId, NaturalKey};

/// Error from the booking store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    /// A live ticket already links this client to this itinerary.
    #[error("{key} already holds a ticket for itinerary {signature}")]
    DuplicateBooking {
        key: NaturalKey,
        signature: ItinerarySignature,
    },

    /// A trip referenced a leg that is not in the routes table.
    #[error("route {0} is not in the store")]
    UnknownRoute(LegId),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Whether retrying the same operation later might succeed.
    ///
    /// True for pool checkout timeouts and for SQLite lock contention.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Pool(_) => true,
            StoreError::Sqlite(e) => matches!(
                e.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

/// Whether `e` is a UNIQUE violation mentioning `column`.
pub(crate) fn is_unique_violation(e: &rusqlite::Error, column: &str) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, Some(msg)) => {
            err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE && msg.contains(column)
        }
        _ => false,
    }
}

/// Whether `e` is a FOREIGN KEY violation.
pub(crate) fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => {
            err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_booking_display() {
        let err = StoreError::DuplicateBooking {
            key: NaturalKey::new("Smith", "PASS001"),
            signature: "R1>R2".parse().unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "smith/PASS001 already holds a ticket for itinerary R1>R2"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn busy_is_retryable() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(StoreError::Sqlite(busy).is_retryable());
        assert!(!StoreError::Corrupt("bad".to_string()).is_retryable());
    }

    #[test]
    fn classifies_constraint_failures() {
        let unique = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: tickets.client_id, tickets.itinerary_signature".into()),
        );
        assert!(is_unique_violation(&unique, "itinerary_signature"));
        assert!(!is_unique_violation(&unique, "last_name_key"));
        assert!(!is_foreign_key_violation(&unique));

        let fk = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            Some("FOREIGN KEY constraint failed".into()),
        );
        assert!(is_foreign_key_violation(&fk));
    }
}
