use sea_orm::{DbErr, TransactionError};

/// The kind of record an error refers to. Used by outer layers to compose
/// messages such as "Venue 'X' could not be listed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Venue,
    Artist,
    Show,
    Genre,
    Lookup,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Venue => "Venue",
            EntityKind::Artist => "Artist",
            EntityKind::Show => "Show",
            EntityKind::Genre => "Genre",
            EntityKind::Lookup => "Lookup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("{entity} {field} is invalid: {message}")]
    Validation {
        entity: EntityKind,
        field: &'static str,
        message: String,
    },
    #[error("{entity} {key} not found")]
    NotFound { entity: EntityKind, key: String },
    #[error("{entity} {id} is still referenced by {shows} show(s)")]
    ReferentialIntegrity {
        entity: EntityKind,
        id: i64,
        shows: u64,
    },
    #[error("Database transaction failed: {0}")]
    Transaction(#[from] DbErr),
}

impl BookingError {
    pub fn validation(entity: EntityKind, field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: EntityKind, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Stable machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::Validation { .. } => "VALIDATION",
            BookingError::NotFound { .. } => "NOT_FOUND",
            BookingError::ReferentialIntegrity { .. } => "REFERENTIAL_INTEGRITY",
            BookingError::Transaction(_) => "TRANSACTION",
        }
    }

    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            BookingError::Validation { entity, .. }
            | BookingError::NotFound { entity, .. }
            | BookingError::ReferentialIntegrity { entity, .. } => Some(*entity),
            BookingError::Transaction(_) => None,
        }
    }
}

impl From<TransactionError<BookingError>> for BookingError {
    fn from(err: TransactionError<BookingError>) -> Self {
        match err {
            TransactionError::Connection(e) => BookingError::Transaction(e),
            TransactionError::Transaction(e) => e,
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_entity() {
        let err = BookingError::not_found(EntityKind::Artist, 42);
        assert_eq!(err.kind(), "NOT_FOUND");
        assert_eq!(err.entity(), Some(EntityKind::Artist));
        assert_eq!(err.to_string(), "Artist 42 not found");

        let err = BookingError::Transaction(DbErr::Custom("boom".into()));
        assert_eq!(err.kind(), "TRANSACTION");
        assert_eq!(err.entity(), None);
    }

    #[test]
    fn test_transaction_error_unwraps_inner() {
        let inner = BookingError::validation(EntityKind::Venue, "name", "is required");
        let err: BookingError = TransactionError::Transaction(inner).into();
        assert!(matches!(
            err,
            BookingError::Validation {
                entity: EntityKind::Venue,
                field: "name",
                ..
            }
        ));

        let err: BookingError =
            TransactionError::<BookingError>::Connection(DbErr::Custom("gone".into())).into();
        assert!(matches!(err, BookingError::Transaction(_)));
    }

    #[test]
    fn test_referential_integrity_message() {
        let err = BookingError::ReferentialIntegrity {
            entity: EntityKind::Venue,
            id: 3,
            shows: 2,
        };
        assert_eq!(err.to_string(), "Venue 3 is still referenced by 2 show(s)");
    }
}
