use async_graphql::{Error, ErrorExtensions};

use crate::error::BookingError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphqlError {
    #[error("{0}")]
    Booking(BookingError),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Failed to get app state")]
    FailedToGetAppState,
}

impl GraphqlError {
    fn code(&self) -> &'static str {
        match self {
            GraphqlError::Booking(err) => err.kind(),
            GraphqlError::ServerError(_) | GraphqlError::FailedToGetAppState => "SERVER",
        }
    }

    /// Client-facing message. Store failures are reported without driver detail.
    fn message(&self) -> String {
        match self {
            GraphqlError::Booking(BookingError::Transaction(_)) => {
                "Database transaction failed".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl Default for GraphqlError {
    fn default() -> Self {
        Self::ServerError("Unknown error".to_string())
    }
}

impl From<BookingError> for GraphqlError {
    fn from(err: BookingError) -> Self {
        if let BookingError::Transaction(db_err) = &err {
            log::error!("GraphQL transaction error: {:#?}", db_err);
        }
        Self::Booking(err)
    }
}

impl From<color_eyre::Report> for GraphqlError {
    fn from(report: color_eyre::Report) -> Self {
        // Log the full error report with trace chain for debugging
        log::error!("GraphQL error: {:#?}", report);
        Self::ServerError(report.to_string())
    }
}

impl ErrorExtensions for GraphqlError {
    fn extend(&self) -> Error {
        Error::new(self.message()).extend_with(|_err, e| {
            e.set("code", self.code());
            match self {
                GraphqlError::Booking(err) => {
                    if let Some(entity) = err.entity() {
                        e.set("entity", entity.to_string());
                    }
                    match err {
                        BookingError::Validation { field, .. } => e.set("field", *field),
                        BookingError::NotFound { key, .. } => e.set("key", key.clone()),
                        BookingError::ReferentialIntegrity { id, shows, .. } => {
                            e.set("id", *id);
                            e.set("shows", *shows);
                        }
                        BookingError::Transaction(_) => {}
                    }
                }
                GraphqlError::ServerError(reason) => e.set("reason", reason.clone()),
                GraphqlError::FailedToGetAppState => {
                    e.set("reason", "Failed to get app state".to_string())
                }
            }
        })
    }
}

// Newtype wrapper to avoid blanket From implementation conflict for GraphqlError and async_graphql::Error
#[derive(Debug, Clone)]
pub struct GraphqlErrorWrapper(GraphqlError);

impl From<GraphqlError> for GraphqlErrorWrapper {
    fn from(err: GraphqlError) -> Self {
        Self(err)
    }
}

impl From<GraphqlErrorWrapper> for Error {
    fn from(wrapper: GraphqlErrorWrapper) -> Self {
        wrapper.0.extend()
    }
}

impl From<BookingError> for GraphqlErrorWrapper {
    fn from(err: BookingError) -> Self {
        GraphqlError::from(err).into()
    }
}

impl From<color_eyre::Report> for GraphqlErrorWrapper {
    fn from(report: color_eyre::Report) -> Self {
        GraphqlError::from(report).into()
    }
}

pub type GraphqlResult<T> = Result<T, GraphqlErrorWrapper>;
