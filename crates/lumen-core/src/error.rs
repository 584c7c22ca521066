//! Domain-level error types.

use thiserror::Error;

/// Failures converting a request-scoped claims map back into typed claims.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("Claims map has no string UserID entry")]
    MissingUserId,

    #[error("Invalid UUID in claim {claim}: {source}")]
    InvalidUuid {
        claim: &'static str,
        #[source]
        source: uuid::Error,
    },

    #[error("Claims value is not a JSON object")]
    NotAnObject,
}
