//! Error taxonomy for the listing pipeline.

/// Errors surfaced by repositories and services.
///
/// A missing record is not an error: lookups return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// Caller supplied an unusable argument (empty id, unknown order field).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store could not execute a statement.
    #[error("store error: {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A row did not have the expected column shape.
    #[error("row mapping failed: {0}")]
    Mapping(String),

    /// The one-time seed failed; replayed to every initializer.
    #[error("store seeding failed: {0}")]
    Seed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ListingError {
    pub fn store(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    /// Stable status code, named after the gRPC codes the original services used.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Store { .. } => "UNAVAILABLE",
            Self::Mapping(_) => "DATA_LOSS",
            Self::Seed(_) => "FAILED_PRECONDITION",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

pub type ListingResult<T> = Result<T, ListingError>;
