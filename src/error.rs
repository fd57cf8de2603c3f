use std::fmt;

use crate::store::StoreError;

/// A precondition of a catalog mutation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// A cached movie already uses this title.
    DuplicateTitle { title: String },
    /// The document resolved through the movie's id reports a different id.
    IdMismatch { expected: String, actual: String },
    EmptyTitle,
    /// The movie was never persisted, so there is no document to address.
    MissingId,
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidArgument::DuplicateTitle { title } => {
                write!(f, "duplicate title: a movie titled {:?} already exists", title)
            }
            InvalidArgument::IdMismatch { expected, actual } => write!(
                f,
                "id mismatch: movie has id {:?} but document reports {:?}",
                expected, actual
            ),
            InvalidArgument::EmptyTitle => write!(f, "empty title: a movie title is required"),
            InvalidArgument::MissingId => write!(f, "missing id: the movie has not been saved"),
        }
    }
}

impl std::error::Error for InvalidArgument {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    InvalidArgument(InvalidArgument),
    Store(StoreError),
    Serde(String),
    LockPoisoned(&'static str),
}

impl CatalogError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CatalogError::InvalidArgument(_))
    }

    pub fn invalid_argument(&self) -> Option<&InvalidArgument> {
        match self {
            CatalogError::InvalidArgument(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            CatalogError::Store(err) => write!(f, "store error: {}", err),
            CatalogError::Serde(message) => write!(f, "movie serialization error: {}", message),
            CatalogError::LockPoisoned(operation) => {
                write!(f, "catalog lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::InvalidArgument(reason) => Some(reason),
            CatalogError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidArgument> for CatalogError {
    fn from(reason: InvalidArgument) -> Self {
        CatalogError::InvalidArgument(reason)
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::Store(err)
    }
}
