//! Error types for the tour engine.

use std::fmt;

/// Result type for tour engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building catalogs or starting tours.
#[derive(Debug)]
pub enum Error {
    /// No tour with the given id exists in the catalog.
    UnknownTour {
        /// The id that was looked up.
        id: String,
    },
    /// Two tours in a catalog share the same id.
    DuplicateTour {
        /// The duplicated id.
        id: String,
    },
    /// A tour failed validation.
    InvalidTour {
        /// Id of the offending tour (may be empty if the id itself is invalid).
        id: String,
        /// Description of what was invalid.
        detail: String,
    },
    /// An externalized catalog could not be parsed.
    Parse {
        /// Context for where the error occurred.
        context: &'static str,
        /// The underlying parser error.
        source: serde_json::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownTour { id } => write!(f, "no such tour: {id:?}"),
            Error::DuplicateTour { id } => write!(f, "duplicate tour id: {id:?}"),
            Error::InvalidTour { id, detail } => write!(f, "invalid tour {id:?}: {detail}"),
            Error::Parse { context, source } => write!(f, "failed to parse {context}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse {
            context: "tour catalog",
            source: e,
        }
    }
}
