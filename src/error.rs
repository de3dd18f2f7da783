//! Typed domain errors surfaced across the library boundary.
//!
//! Internal glue code (CLI, server) keeps using `anyhow::Result`, matching
//! the rest of this codebase; `Error` is for failures that a caller of the
//! library needs to branch on (invalid request vs. missing index vs. a
//! broken source database).

use thiserror::Error;

/// The five error kinds named by the search core's error-handling design.
#[derive(Debug, Error)]
pub enum Error {
    /// A request could not be compiled: a blank query, or a wildcard term
    /// with no regular character.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The index directory does not exist when opening the search engine.
    #[error("index not found at {0}")]
    NotFound(String),

    /// The query parser rejected an escaped query string.
    #[error("failed to parse query: {0}")]
    ParseError(String),

    /// The source database is missing, unreadable, or failed during a
    /// build. No partial index is left readable when this occurs.
    #[error("source error: {0}")]
    SourceError(String),

    /// An unexpected failure that does not fit the other kinds. Highlighting
    /// failures fall back to a plain snippet rather than raising this.
    #[error("internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
