//! Errors surfaced by pattern construction, matching and substitution

use thiserror::Error;

use super::engine::EngineError;

/// Public error taxonomy. A failed search is not an error; it is `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern could not be compiled; no handle was produced.
    #[error("compile error: {message}")]
    Compile { message: String },

    /// The engine failed during a search. The pattern stays usable.
    #[error("search error: {message}")]
    Search { message: String },

    /// The subject buffer changed identity or length while a replacement
    /// callback ran.
    #[error("subject buffer modified during substitution (length {expected_len} -> {actual_len})")]
    ConcurrentModification {
        expected_len: usize,
        actual_len: usize,
    },
}

impl Error {
    /// Translate a backend error raised while compiling.
    pub fn compile(err: EngineError) -> Self {
        Error::Compile {
            message: err.to_string(),
        }
    }

    /// Translate a backend error raised while searching.
    pub fn search(err: EngineError) -> Self {
        Error::Search {
            message: err.to_string(),
        }
    }

    /// Stable code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Compile { .. } => "COMPILE_ERROR",
            Error::Search { .. } => "SEARCH_ERROR",
            Error::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
