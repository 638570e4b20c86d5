//! Error taxonomy for the feed, comment and reaction core.
//!
//! Validation problems surface as `Input` before any storage call, missing or
//! invisible targets as `NotFound`, and anything the storage layer raises is
//! wrapped in `Database` with the original error kept as its source.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed arguments (empty content, bad enum value, page/limit out of range)
    #[error("Invalid input: {0}")]
    Input(String),

    /// Referenced post, comment or reaction target is missing, hidden or deleted
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected storage failure
    #[error("Database error")]
    Database(#[source] anyhow::Error),
}

impl CoreError {
    pub fn input(msg: impl Into<String>) -> Self {
        CoreError::Input(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }

    /// Wrap a storage error; meant for `.map_err(CoreError::database)`
    pub fn database(err: anyhow::Error) -> Self {
        CoreError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::error::Error as _;

    #[test]
    fn test_database_error_keeps_cause() {
        let err = CoreError::database(anyhow!("disk I/O error"));
        let source = err.source().expect("database errors carry their cause");
        assert_eq!(source.to_string(), "disk I/O error");
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CoreError::input("limit must be at least 1").to_string(),
            "Invalid input: limit must be at least 1"
        );
        assert_eq!(
            CoreError::not_found("Post not found").to_string(),
            "Not found: Post not found"
        );
    }
}
