use thiserror::Error;

use crate::{assignment::AssignmentError, db::StoreError};

/// Failure kinds reported by lifecycle operations.
#[derive(Debug, Error)]
pub enum AssignerError {
    #[error("team not found")]
    TeamNotFound,
    #[error("team already exists")]
    TeamExists,
    #[error("pull request already exists")]
    PrExists,
    #[error("pull request is already merged")]
    PrMerged,
    #[error("user is not assigned as a reviewer")]
    NotAssigned,
    #[error("no active replacement candidate in team")]
    NoCandidate,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation deadline exceeded")]
    TimedOut,
    #[error("internal storage error: {0}")]
    Internal(#[source] sqlx::Error),
}

impl From<sqlx::Error> for AssignerError {
    fn from(err: sqlx::Error) -> Self {
        AssignerError::Internal(err)
    }
}

impl From<StoreError> for AssignerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TeamNotFound => AssignerError::TeamNotFound,
            StoreError::NotFound(entity) => AssignerError::NotFound(entity),
            StoreError::Database(err) => AssignerError::Internal(err),
        }
    }
}

impl From<AssignmentError> for AssignerError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::PrMerged => AssignerError::PrMerged,
            AssignmentError::NotAssigned => AssignerError::NotAssigned,
            AssignmentError::NoCandidate => AssignerError::NoCandidate,
        }
    }
}
