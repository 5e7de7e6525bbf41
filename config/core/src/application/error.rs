// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Service error taxonomy.
//!
//! Every application service returns [`ServiceError`]. The presentation layer
//! maps each kind to one fixed HTTP status; `Internal` carries detail for the
//! server log only and is never echoed to a client.

use thiserror::Error;

use crate::domain::layout::LayoutError;
use crate::domain::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<LayoutError> for ServiceError {
    fn from(err: LayoutError) -> Self {
        let message = err.to_string();
        match err {
            LayoutError::ProfileExists(_) => ServiceError::Conflict(message),
            LayoutError::ProfileNotFound(_) | LayoutError::ActiveProfileMissing(_) => {
                ServiceError::NotFound(message)
            }
            LayoutError::DefaultProfileProtected | LayoutError::InvalidProfileName(_) => {
                ServiceError::InvalidArgument(message)
            }
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => ServiceError::NotFound(what),
            RepositoryError::Rejected(layout) => layout.into(),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_errors_map_to_taxonomy() {
        assert!(matches!(
            ServiceError::from(LayoutError::ProfileExists("x".into())),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(LayoutError::ProfileNotFound("x".into())),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(LayoutError::DefaultProfileProtected),
            ServiceError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_repository_errors_map_to_taxonomy() {
        assert!(matches!(
            ServiceError::from(RepositoryError::Rejected(LayoutError::DefaultProfileProtected)),
            ServiceError::InvalidArgument(_)
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::Database("connection reset".into())),
            ServiceError::Internal(_)
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound("layout".into())),
            ServiceError::NotFound(_)
        ));
    }
}
