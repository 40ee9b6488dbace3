use thiserror::Error;

use crate::application::menus::MenuError;
use crate::application::pagination::PaginationError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::domain::slug::{SlugAsyncError, SlugError};
use crate::infra::error::InfraError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(RepoError),
    #[error(transparent)]
    Menu(#[from] MenuError),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// True for every "nothing matched" outcome, whichever layer raised it.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound { .. } | AppError::Repo(RepoError::NotFound)
        )
    }
}

impl From<RepoError> for AppError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::NotFound => AppError::not_found("record"),
            RepoError::Duplicate { constraint } => {
                AppError::validation(format!("value already in use ({constraint})"))
            }
            RepoError::InvalidInput { message } => AppError::Validation(message),
            other => AppError::Repo(other),
        }
    }
}

impl From<PaginationError> for AppError {
    fn from(_: PaginationError) -> Self {
        AppError::not_found("page")
    }
}

impl From<SlugError> for AppError {
    fn from(error: SlugError) -> Self {
        AppError::validation(error.to_string())
    }
}

impl From<SlugAsyncError<RepoError>> for AppError {
    fn from(error: SlugAsyncError<RepoError>) -> Self {
        match error {
            SlugAsyncError::Slug(err) => err.into(),
            SlugAsyncError::Predicate(err) => err.into(),
        }
    }
}
