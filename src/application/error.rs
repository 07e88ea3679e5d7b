// src/application/error.rs
use crate::domain::bookmark::BookmarkId;
use crate::domain::error::DomainError;
use crate::domain::url::UrlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(DomainError),

    #[error("{0}")]
    Validation(#[from] UrlError),

    #[error("Not signed in: set a user with --user or LINKSTASH_USER")]
    NotAuthenticated,

    #[error("Bookmark not found with ID {0}")]
    BookmarkNotFound(BookmarkId),

    #[error("{0}")]
    Other(String),
}

impl ApplicationError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            ApplicationError::Other(msg) => {
                ApplicationError::Other(format!("{}: {}", context.into(), msg))
            }
            ApplicationError::Domain(err) => ApplicationError::Domain(err.context(context)),
            err => ApplicationError::Other(format!("{}: {}", context.into(), err)),
        }
    }
}

// url failures from the domain surface as form validation errors
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidUrl(e) => ApplicationError::Validation(e),
            err => ApplicationError::Domain(err),
        }
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        ApplicationError::Domain(DomainError::Io(err))
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
