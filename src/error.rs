use crate::statics;
use thiserror::Error;

/// Local, pre-network rejection of user input. The display text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", statics::EN_ERR_NAME_EMPTY)]
    EmptyName,
    #[error("{}", statics::EN_ERR_VALUE_EMPTY)]
    EmptyValue,
}

/// Failure response from the repository client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Node not found: {path}")]
    NotFound { path: String },
    #[error("Property not found: {name}")]
    PropertyNotFound { name: String },
    #[error("Repository unreachable: {0}")]
    Transport(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("No tree entry at {path}")]
    NotFoundInTree { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("{0} has no JSON representation")]
    NotRepresentable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("no node loaded")]
    NoNodeLoaded,
    #[error("session destroyed")]
    Destroyed,
}

pub type SessionResult<T> = Result<T, SessionError>;
