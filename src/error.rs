//! Error types
//!
//! Every fallible storage operation returns a [`StorageError`]: a closed set of
//! kinds plus a human-readable message. The outer [`ApiError`] wraps it for the
//! configuration, logging and CLI layers.

use thiserror::Error;

/// Result alias used throughout the storage core.
pub type StorageResult<T> = Result<T, StorageError>;

/// Closed taxonomy of storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    AlreadyExists,
    OutOfMemory,
    Directory,
    Internal,
}

impl ErrorKind {
    /// Stable numeric code, in declaration order.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput => 0,
            ErrorKind::NotFound => 1,
            ErrorKind::AlreadyExists => 2,
            ErrorKind::OutOfMemory => 3,
            ErrorKind::Directory => 4,
            ErrorKind::Internal => 5,
        }
    }

    /// Status class a transport layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 404,
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists => 400,
            ErrorKind::OutOfMemory => 404,
            ErrorKind::Directory => 403,
            ErrorKind::Internal => 500,
        }
    }
}

/// Storage core errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Kind mismatch: {0}")]
    Directory(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::InvalidInput(_) => ErrorKind::InvalidInput,
            StorageError::NotFound(_) => ErrorKind::NotFound,
            StorageError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StorageError::OutOfMemory(_) => ErrorKind::OutOfMemory,
            StorageError::Directory(_) => ErrorKind::Directory,
            StorageError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            StorageError::InvalidInput(m)
            | StorageError::NotFound(m)
            | StorageError::AlreadyExists(m)
            | StorageError::OutOfMemory(m)
            | StorageError::Directory(m)
            | StorageError::Internal(m) => m,
        }
    }

    /// Translate an I/O failure, keeping `context` as the message prefix.
    pub fn from_io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        let message = format!("{}: {}", context, err);
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(message),
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(message),
            std::io::ErrorKind::OutOfMemory => StorageError::OutOfMemory(message),
            _ => StorageError::Internal(message),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::from_io("I/O error", err)
    }
}

/// Errors raised by the layers around the storage core
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
