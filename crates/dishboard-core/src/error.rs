//! Error types for the mutation service.

use crate::state::StoreError;
use dishboard_protocol::DishId;
use thiserror::Error;

/// Errors returned by mutation and list operations.
#[derive(Debug, Error)]
pub enum DishboardCoreError {
    /// Request input failed validation.
    #[error("{0}")]
    Validation(String),
    /// A create collided with a live record.
    #[error("Dish with ID {0} already exists")]
    AlreadyExists(DishId),
    /// No live record carries the identifier.
    #[error("Dish with ID {0} not found")]
    NotFound(DishId),
    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification used by transports to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Store,
}

impl DishboardCoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DishboardCoreError::Validation(_) | DishboardCoreError::AlreadyExists(_) => {
                ErrorKind::Validation
            }
            DishboardCoreError::NotFound(_) => ErrorKind::NotFound,
            DishboardCoreError::Store(_) => ErrorKind::Store,
        }
    }
}
