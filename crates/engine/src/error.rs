//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`EmptyName`] thrown when a category, operator or route name is blank.
//! - [`AlreadyExists`] thrown when a category is registered twice.
//! - [`UnknownCategory`] thrown when adjusting a category that is not registered.
//! - [`UnknownLedger`] thrown when finalizing a ledger that was never created.
//! - [`Persistence`] thrown when the ledger store cannot be read or written.
//!
//!  [`EmptyName`]: EngineError::EmptyName
//!  [`AlreadyExists`]: EngineError::AlreadyExists
//!  [`UnknownCategory`]: EngineError::UnknownCategory
//!  [`UnknownLedger`]: EngineError::UnknownLedger
//!  [`Persistence`]: EngineError::Persistence
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} must not be empty")]
    EmptyName(String),
    #[error("\"{0}\" already exists")]
    AlreadyExists(String),
    #[error("\"{0}\" unknown category")]
    UnknownCategory(String),
    #[error("\"{0}\" ledger not found")]
    UnknownLedger(String),
    #[error(transparent)]
    Persistence(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EmptyName(a), Self::EmptyName(b)) => a == b,
            (Self::AlreadyExists(a), Self::AlreadyExists(b)) => a == b,
            (Self::UnknownCategory(a), Self::UnknownCategory(b)) => a == b,
            (Self::UnknownLedger(a), Self::UnknownLedger(b)) => a == b,
            (Self::Persistence(a), Self::Persistence(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
