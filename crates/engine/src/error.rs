//! The module contains the errors the engine can throw.
//!
//! Validation failures ([`InvalidAmount`]) are raised before any write and
//! are meant to be shown to the user. Store failures ([`Database`]) surface
//! on writes; reads of malformed stored blobs degrade to empty results
//! instead.
//!
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (Self::Payload(a), Self::Payload(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
