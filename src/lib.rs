//! HR Portal Store is the persistence and service-selection layer of the HR portal.
//!
//! Entity collections (employees, objectives, trainings, vacation requests, users)
//! live in a durable string-keyed medium as JSON arrays, one key per kind. On top of
//! that sit per-kind repositories, reactive bindings for UI code, and a selector that
//! routes the user service to a remote daemon or to an in-process substitute.
//!
//! ## Core Components
//! - [`engine`]: The durable medium, the serialized store, seed data and sealed backups.
//! - [`repo`]: Per-kind CRUD façade over the store.
//! - [`binding`]: Reactive collection state mirrored from a repository.
//! - [`service`]: The user-service contract, its local and remote implementations and the selector.
//! - [`server`]: TCP daemon serving a user service.

pub mod binding;
pub mod config;
pub mod engine;
pub mod model;
pub mod portal;
pub mod repo;
pub mod server;
pub mod service;

use thiserror::Error;

pub use config::Config;
pub use portal::Portal;

/// Errors returned by the HR portal store.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested record does not exist.
    #[error("not found")]
    NotFound,
    /// A record with the same identifier already exists in the collection.
    #[error("duplicate id")]
    DuplicateId,
    /// Another user already owns the email address.
    #[error("duplicate email")]
    DuplicateEmail,
    /// Email and password do not match any user.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The durable medium refused the write because it is full.
    #[error("quota exceeded")]
    QuotaExceeded,
    /// Sealing or opening an encrypted snapshot failed.
    #[error("vault error: {0}")]
    Vault(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred during persistence or network communication.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Rebuilds a domain error from the message carried by an `ERR` response line.
    pub fn from_wire(message: &str) -> Self {
        match message {
            "not found" => Error::NotFound,
            "duplicate id" => Error::DuplicateId,
            "duplicate email" => Error::DuplicateEmail,
            "invalid credentials" => Error::InvalidCredentials,
            "quota exceeded" => Error::QuotaExceeded,
            other => Error::Internal(other.to_string()),
        }
    }
}

/// A specialized Result type for HR portal store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_messages_round_trip_domain_errors() {
        for err in [Error::NotFound, Error::DuplicateId, Error::DuplicateEmail, Error::InvalidCredentials, Error::QuotaExceeded] {
            let wire = err.to_string();
            assert_eq!(Error::from_wire(&wire).to_string(), wire);
        }
        assert!(matches!(Error::from_wire("invalid json value"), Error::Internal(m) if m == "invalid json value"));
    }
}
