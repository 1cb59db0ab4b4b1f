pub mod auth;
pub mod service;
pub mod session;
pub mod store;

use domain::admin::NewAdminError;
use domain::card::CardTokenError;
use domain::security::password::PasswordError;
use domain::{FieldErrors, PaymentError};
use thiserror::Error;

use crate::store::Collection;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{collection} document '{id}' not found")]
    NotFound { collection: Collection, id: String },

    #[error("invalid input: {0}")]
    Invalid(FieldErrors),

    #[error("payment rejected: {0}")]
    Payment(#[from] PaymentError),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("card token: {0}")]
    Token(#[from] CardTokenError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend holds something it should not (non-object documents,
    /// malformed collection files).
    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    #[inline]
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Error::NotFound {
            collection,
            id: id.into(),
        }
    }

    #[inline]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Error::Forbidden(msg.into())
    }

    #[inline]
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Invalid(errors)
    }
}

impl From<NewAdminError> for Error {
    fn from(e: NewAdminError) -> Self {
        match e {
            NewAdminError::Invalid(fields) => Error::Invalid(fields),
            NewAdminError::Password(p) => Error::Password(p),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
