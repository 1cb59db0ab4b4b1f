use adapt::Error as AdaptError;
use domain::security::password::PasswordError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("adapt error: {0}")]
    AdaptError(#[from] AdaptError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),
}
