//! Unified error types for downwatch

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for downwatch operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    // Config errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to load env file: {0}")]
    EnvFile(String),

    #[error("Missing required setting '{0}'")]
    MissingConfig(&'static str),

    #[error("Config validation failed: {0}")]
    ConfigValidation(String),

    // Mail errors
    #[error("Invalid mailbox '{address}': {source}")]
    InvalidMailbox {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP transport setup failed for '{host}': {source}")]
    SmtpSetup {
        host: String,
        source: lettre::transport::smtp::Error,
    },

    #[error("Delivery to '{recipient}' failed: {source}")]
    DeliveryFailed {
        recipient: String,
        source: lettre::transport::smtp::Error,
    },
}

/// Result type alias for downwatch operations
pub type Result<T> = std::result::Result<T, Error>;
