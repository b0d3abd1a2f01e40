//! Error types for flight assignment.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A policy field held a value outside its enumerated set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value '{value}' for assignment option '{field}'")]
pub struct InvalidConfigError {
    pub field: &'static str,
    pub value: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("no free channel group left ({groups} groups in use)")]
    NoneAvailable { groups: u32 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfigError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}
