//! Error types for the colloquia service.

use thiserror::Error;

/// Main error type for colloquia operations.
#[derive(Error, Debug)]
pub enum ColloquiaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Lookup misses against the store, surfaced as 404s at the API boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Seminar not found: {0}")]
    SeminarNotFound(String),

    #[error("Talk not found: {0}/{1}")]
    TalkNotFound(String, u32),

    #[error("Institution not found: {0}")]
    InstitutionNotFound(String),
}

/// Search-related errors.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Subject {0} not found")]
    UnknownSubject(String),

    #[error("Topic {0} not found")]
    UnknownTopic(String),
}

/// Result type alias for colloquia operations.
pub type Result<T> = std::result::Result<T, ColloquiaError>;
