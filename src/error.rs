// Copyright 2023 IPQualityScore LLC
//! Error types returned by database loading and lookups.

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The database file could not be opened or read in full
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header describes a layout the buffer cannot hold
    #[error("invalid database format: {0}")]
    Format(String),

    /// The address to look up is malformed or reserved
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An index record points outside the loaded buffer
    #[error("corrupt database: {0}")]
    CorruptData(String),
}

impl Error {
    /// Returns true if the error was caused by the caller's input rather than
    /// by the database or the file system
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
