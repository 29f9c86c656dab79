// SPDX-License-Identifier: MPL-2.0
use std::fmt;

/// Infrastructure errors: settings files and the durable key-value store.
///
/// Domain failures have their own enums ([`crate::session::AuthError`],
/// [`crate::i18n::LocaleError`]); this type only covers the plumbing around
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Io(String),
    Config(String),
    Storage(StorageError),
}

/// Specific failure kinds of the persisted key-value state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No data directory could be determined for this platform.
    NoDataDirectory,

    /// The state file exists but could not be decoded.
    Decode(String),

    /// The state could not be encoded or written back.
    Encode(String),
}

impl StorageError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            StorageError::NoDataDirectory => "notifications.statePathError",
            StorageError::Decode(_) => "notifications.stateParseError",
            StorageError::Encode(_) => "notifications.stateWriteError",
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NoDataDirectory => write!(f, "No data directory available"),
            StorageError::Decode(msg) => write!(f, "Cannot decode state: {}", msg),
            StorageError::Encode(msg) => write!(f, "Cannot encode state: {}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Storage(e) => write!(f, "Storage Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
