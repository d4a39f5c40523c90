use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum MethodNetError {
    #[error("Configuration error for '{key}': {reason}")]
    Configuration { key: String, reason: String },
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl MethodNetError {
    pub fn configuration<K: fmt::Display, R: fmt::Display>(key: K, reason: R) -> Self {
        MethodNetError::Configuration {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that must halt initialization.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MethodNetError::Configuration { .. })
    }
}

impl From<toml::de::Error> for MethodNetError {
    fn from(src: toml::de::Error) -> MethodNetError {
        MethodNetError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<JsonError> for MethodNetError {
    fn from(src: JsonError) -> MethodNetError {
        MethodNetError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for MethodNetError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => MethodNetError::NotFound(format!("{x}")),
            _ => MethodNetError::Io(format!("IOError: {}", x.kind())),
        }
    }
}
