use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Unknown setting '{id}'")]
    UnknownKey { id: String },

    #[error("Malformed settings document {}: {source}", path.display())]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value {value} for setting '{id}': {reason}")]
    InvalidValue {
        id: String,
        value: String,
        reason: String,
    },

    #[error("Setting '{id}' is not a {expected} setting")]
    KindMismatch { id: String, expected: &'static str },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SettingsError {
    pub fn invalid(id: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        SettingsError::InvalidValue {
            id: id.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
