//! Error types for the toolkit

use crate::record::RecordKind;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unreadable configuration, raised before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be built or sent
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Request to {url} rejected with status {status}")]
    RemoteRejected { url: String, status: StatusCode },

    /// Payload is not valid JSON
    #[error("Could not parse JSON from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON parsed but lacks the fields its record kind needs
    #[error("Malformed {kind} record: {reason}")]
    MalformedRecord { kind: RecordKind, reason: String },

    /// User declined a confirmation prompt
    #[error("Import cancelled")]
    ImportCancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Parse {
            origin: origin.into(),
            source,
        }
    }

    pub fn malformed(kind: RecordKind, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            kind,
            reason: reason.into(),
        }
    }
}
