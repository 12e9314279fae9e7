use thiserror::Error;

use crate::rdf::codec::MalformedTerm;

/// Every way a pod operation can fail.
#[derive(Debug, Error)]
pub(crate) enum PodError {
    #[error("{attribute} ({predicate}) holds a malformed value: {source}")]
    MalformedTerm {
        attribute: &'static str,
        predicate: &'static str,
        source: MalformedTerm,
    },

    #[error("resource already exists: {identifier}")]
    AlreadyExists { identifier: String },

    #[error("resource not found: {identifier}")]
    NotFound { identifier: String },

    #[error("access to {identifier} denied with status {status}")]
    AccessDenied { identifier: String, status: u16 },

    #[error("transport failure (status {status:?}): {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("invalid resource identifier {identifier}: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("{identifier} is not a readable RDF document: {reason}")]
    InvalidDocument { identifier: String, reason: String },
}

impl PodError {
    pub(crate) fn transport(status: Option<u16>, message: impl Into<String>) -> PodError {
        PodError::Transport {
            status,
            message: message.into(),
        }
    }
}
