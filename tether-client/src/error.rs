use tether_core::RoomId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signaling store unavailable: {0}")]
    Unavailable(String),

    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media permission denied")]
    Denied,
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("local media unavailable: {0}")]
    MediaDenied(#[from] MediaError),

    #[error("room {0} cannot be joined")]
    NotJoinable(RoomId),

    #[error("duplicate {0} ignored")]
    NegotiationConflict(&'static str),

    #[error("candidate rejected: {0}")]
    CandidateRejected(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("transport failure: {0:#}")]
    Transport(#[from] anyhow::Error),
}

pub type CallResult<T> = Result<T, CallError>;
