use crate::media::RemoteStream;
use crate::session::SessionState;
use crate::transport::ConnectionState;
use std::fmt;
use tether_core::{CallRole, RoomId};

/// Snapshot of one call as the UI sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallState {
    pub room_id: Option<RoomId>,
    pub role: Option<CallRole>,
    pub session_state: SessionState,
    pub connection_state: ConnectionState,
    pub mic_on: bool,
    pub cam_on: bool,
    pub remote_stream_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// This side hung up.
    HungUp,
    /// The other side marked the room ended.
    RemoteEnded,
    /// The room was missing, had no offer, or had already ended.
    NotJoinable,
    /// Setup failed; the message describes the error.
    Failed(String),
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HungUp => write!(f, "hung up"),
            Self::RemoteEnded => write!(f, "ended by the other side"),
            Self::NotJoinable => write!(f, "room not joinable"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Notifications for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    /// The join token to share with the responder.
    RoomCreated(RoomId),
    RemoteStream(RemoteStream),
    Exit(ExitReason),
}
