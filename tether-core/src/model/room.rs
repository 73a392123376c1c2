use crate::model::description::SessionDescription;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned room identifier. Also the join token shared with the guest.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Live,
    Ended,
}

/// Fields of a room document as they are stored.
///
/// The initiator owns `offer`, the responder owns `answer`, and either side may
/// flip `status` to [`RoomStatus::Ended`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<SessionDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<SessionDescription>,
    #[serde(default)]
    pub status: RoomStatus,
}

impl RoomDocument {
    pub fn is_ended(&self) -> bool {
        self.status == RoomStatus::Ended
    }

    /// A responder may only join a live room that carries an offer and has
    /// not been answered yet.
    pub fn is_joinable(&self) -> bool {
        self.offer.is_some() && self.answer.is_none() && !self.is_ended()
    }
}
