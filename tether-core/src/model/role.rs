use crate::model::candidate::CandidateSide;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallRole {
    /// Creates the room and publishes the offer.
    Initiator,
    /// Joins an existing room and publishes the answer.
    Responder,
}

impl CallRole {
    pub fn local_side(self) -> CandidateSide {
        match self {
            Self::Initiator => CandidateSide::Caller,
            Self::Responder => CandidateSide::Callee,
        }
    }

    pub fn remote_side(self) -> CandidateSide {
        self.local_side().opposite()
    }
}

impl fmt::Display for CallRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => write!(f, "initiator"),
            Self::Responder => write!(f, "responder"),
        }
    }
}
