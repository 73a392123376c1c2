use crate::utils::{CALLEE_CANDIDATES, CALLER_CANDIDATES};
use serde::{Deserialize, Serialize};

/// A network path descriptor, stored in the same JSON shape the browser
/// `RTCIceCandidate.toJSON()` produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl CandidateRecord {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            ..Default::default()
        }
    }
}

/// Which candidate sub-collection of a room a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSide {
    Caller,
    Callee,
}

impl CandidateSide {
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::Caller => CALLER_CANDIDATES,
            Self::Callee => CALLEE_CANDIDATES,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Caller => Self::Callee,
            Self::Callee => Self::Caller,
        }
    }
}
