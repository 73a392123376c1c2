use serde::Serialize;
use std::fmt;

/// Lifecycle of one [`crate::NegotiationSession`]. `Ended` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    #[default]
    Idle,
    CapturingMedia,
    Negotiating,
    Connected,
    Ended,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::CapturingMedia => write!(f, "capturing-media"),
            Self::Negotiating => write!(f, "negotiating"),
            Self::Connected => write!(f, "connected"),
            Self::Ended => write!(f, "ended"),
        }
    }
}
