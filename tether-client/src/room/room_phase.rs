use std::fmt;

/// Local view of where one room is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    Uninitialized,
    Created,
    OfferPublished,
    AnswerPublished,
    Ended,
}

impl RoomPhase {
    pub fn is_terminal(self) -> bool {
        self == Self::Ended
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Created => "created",
            Self::OfferPublished => "offer-published",
            Self::AnswerPublished => "answer-published",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}
