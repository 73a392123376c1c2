mod candidate;
mod description;
mod media;
mod role;
mod room;
mod signaling;

pub use candidate::{CandidateRecord, CandidateSide};
pub use description::{SdpType, SessionDescription};
pub use media::{AudioConstraints, MediaConstraints, TrackKind};
pub use role::CallRole;
pub use room::{RoomDocument, RoomId, RoomStatus};
pub use signaling::IceServerConfig;
