use crate::media::RemoteStream;
use crate::transport::ConnectionState;
use tether_core::CandidateRecord;

/// Events a transport endpoint pushes to its owner.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    CandidateGenerated(CandidateRecord),
    RemoteTrack(RemoteStream),
    StateChanged(ConnectionState),
}
