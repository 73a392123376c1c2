use crate::error::{CallError, CallResult};
use crate::media::{LocalStream, MediaDevices, RemoteStream};
use crate::session::SessionState;
use crate::transport::{ConnectionState, PeerTransport};
use std::collections::HashSet;
use std::sync::Arc;
use tether_core::{CallRole, MediaConstraints, SessionDescription, TrackKind};
use tracing::{debug, info, warn};

/// One side's transport endpoint and local media for a single call attempt.
pub struct NegotiationSession {
    role: CallRole,
    state: SessionState,
    local_stream: Option<LocalStream>,
    transport: Option<Arc<dyn PeerTransport>>,
    remote_description_set: bool,
    remote_streams: HashSet<RemoteStream>,
}

impl NegotiationSession {
    pub fn new(role: CallRole) -> Self {
        Self {
            role,
            state: SessionState::Idle,
            local_stream: None,
            transport: None,
            remote_description_set: false,
            remote_streams: HashSet::new(),
        }
    }

    pub fn role(&self) -> CallRole {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn local_stream(&self) -> Option<&LocalStream> {
        self.local_stream.as_ref()
    }

    pub fn transport(&self) -> Option<&Arc<dyn PeerTransport>> {
        self.transport.as_ref()
    }

    pub fn has_remote_description(&self) -> bool {
        self.remote_description_set
    }

    fn require_transport(&self) -> CallResult<Arc<dyn PeerTransport>> {
        if self.state == SessionState::Ended {
            return Err(CallError::InvalidState("session ended"));
        }
        self.transport
            .clone()
            .ok_or(CallError::InvalidState("no transport attached"))
    }

    fn require_role(&self, role: CallRole, what: &'static str) -> CallResult<()> {
        if self.role != role {
            return Err(CallError::InvalidState(what));
        }
        Ok(())
    }

    /// Captures camera and microphone. A refusal ends the session.
    pub async fn acquire_local_media(
        &mut self,
        devices: &dyn MediaDevices,
        constraints: &MediaConstraints,
    ) -> CallResult<LocalStream> {
        if self.state != SessionState::Idle {
            return Err(CallError::InvalidState("local media already requested"));
        }

        self.state = SessionState::CapturingMedia;
        match devices.get_user_media(constraints).await {
            Ok(stream) => {
                info!("Local stream {} ready for {}", stream.id(), self.role);
                self.local_stream = Some(stream.clone());
                Ok(stream)
            }
            Err(e) => {
                warn!("Local media unavailable for {}: {}", self.role, e);
                self.state = SessionState::Ended;
                Err(e.into())
            }
        }
    }

    /// Adds every local track to `transport` and starts negotiating.
    pub async fn attach_transport(&mut self, transport: Arc<dyn PeerTransport>) -> CallResult<()> {
        if self.state != SessionState::CapturingMedia || self.transport.is_some() {
            return Err(CallError::InvalidState("transport attached out of order"));
        }
        let Some(stream) = self.local_stream.clone() else {
            return Err(CallError::InvalidState("no local media"));
        };

        // Owned before the tracks go in so that end() closes it on failure.
        self.transport = Some(transport.clone());
        for track in stream.tracks() {
            transport.add_track(track, stream.id()).await?;
        }

        self.state = SessionState::Negotiating;
        Ok(())
    }

    /// Initiator: creates the offer and binds it as local description.
    pub async fn create_offer(&mut self) -> CallResult<SessionDescription> {
        self.require_role(CallRole::Initiator, "only the initiator offers")?;
        let transport = self.require_transport()?;

        let offer = transport.create_offer().await?;
        transport.set_local_description(offer.clone()).await?;
        debug!("Local offer set");
        Ok(offer)
    }

    /// Initiator: binds the responder's answer. Only the first answer is
    /// applied; returns whether this one was.
    pub async fn apply_answer(&mut self, answer: SessionDescription) -> CallResult<bool> {
        self.require_role(CallRole::Initiator, "only the initiator takes an answer")?;
        let transport = self.require_transport()?;

        if self.remote_description_set {
            warn!("{}", CallError::NegotiationConflict("answer"));
            return Ok(false);
        }

        transport.set_remote_description(answer).await?;
        self.remote_description_set = true;
        info!("Remote answer applied");
        Ok(true)
    }

    /// Responder: binds the offer, then creates and binds the answer.
    pub async fn accept_offer(&mut self, offer: SessionDescription) -> CallResult<SessionDescription> {
        self.require_role(CallRole::Responder, "only the responder takes an offer")?;
        let transport = self.require_transport()?;

        if self.remote_description_set {
            return Err(CallError::NegotiationConflict("offer"));
        }

        transport.set_remote_description(offer).await?;
        self.remote_description_set = true;

        let answer = transport.create_answer().await?;
        transport.set_local_description(answer.clone()).await?;
        debug!("Remote offer applied, local answer set");
        Ok(answer)
    }

    /// Returns `true` the first time a stream is seen.
    pub fn on_remote_track(&mut self, stream: RemoteStream) -> bool {
        if self.state == SessionState::Ended {
            return false;
        }
        let id = stream.id().to_owned();
        let first = self.remote_streams.insert(stream);
        if first {
            info!("Remote stream {} available", id);
        }
        first
    }

    pub fn on_connection_state(&mut self, state: ConnectionState) -> SessionState {
        match state {
            ConnectionState::Connected if self.state == SessionState::Negotiating => {
                info!("{} connected", self.role);
                self.state = SessionState::Connected;
            }
            ConnectionState::Failed | ConnectionState::Disconnected => {
                warn!("{} transport {}", self.role, state);
            }
            _ => {}
        }
        self.state
    }

    /// Flips `enabled` on the local tracks of `kind`. Returns the new value,
    /// or `None` when there is no such track.
    pub fn toggle_local_track(&self, kind: TrackKind) -> Option<bool> {
        if self.state == SessionState::Ended {
            return None;
        }
        let stream = self.local_stream.as_ref()?;
        let enabled = !stream.tracks_of(kind).next()?.is_enabled();
        for track in stream.tracks_of(kind) {
            track.set_enabled(enabled);
        }
        debug!("Local {} {}", kind, if enabled { "on" } else { "off" });
        Some(enabled)
    }

    pub fn is_track_enabled(&self, kind: TrackKind) -> bool {
        self.local_stream
            .as_ref()
            .and_then(|stream| stream.tracks_of(kind).next().map(|t| t.is_enabled()))
            .unwrap_or(false)
    }

    /// Stops local tracks and closes the transport. Safe to call repeatedly.
    pub async fn end(&mut self) {
        if let Some(stream) = self.local_stream.as_ref() {
            stream.stop_all();
        }
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Failed to close transport: {:#}", e);
            }
        }
        if self.state != SessionState::Ended {
            info!("{} session ended", self.role);
            self.state = SessionState::Ended;
        }
    }
}
