use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};

use tether_client::{
    ConnectionState, LocalTrack, PeerTransport, RemoteStream, TransportConfig, TransportEvent,
    TransportFactory,
};
use tether_core::{CandidateRecord, SessionDescription};

/// Number of candidates a FakeTransport reports after its local description is set.
pub const FAKE_CANDIDATES_PER_SIDE: usize = 2;

/// In-process stand-in for a peer connection.
///
/// It reports candidates once the local description is set, refuses any
/// candidate containing "bad", and connects once it has a remote description
/// and at least one remote candidate.
pub struct FakeTransport {
    pub label: String,
    event_tx: mpsc::Sender<TransportEvent>,
    tracks: Mutex<Vec<String>>,
    local: Mutex<Option<SessionDescription>>,
    remote: Mutex<Option<SessionDescription>>,
    remote_set_count: AtomicUsize,
    applied: Mutex<Vec<String>>,
    applied_before_remote: AtomicUsize,
    connected: AtomicBool,
    closed: AtomicBool,
}

impl FakeTransport {
    fn new(label: String, event_tx: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            label,
            event_tx,
            tracks: Mutex::new(Vec::new()),
            local: Mutex::new(None),
            remote: Mutex::new(None),
            remote_set_count: AtomicUsize::new(0),
            applied: Mutex::new(Vec::new()),
            applied_before_remote: AtomicUsize::new(0),
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub async fn tracks(&self) -> Vec<String> {
        self.tracks.lock().await.clone()
    }

    pub async fn applied_candidates(&self) -> Vec<String> {
        self.applied.lock().await.clone()
    }

    /// How many times a remote description was bound.
    pub fn remote_set_count(&self) -> usize {
        self.remote_set_count.load(Ordering::SeqCst)
    }

    /// Candidates applied while no remote description was bound. Always zero
    /// when the caller buffers correctly.
    pub fn applied_before_remote(&self) -> usize {
        self.applied_before_remote.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn maybe_connect(&self) {
        if self.remote.lock().await.is_none() || self.applied.lock().await.is_empty() {
            return;
        }
        if self.connected.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::debug!("[FakeTransport {}] connected", self.label);
        let _ = self
            .event_tx
            .send(TransportEvent::StateChanged(ConnectionState::Connecting))
            .await;
        let _ = self
            .event_tx
            .send(TransportEvent::StateChanged(ConnectionState::Connected))
            .await;
        let _ = self
            .event_tx
            .send(TransportEvent::RemoteTrack(RemoteStream::new(format!(
                "remote-of-{}",
                self.label
            ))))
            .await;
    }
}

#[async_trait]
impl PeerTransport for FakeTransport {
    async fn add_track(&self, track: &LocalTrack, _stream_id: &str) -> Result<()> {
        self.tracks.lock().await.push(track.id().to_owned());
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        Ok(SessionDescription::offer(format!("v=0 offer {}", self.label)))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        if self.remote.lock().await.is_none() {
            bail!("create_answer without remote offer");
        }
        Ok(SessionDescription::answer(format!("v=0 answer {}", self.label)))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        *self.local.lock().await = Some(desc);
        for n in 0..FAKE_CANDIDATES_PER_SIDE {
            let mut candidate = CandidateRecord::new(format!("candidate:{}-{}", self.label, n));
            candidate.sdp_mid = Some("0".to_owned());
            candidate.sdp_m_line_index = Some(0);
            let _ = self
                .event_tx
                .send(TransportEvent::CandidateGenerated(candidate))
                .await;
        }
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        *self.remote.lock().await = Some(desc);
        self.remote_set_count.fetch_add(1, Ordering::SeqCst);
        self.maybe_connect().await;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: CandidateRecord) -> Result<()> {
        if candidate.candidate.contains("bad") {
            bail!("cannot parse {}", candidate.candidate);
        }
        if self.remote.lock().await.is_none() {
            self.applied_before_remote.fetch_add(1, Ordering::SeqCst);
        }
        self.applied.lock().await.push(candidate.candidate);
        self.maybe_connect().await;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out FakeTransports labelled `t0`, `t1`, ... and keeps them for
/// inspection.
#[derive(Default)]
pub struct FakeTransportFactory {
    created: Mutex<Vec<Arc<FakeTransport>>>,
}

impl FakeTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn created(&self) -> Vec<Arc<FakeTransport>> {
        self.created.lock().await.clone()
    }

    pub async fn only(&self) -> Arc<FakeTransport> {
        let created = self.created.lock().await;
        assert_eq!(created.len(), 1, "expected exactly one transport");
        created[0].clone()
    }
}

#[async_trait]
impl TransportFactory for FakeTransportFactory {
    async fn create(
        &self,
        _config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let mut created = self.created.lock().await;
        let transport = Arc::new(FakeTransport::new(format!("t{}", created.len()), event_tx));
        created.push(transport.clone());
        Ok(transport)
    }
}
