use crate::media::LocalTrack;
use crate::transport::PeerTransport;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tether_core::{CandidateRecord, SessionDescription};

/// Transport that records what it is asked to do. Candidates containing
/// "bad" are refused.
#[derive(Default)]
pub(crate) struct StubTransport {
    tracks: Mutex<Vec<String>>,
    local: Mutex<Option<SessionDescription>>,
    remote: Mutex<Option<SessionDescription>>,
    applied: Mutex<Vec<String>>,
    closes: AtomicUsize,
}

impl StubTransport {
    pub(crate) fn tracks(&self) -> Vec<String> {
        self.tracks.lock().unwrap().clone()
    }

    pub(crate) fn local(&self) -> Option<SessionDescription> {
        self.local.lock().unwrap().clone()
    }

    pub(crate) fn remote(&self) -> Option<SessionDescription> {
        self.remote.lock().unwrap().clone()
    }

    pub(crate) fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerTransport for StubTransport {
    async fn add_track(&self, track: &LocalTrack, _stream_id: &str) -> Result<()> {
        self.tracks.lock().unwrap().push(track.id().to_owned());
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        Ok(SessionDescription::offer("stub-offer"))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        if self.remote().is_none() {
            bail!("no remote offer");
        }
        Ok(SessionDescription::answer("stub-answer"))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        *self.local.lock().unwrap() = Some(desc);
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        *self.remote.lock().unwrap() = Some(desc);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: CandidateRecord) -> Result<()> {
        if candidate.candidate.contains("bad") {
            bail!("unparseable candidate");
        }
        self.applied.lock().unwrap().push(candidate.candidate);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
