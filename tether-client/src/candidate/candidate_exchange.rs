use crate::candidate::{Admission, RemoteCandidateQueue};
use crate::config::CallConfig;
use crate::error::{CallError, CallResult};
use crate::store::{ChangeKind, RecordChange, SignalingStore, Subscription, from_fields, to_fields};
use crate::transport::PeerTransport;
use std::sync::{Arc, Mutex, MutexGuard};
use tether_core::{CallRole, CandidateRecord, RoomId};
use tracing::{debug, warn};

/// What happened to one remote candidate handed to
/// [`CandidateExchange::accept_remote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    Applied,
    Queued,
    Duplicate,
    Rejected,
}

/// Relays candidates of one room between the local transport and the store.
///
/// Local candidates go to this side's sub-collection, remote ones are read
/// from the other side's.
pub struct CandidateExchange {
    store: Arc<dyn SignalingStore>,
    collection: String,
    room_id: RoomId,
    local_sub: String,
    remote_sub: String,
    queue: Mutex<RemoteCandidateQueue>,
}

impl CandidateExchange {
    pub fn new(
        store: Arc<dyn SignalingStore>,
        config: &CallConfig,
        room_id: RoomId,
        role: CallRole,
    ) -> Self {
        Self {
            store,
            collection: config.rooms_collection.clone(),
            room_id,
            local_sub: config.candidates_collection(role.local_side()).to_owned(),
            remote_sub: config.candidates_collection(role.remote_side()).to_owned(),
            queue: Mutex::new(RemoteCandidateQueue::new()),
        }
    }

    fn lock_queue(&self) -> MutexGuard<'_, RemoteCandidateQueue> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends a locally discovered candidate. Failures are logged and
    /// dropped; the call goes on with the candidates that made it.
    pub async fn publish_local(&self, candidate: &CandidateRecord) {
        let record = match to_fields(candidate) {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to encode local candidate: {}", e);
                return;
            }
        };

        match self
            .store
            .append_to_subcollection(&self.collection, self.room_id.as_str(), &self.local_sub, record)
            .await
        {
            Ok(id) => debug!("Published local candidate {} to {}", id, self.local_sub),
            Err(e) => warn!(
                "Failed to publish local candidate for room {}: {}",
                self.room_id, e
            ),
        }
    }

    /// Watches the other side's candidates. `on_candidate` gets the record id
    /// and the decoded candidate for every added record.
    pub async fn subscribe_remote<F>(&self, on_candidate: F) -> CallResult<Subscription>
    where
        F: Fn(String, CandidateRecord) + Send + Sync + 'static,
    {
        let subscription = self
            .store
            .subscribe_subcollection(
                &self.collection,
                self.room_id.as_str(),
                &self.remote_sub,
                Box::new(move |change| {
                    if let Some((id, candidate)) = decode_added(change) {
                        on_candidate(id, candidate);
                    }
                }),
            )
            .await?;
        Ok(subscription)
    }

    /// Applies a remote candidate once, or queues it until
    /// [`Self::remote_description_ready`].
    pub async fn accept_remote(
        &self,
        record_id: &str,
        candidate: CandidateRecord,
        transport: &dyn PeerTransport,
    ) -> CandidateOutcome {
        let admission = self.lock_queue().admit(record_id, candidate);
        match admission {
            Admission::Apply(candidate) => apply(record_id, candidate, transport).await,
            Admission::Queued => {
                debug!("Queued remote candidate {} until remote description", record_id);
                CandidateOutcome::Queued
            }
            Admission::Duplicate => {
                debug!("Remote candidate {} already seen", record_id);
                CandidateOutcome::Duplicate
            }
        }
    }

    /// Called once the remote description is set. Applies the queued
    /// candidates in arrival order and returns how many were applied.
    pub async fn remote_description_ready(&self, transport: &dyn PeerTransport) -> usize {
        let pending = self.lock_queue().mark_ready();
        let mut applied = 0;
        for (record_id, candidate) in pending {
            if apply(&record_id, candidate, transport).await == CandidateOutcome::Applied {
                applied += 1;
            }
        }
        applied
    }
}

async fn apply(
    record_id: &str,
    candidate: CandidateRecord,
    transport: &dyn PeerTransport,
) -> CandidateOutcome {
    match transport.add_ice_candidate(candidate).await {
        Ok(()) => {
            debug!("Applied remote candidate {}", record_id);
            CandidateOutcome::Applied
        }
        Err(e) => {
            let err = CallError::CandidateRejected(format!("{record_id}: {e:#}"));
            warn!("{}", err);
            CandidateOutcome::Rejected
        }
    }
}

/// Keeps only `Added` changes that decode as a candidate.
pub(crate) fn decode_added(change: RecordChange) -> Option<(String, CandidateRecord)> {
    if change.kind != ChangeKind::Added {
        return None;
    }

    match from_fields::<CandidateRecord>(change.data) {
        Ok(candidate) => Some((change.id, candidate)),
        Err(e) => {
            let err = CallError::CandidateRejected(format!("{}: {}", change.id, e));
            warn!("{}", err);
            None
        }
    }
}
