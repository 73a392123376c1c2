use crate::call::{CallEvent, CallState, ExitReason};
use crate::candidate::CandidateExchange;
use crate::config::CallConfig;
use crate::error::{CallError, CallResult};
use crate::media::MediaDevices;
use crate::room::RoomStateMachine;
use crate::session::{NegotiationSession, SessionState};
use crate::store::{SignalingStore, Subscription};
use crate::transport::TransportFactory;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};
use tether_core::{CallRole, RoomId, TrackKind};
use tokio::sync::{Mutex, Notify, mpsc, watch};
use tracing::{debug, info, warn};

/// Role-aware orchestrator for one call attempt.
///
/// A controller is single use: after [`Self::start`] or [`Self::join`] has
/// been called once, both return [`CallError::InvalidState`].
///
/// Locks are always taken in the order room, then session.
pub struct CallController {
    inner: Arc<ControllerInner>,
}

pub(super) struct ControllerInner {
    pub(super) config: CallConfig,
    pub(super) store: Arc<dyn SignalingStore>,
    pub(super) devices: Arc<dyn MediaDevices>,
    pub(super) transports: Arc<dyn TransportFactory>,
    pub(super) room: Mutex<RoomStateMachine>,
    pub(super) session: Mutex<Option<NegotiationSession>>,
    pub(super) exchange: OnceLock<CandidateExchange>,
    subscriptions: StdMutex<Vec<Subscription>>,
    claimed: AtomicBool,
    active: AtomicBool,
    state_tx: watch::Sender<CallState>,
    event_tx: mpsc::UnboundedSender<CallEvent>,
    pub(super) shutdown: Notify,
}

impl CallController {
    /// Returns the controller and the receiving end of its [`CallEvent`]s.
    pub fn new(
        config: CallConfig,
        store: Arc<dyn SignalingStore>,
        devices: Arc<dyn MediaDevices>,
        transports: Arc<dyn TransportFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<CallEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(CallState::default());
        let room = RoomStateMachine::new(store.clone(), config.rooms_collection.clone());

        let inner = ControllerInner {
            config,
            store,
            devices,
            transports,
            room: Mutex::new(room),
            session: Mutex::new(None),
            exchange: OnceLock::new(),
            subscriptions: StdMutex::new(Vec::new()),
            claimed: AtomicBool::new(false),
            active: AtomicBool::new(false),
            state_tx,
            event_tx,
            shutdown: Notify::new(),
        };

        (
            Self {
                inner: Arc::new(inner),
            },
            event_rx,
        )
    }

    pub fn state(&self) -> watch::Receiver<CallState> {
        self.inner.state_tx.subscribe()
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.inner.state_tx.borrow().room_id.clone()
    }

    /// Initiator: captures media, creates a room and publishes the offer.
    /// Returns the room id to share with the responder.
    pub async fn start(&self) -> CallResult<RoomId> {
        self.inner.claim(CallRole::Initiator)?;
        let result = self.inner.start_call().await;
        if let Err(e) = &result {
            self.inner.abort(e).await;
        }
        result
    }

    /// Responder: answers the offer found in `room_id`. Rooms that cannot be
    /// joined are refused before any media is captured.
    pub async fn join(&self, room_id: &RoomId) -> CallResult<()> {
        self.inner.claim(CallRole::Responder)?;
        let result = self.inner.join_call(room_id).await;
        if let Err(e) = &result {
            self.inner.abort(e).await;
        }
        result
    }

    /// Returns whether the microphone is now on.
    pub async fn toggle_mic(&self) -> CallResult<bool> {
        self.inner.toggle(TrackKind::Audio).await
    }

    /// Returns whether the camera is now on.
    pub async fn toggle_camera(&self) -> CallResult<bool> {
        self.inner.toggle(TrackKind::Video).await
    }

    /// Marks the room ended and releases everything. Repeated calls do
    /// nothing.
    pub async fn hang_up(&self) {
        self.inner.hang_up().await;
    }
}

impl Drop for CallController {
    fn drop(&mut self) {
        if !self.inner.deactivate() {
            return;
        }

        debug!("Call controller dropped while active");
        self.inner.release_subscriptions();
        self.inner.shutdown.notify_one();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let inner = self.inner.clone();
            handle.spawn(async move {
                inner.end_session().await;
            });
        }
    }
}

impl ControllerInner {
    fn claim(&self, role: CallRole) -> CallResult<()> {
        if self.claimed.swap(true, Ordering::SeqCst) {
            return Err(CallError::InvalidState("call controller already used"));
        }
        self.active.store(true, Ordering::SeqCst);
        self.state_tx.send_modify(|s| s.role = Some(role));
        info!("Call controller claimed as {}", role);
        Ok(())
    }

    pub(super) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns `true` for the one caller that moved the call out of the
    /// active state.
    pub(super) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }

    pub(super) fn emit(&self, event: CallEvent) {
        debug!("Call event: {:?}", event);
        let _ = self.event_tx.send(event);
    }

    pub(super) fn update_state<F: FnOnce(&mut CallState)>(&self, modify: F) {
        self.state_tx.send_modify(modify);
    }

    pub(super) fn sync_session(&self, session: &NegotiationSession) {
        let state = session.state();
        let mic_on = session.is_track_enabled(TrackKind::Audio);
        let cam_on = session.is_track_enabled(TrackKind::Video);
        self.update_state(|s| {
            s.session_state = state;
            s.mic_on = mic_on;
            s.cam_on = cam_on;
        });
    }

    pub(super) fn keep(&self, subscription: Subscription) {
        self.subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(subscription);
    }

    fn release_subscriptions(&self) {
        let subscriptions = std::mem::take(
            &mut *self
                .subscriptions
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
    }

    async fn end_session(&self) {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_mut() {
            session.end().await;
        }
        self.update_state(|s| {
            s.session_state = SessionState::Ended;
            s.mic_on = false;
            s.cam_on = false;
        });
    }

    /// Unsubscribes from the store, stops the signal loop and ends the
    /// session. Never writes to the room.
    pub(super) async fn teardown(&self) {
        self.release_subscriptions();
        self.shutdown.notify_one();
        self.end_session().await;
        info!("Call torn down");
    }

    async fn hang_up(&self) {
        if !self.deactivate() {
            debug!("Hang up ignored, call not active");
            return;
        }

        {
            let mut room = self.room.lock().await;
            match room.mark_ended().await {
                Ok(true) => {}
                Ok(false) => debug!("Room needed no end marker"),
                Err(e) => warn!("Failed to mark room ended: {}", e),
            }
        }

        self.teardown().await;
        self.emit(CallEvent::Exit(ExitReason::HungUp));
    }

    /// Releases whatever a failed start or join acquired. An initiator also
    /// ends the room it created.
    async fn abort(&self, err: &CallError) {
        warn!("Call setup failed: {}", err);
        if !self.deactivate() {
            return;
        }

        let role = self.state_tx.borrow().role;
        if role == Some(CallRole::Initiator) {
            let mut room = self.room.lock().await;
            if let Err(e) = room.mark_ended().await {
                warn!("Failed to end abandoned room: {}", e);
            }
        }

        self.teardown().await;
        let reason = match err {
            CallError::NotJoinable(_) => ExitReason::NotJoinable,
            other => ExitReason::Failed(other.to_string()),
        };
        self.emit(CallEvent::Exit(reason));
    }

    async fn toggle(&self, kind: TrackKind) -> CallResult<bool> {
        let slot = self.session.lock().await;
        let enabled = slot
            .as_ref()
            .and_then(|session| session.toggle_local_track(kind))
            .ok_or(CallError::InvalidState("no live local track"))?;

        self.update_state(|s| match kind {
            TrackKind::Audio => s.mic_on = enabled,
            TrackKind::Video => s.cam_on = enabled,
        });
        Ok(enabled)
    }
}
