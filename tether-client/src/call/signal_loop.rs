use crate::call::call_controller::ControllerInner;
use crate::call::{CallEvent, ExitReason};
use crate::transport::TransportEvent;
use std::sync::Arc;
use tether_core::{CallRole, CandidateRecord, RoomDocument, SessionDescription};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Store notifications forwarded into the signal loop.
pub(super) enum Signal {
    Room(Option<RoomDocument>),
    RemoteCandidate {
        id: String,
        candidate: CandidateRecord,
    },
}

impl ControllerInner {
    pub(super) fn spawn_signal_loop(
        self: &Arc<Self>,
        signal_rx: mpsc::UnboundedReceiver<Signal>,
        transport_rx: mpsc::Receiver<TransportEvent>,
    ) {
        let inner = self.clone();
        tokio::spawn(async move {
            inner.run_signal_loop(signal_rx, transport_rx).await;
        });
    }

    async fn run_signal_loop(
        self: Arc<Self>,
        mut signal_rx: mpsc::UnboundedReceiver<Signal>,
        mut transport_rx: mpsc::Receiver<TransportEvent>,
    ) {
        info!("Signal loop started");

        while self.is_active() {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    debug!("Signal loop shutdown requested");
                    break;
                }

                signal = signal_rx.recv() => {
                    match signal {
                        Some(s) => self.handle_signal(s).await,
                        None => {
                            info!("Store subscriptions closed");
                            break;
                        }
                    }
                }

                evt = transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!("Signal loop finished");
    }

    async fn handle_signal(&self, signal: Signal) {
        if !self.is_active() {
            return;
        }

        match signal {
            Signal::Room(None) => {
                warn!("Room document disappeared");
                self.on_remote_end().await;
            }
            Signal::Room(Some(doc)) if doc.is_ended() => self.on_remote_end().await,
            Signal::Room(Some(doc)) => {
                if let Some(answer) = doc.answer {
                    self.on_answer(answer).await;
                }
            }
            Signal::RemoteCandidate { id, candidate } => {
                self.on_remote_candidate(&id, candidate).await;
            }
        }
    }

    async fn handle_transport_event(&self, event: TransportEvent) {
        if !self.is_active() {
            return;
        }

        match event {
            TransportEvent::CandidateGenerated(candidate) => match self.exchange.get() {
                Some(exchange) => exchange.publish_local(&candidate).await,
                None => debug!("Local candidate before relay start dropped"),
            },
            TransportEvent::RemoteTrack(stream) => {
                let first = {
                    let mut slot = self.session.lock().await;
                    slot.as_mut()
                        .is_some_and(|session| session.on_remote_track(stream.clone()))
                };
                if first {
                    self.update_state(|s| s.remote_stream_available = true);
                    self.emit(CallEvent::RemoteStream(stream));
                }
            }
            TransportEvent::StateChanged(state) => {
                let session_state = {
                    let mut slot = self.session.lock().await;
                    slot.as_mut().map(|session| session.on_connection_state(state))
                };
                self.update_state(|s| {
                    s.connection_state = state;
                    if let Some(session_state) = session_state {
                        s.session_state = session_state;
                    }
                });
            }
        }
    }

    async fn on_answer(&self, answer: SessionDescription) {
        let transport = {
            let mut slot = self.session.lock().await;
            let Some(session) = slot.as_mut() else {
                return;
            };
            if session.role() != CallRole::Initiator {
                return;
            }
            match session.apply_answer(answer).await {
                Ok(true) => session.transport().cloned(),
                Ok(false) => None,
                Err(e) => {
                    error!("Failed to apply answer: {}", e);
                    None
                }
            }
        };

        if let (Some(transport), Some(exchange)) = (transport, self.exchange.get()) {
            let flushed = exchange.remote_description_ready(transport.as_ref()).await;
            debug!("Applied {} queued remote candidate(s)", flushed);
        }
    }

    async fn on_remote_candidate(&self, id: &str, candidate: CandidateRecord) {
        let Some(exchange) = self.exchange.get() else {
            return;
        };
        let transport = {
            let slot = self.session.lock().await;
            slot.as_ref().and_then(|session| session.transport().cloned())
        };
        let Some(transport) = transport else {
            return;
        };
        exchange
            .accept_remote(id, candidate, transport.as_ref())
            .await;
    }

    /// The other side wrote `status=ended`: tear down without writing.
    async fn on_remote_end(&self) {
        if !self.deactivate() {
            return;
        }

        self.room.lock().await.observe_remote_end();
        self.teardown().await;
        self.emit(CallEvent::Exit(ExitReason::RemoteEnded));
    }
}
