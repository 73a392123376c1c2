use crate::call::call_controller::ControllerInner;
use crate::call::signal_loop::Signal;
use crate::call::CallEvent;
use crate::candidate::CandidateExchange;
use crate::error::{CallError, CallResult};
use crate::session::NegotiationSession;
use crate::store::Subscription;
use crate::transport::TransportEvent;
use std::sync::Arc;
use tether_core::{CallRole, RoomId};
use tokio::sync::mpsc;
use tracing::info;

const TRANSPORT_EVENT_BUFFER: usize = 256;

impl ControllerInner {
    fn ensure_still_active(&self) -> CallResult<()> {
        if !self.is_active() {
            return Err(CallError::InvalidState("call ended during setup"));
        }
        Ok(())
    }

    fn install_exchange(&self, room_id: RoomId, role: CallRole) -> &CandidateExchange {
        self.exchange
            .get_or_init(|| CandidateExchange::new(self.store.clone(), &self.config, room_id, role))
    }

    async fn subscribe_remote_candidates(
        &self,
        exchange: &CandidateExchange,
        signal_tx: mpsc::UnboundedSender<Signal>,
    ) -> CallResult<Subscription> {
        exchange
            .subscribe_remote(move |id, candidate| {
                let _ = signal_tx.send(Signal::RemoteCandidate { id, candidate });
            })
            .await
    }

    /// Initiator order: media, room, transport, offer, candidate relay,
    /// offer publication, room and callee candidate subscriptions.
    pub(super) async fn start_call(self: &Arc<Self>) -> CallResult<RoomId> {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (transport_tx, transport_rx) = mpsc::channel::<TransportEvent>(TRANSPORT_EVENT_BUFFER);

        let mut room = self.room.lock().await;
        let mut slot = self.session.lock().await;
        self.ensure_still_active()?;
        let session = slot.insert(NegotiationSession::new(CallRole::Initiator));

        session
            .acquire_local_media(self.devices.as_ref(), &self.config.media)
            .await?;
        self.sync_session(session);

        let room_id = room.create_room().await?;
        self.update_state(|s| s.room_id = Some(room_id.clone()));

        let transport = self
            .transports
            .create(&self.config.transport, transport_tx)
            .await?;
        session.attach_transport(transport).await?;
        let offer = session.create_offer().await?;

        let exchange = self.install_exchange(room_id.clone(), CallRole::Initiator);
        room.publish_offer(&offer).await?;

        let tx = signal_tx.clone();
        self.keep(
            room.subscribe(move |doc| {
                let _ = tx.send(Signal::Room(doc));
            })
            .await?,
        );
        self.keep(self.subscribe_remote_candidates(exchange, signal_tx).await?);

        self.sync_session(session);
        drop(slot);
        drop(room);

        info!("Room {} open, waiting for a responder", room_id);
        self.spawn_signal_loop(signal_rx, transport_rx);
        self.emit(CallEvent::RoomCreated(room_id.clone()));
        Ok(room_id)
    }

    /// Responder order: room check, media, transport, offer acceptance,
    /// candidate relay, answer publication, caller candidate and room
    /// subscriptions.
    pub(super) async fn join_call(self: &Arc<Self>, room_id: &RoomId) -> CallResult<()> {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (transport_tx, transport_rx) = mpsc::channel::<TransportEvent>(TRANSPORT_EVENT_BUFFER);

        let mut room = self.room.lock().await;
        let doc = room.join_room(room_id).await?;
        let offer = doc
            .offer
            .ok_or_else(|| CallError::NotJoinable(room_id.clone()))?;
        self.update_state(|s| s.room_id = Some(room_id.clone()));

        let mut slot = self.session.lock().await;
        self.ensure_still_active()?;
        let session = slot.insert(NegotiationSession::new(CallRole::Responder));

        session
            .acquire_local_media(self.devices.as_ref(), &self.config.media)
            .await?;
        self.sync_session(session);

        let transport = self
            .transports
            .create(&self.config.transport, transport_tx)
            .await?;
        session.attach_transport(transport.clone()).await?;
        let answer = session.accept_offer(offer).await?;

        let exchange = self.install_exchange(room_id.clone(), CallRole::Responder);
        exchange.remote_description_ready(transport.as_ref()).await;
        room.publish_answer(&answer).await?;

        self.keep(
            self.subscribe_remote_candidates(exchange, signal_tx.clone())
                .await?,
        );
        let tx = signal_tx;
        self.keep(
            room.subscribe(move |doc| {
                let _ = tx.send(Signal::Room(doc));
            })
            .await?,
        );

        self.sync_session(session);
        drop(slot);
        drop(room);

        info!("Joined room {}", room_id);
        self.spawn_signal_loop(signal_rx, transport_rx);
        Ok(())
    }
}
