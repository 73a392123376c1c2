use crate::error::{CallError, CallResult, StoreError};
use crate::room::RoomPhase;
use crate::store::{Fields, SignalingStore, Subscription, from_fields, to_fields};
use serde_json::{Value, json};
use std::sync::Arc;
use tether_core::{RoomDocument, RoomId, RoomStatus, SessionDescription};
use tracing::{debug, info, warn};

/// Owns the lifecycle of one room document and is the only writer of its
/// fields on this side of the call.
pub struct RoomStateMachine {
    store: Arc<dyn SignalingStore>,
    collection: String,
    room_id: Option<RoomId>,
    phase: RoomPhase,
}

impl RoomStateMachine {
    pub fn new(store: Arc<dyn SignalingStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            room_id: None,
            phase: RoomPhase::Uninitialized,
        }
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    fn current_id(&self) -> CallResult<&RoomId> {
        self.room_id
            .as_ref()
            .ok_or(CallError::InvalidState("no room attached"))
    }

    async fn write(&self, fields: Value) -> CallResult<()> {
        let id = self.current_id()?;
        let fields = match fields {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        self.store
            .update_document(&self.collection, id.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Allocates a live room with neither offer nor answer.
    pub async fn create_room(&mut self) -> CallResult<RoomId> {
        if self.phase != RoomPhase::Uninitialized {
            return Err(CallError::InvalidState("room already created"));
        }

        let doc = to_fields(&RoomDocument::default())?;
        let id = RoomId::from(self.store.create_document(&self.collection, doc).await?);
        info!("Created room {}", id);

        self.room_id = Some(id.clone());
        self.phase = RoomPhase::Created;
        Ok(id)
    }

    /// Writes the initiator's offer. A repeated call overwrites the previous
    /// offer: the store offers no transactional guard against it.
    pub async fn publish_offer(&mut self, offer: &SessionDescription) -> CallResult<()> {
        match self.phase {
            RoomPhase::Created => {}
            RoomPhase::OfferPublished => {
                warn!(
                    "Offer for room {:?} published twice, last write wins",
                    self.room_id
                );
            }
            _ => return Err(CallError::InvalidState("offer published outside created room")),
        }

        self.write(json!({ "offer": offer })).await?;
        self.phase = RoomPhase::OfferPublished;
        debug!("Offer published for room {:?}", self.room_id);
        Ok(())
    }

    pub async fn read_room(&self, id: &RoomId) -> CallResult<RoomDocument> {
        let fields = self.store.get_document(&self.collection, id.as_str()).await?;
        Ok(from_fields(fields)?)
    }

    /// Reads `id` and attaches to it when it can be answered.
    ///
    /// Missing rooms, rooms without an offer, rooms that already carry an
    /// answer and ended rooms are all [`CallError::NotJoinable`].
    pub async fn join_room(&mut self, id: &RoomId) -> CallResult<RoomDocument> {
        if self.phase != RoomPhase::Uninitialized {
            return Err(CallError::InvalidState("room already attached"));
        }

        let doc = match self.read_room(id).await {
            Ok(doc) => doc,
            Err(CallError::Store(StoreError::NotFound { .. })) => {
                return Err(CallError::NotJoinable(id.clone()));
            }
            Err(e) => return Err(e),
        };

        if !doc.is_joinable() {
            info!(
                "Room {} is not joinable (offer: {}, answer: {}, status: {:?})",
                id,
                doc.offer.is_some(),
                doc.answer.is_some(),
                doc.status
            );
            return Err(CallError::NotJoinable(id.clone()));
        }

        self.room_id = Some(id.clone());
        self.phase = RoomPhase::OfferPublished;
        Ok(doc)
    }

    /// Writes the responder's answer. Requires an attached room whose offer
    /// has been observed.
    pub async fn publish_answer(&mut self, answer: &SessionDescription) -> CallResult<()> {
        match self.phase {
            RoomPhase::OfferPublished => {}
            RoomPhase::AnswerPublished => return Err(CallError::NegotiationConflict("answer")),
            RoomPhase::Uninitialized | RoomPhase::Created => {
                return Err(match self.room_id.clone() {
                    Some(id) => CallError::NotJoinable(id),
                    None => CallError::InvalidState("no offer observed"),
                });
            }
            RoomPhase::Ended => return Err(CallError::InvalidState("room already ended")),
        }

        self.write(json!({ "answer": answer })).await?;
        self.phase = RoomPhase::AnswerPublished;
        debug!("Answer published for room {:?}", self.room_id);
        Ok(())
    }

    /// Flips the room to ended. Returns whether a write happened: nothing is
    /// written for a room that never existed or already ended.
    pub async fn mark_ended(&mut self) -> CallResult<bool> {
        if self.phase.is_terminal() || self.room_id.is_none() {
            return Ok(false);
        }

        self.write(json!({ "status": RoomStatus::Ended })).await?;
        self.phase = RoomPhase::Ended;
        info!("Room {:?} marked ended", self.room_id);
        Ok(true)
    }

    /// The other side ended the room; record it without writing.
    pub fn observe_remote_end(&mut self) {
        if !self.phase.is_terminal() {
            info!("Room {:?} ended by the other side", self.room_id);
            self.phase = RoomPhase::Ended;
        }
    }

    /// Watches the attached room. `None` is delivered if the document
    /// disappears; undecodable snapshots are skipped.
    pub async fn subscribe<F>(&self, on_change: F) -> CallResult<Subscription>
    where
        F: Fn(Option<RoomDocument>) + Send + Sync + 'static,
    {
        let id = self.current_id()?.clone();
        let room = id.clone();
        let subscription = self
            .store
            .subscribe_document(
                &self.collection,
                id.as_str(),
                Box::new(move |snapshot| match snapshot.data {
                    None => on_change(None),
                    Some(fields) => match from_fields::<RoomDocument>(fields) {
                        Ok(doc) => on_change(Some(doc)),
                        Err(e) => warn!("Malformed snapshot of room {}: {}", room, e),
                    },
                }),
            )
            .await?;
        Ok(subscription)
    }
}
