use crate::error::StoreError;
use crate::store::Subscription;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Current state of a watched document. `data` is `None` when the document
/// does not exist.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub id: String,
    pub data: Option<Fields>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One change in a watched sub-collection.
#[derive(Debug, Clone)]
pub struct RecordChange {
    pub kind: ChangeKind,
    pub id: String,
    pub data: Fields,
}

pub type DocumentHandler = Box<dyn Fn(DocumentSnapshot) + Send + Sync>;
pub type RecordHandler = Box<dyn Fn(RecordChange) + Send + Sync>;

/// Shared document store used as the relay between the two participants.
///
/// Implementations deliver change notifications for one document (or one
/// sub-collection) in write order. A fresh document subscription starts with
/// a snapshot of the current state; a fresh sub-collection subscription
/// starts with every existing record reported as [`ChangeKind::Added`].
/// Delivery may be repeated.
#[async_trait]
pub trait SignalingStore: Send + Sync {
    async fn create_document(&self, collection: &str, fields: Fields)
    -> Result<String, StoreError>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Fields, StoreError>;

    /// Merges `fields` into the existing document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    async fn append_to_subcollection(
        &self,
        collection: &str,
        parent_id: &str,
        sub_name: &str,
        record: Fields,
    ) -> Result<String, StoreError>;

    async fn subscribe_document(
        &self,
        collection: &str,
        id: &str,
        on_change: DocumentHandler,
    ) -> Result<Subscription, StoreError>;

    async fn subscribe_subcollection(
        &self,
        collection: &str,
        parent_id: &str,
        sub_name: &str,
        on_added: RecordHandler,
    ) -> Result<Subscription, StoreError>;
}

/// Serializes a value that is expected to be a JSON object into a field map.
pub fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Malformed(serde::de::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

pub fn from_fields<T: serde::de::DeserializeOwned>(fields: Fields) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(fields))?)
}
