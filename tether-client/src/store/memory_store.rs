use crate::error::StoreError;
use crate::store::{
    ChangeKind, DocumentHandler, DocumentSnapshot, Fields, RecordChange, RecordHandler,
    SignalingStore, Subscription,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, warn};
use uuid::Uuid;

/// One `update_document` call, kept for inspection.
#[derive(Debug, Clone)]
pub struct WriteRecord {
    pub collection: String,
    pub id: String,
    pub fields: Fields,
}

struct Watcher<H: ?Sized> {
    id: u64,
    live: Arc<AtomicBool>,
    handler: Arc<H>,
}

impl<H: ?Sized> Clone for Watcher<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            live: self.live.clone(),
            handler: self.handler.clone(),
        }
    }
}

type DocumentWatcher = Watcher<dyn Fn(DocumentSnapshot) + Send + Sync>;
type RecordWatcher = Watcher<dyn Fn(RecordChange) + Send + Sync>;

struct MemoryStoreInner {
    documents: DashMap<String, Fields>,
    records: DashMap<String, Vec<(String, Fields)>>,
    document_watchers: DashMap<String, Vec<DocumentWatcher>>,
    record_watchers: DashMap<String, Vec<RecordWatcher>>,
    next_watcher: AtomicU64,
    offline: AtomicBool,
    write_log: Mutex<Vec<WriteRecord>>,
    // Serializes write + notify so subscribers see changes in write order.
    order: Mutex<()>,
}

/// In-process [`SignalingStore`]. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

fn document_key(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}

fn records_key(collection: &str, parent_id: &str, sub_name: &str) -> String {
    format!("{collection}/{parent_id}/{sub_name}")
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryStoreInner {
                documents: DashMap::new(),
                records: DashMap::new(),
                document_watchers: DashMap::new(),
                record_watchers: DashMap::new(),
                next_watcher: AtomicU64::new(1),
                offline: AtomicBool::new(false),
                write_log: Mutex::new(Vec::new()),
                order: Mutex::new(()),
            }),
        }
    }

    /// While offline every operation fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Fields> {
        self.inner
            .documents
            .get(&document_key(collection, id))
            .map(|doc| doc.value().clone())
    }

    /// Ids of every document in `collection`, in no particular order.
    pub fn document_ids(&self, collection: &str) -> Vec<String> {
        let prefix = format!("{collection}/");
        self.inner
            .documents
            .iter()
            .filter_map(|doc| doc.key().strip_prefix(&prefix).map(str::to_owned))
            .collect()
    }

    pub fn records(&self, collection: &str, parent_id: &str, sub_name: &str) -> Vec<Fields> {
        self.inner
            .records
            .get(&records_key(collection, parent_id, sub_name))
            .map(|list| list.iter().map(|(_, fields)| fields.clone()).collect())
            .unwrap_or_default()
    }

    /// Every `update_document` call made against one document, oldest first.
    pub fn writes_to(&self, collection: &str, id: &str) -> Vec<Fields> {
        self.lock_log()
            .iter()
            .filter(|w| w.collection == collection && w.id == id)
            .map(|w| w.fields.clone())
            .collect()
    }

    /// Inserts a document under a caller-chosen id without notifying anyone.
    pub fn seed_document(&self, collection: &str, id: &str, fields: Fields) {
        self.inner
            .documents
            .insert(document_key(collection, id), fields);
    }

    /// Sends the current snapshot to every subscriber of the document again,
    /// as an at-least-once store may.
    pub fn redeliver(&self, collection: &str, id: &str) {
        let _order = self.lock_order();
        self.notify_document(collection, id);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_owned()));
        }
        Ok(())
    }

    fn lock_order(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .order
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<WriteRecord>> {
        self.inner
            .write_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self, collection: &str, id: &str) -> DocumentSnapshot {
        DocumentSnapshot {
            id: id.to_owned(),
            data: self.document(collection, id),
        }
    }

    fn notify_document(&self, collection: &str, id: &str) {
        let key = document_key(collection, id);
        let watchers: Vec<DocumentWatcher> = match self.inner.document_watchers.get(&key) {
            Some(list) => list.value().clone(),
            None => return,
        };

        let snapshot = self.snapshot(collection, id);
        for watcher in watchers {
            if watcher.live.load(Ordering::SeqCst) {
                (watcher.handler)(snapshot.clone());
            }
        }
    }

    fn notify_record(&self, key: &str, change: RecordChange) {
        let watchers: Vec<RecordWatcher> = match self.inner.record_watchers.get(key) {
            Some(list) => list.value().clone(),
            None => return,
        };

        for watcher in watchers {
            if watcher.live.load(Ordering::SeqCst) {
                (watcher.handler)(change.clone());
            }
        }
    }

    fn next_watcher_id(&self) -> u64 {
        self.inner.next_watcher.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unsubscribe_document(inner: Weak<MemoryStoreInner>, key: String, watcher_id: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    if let Some(mut list) = inner.document_watchers.get_mut(&key) {
        list.retain(|w| w.id != watcher_id);
    }
}

fn unsubscribe_records(inner: Weak<MemoryStoreInner>, key: String, watcher_id: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    if let Some(mut list) = inner.record_watchers.get_mut(&key) {
        list.retain(|w| w.id != watcher_id);
    }
}

#[async_trait]
impl SignalingStore for MemoryStore {
    async fn create_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<String, StoreError> {
        self.ensure_online()?;

        let id = Uuid::new_v4().simple().to_string();
        let _order = self.lock_order();
        self.inner
            .documents
            .insert(document_key(collection, &id), fields);
        debug!("Created document {}/{}", collection, id);
        self.notify_document(collection, &id);
        Ok(id)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Fields, StoreError> {
        self.ensure_online()?;

        self.document(collection, id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;

        let key = document_key(collection, id);
        let _order = self.lock_order();
        {
            let Some(mut doc) = self.inner.documents.get_mut(&key) else {
                return Err(StoreError::NotFound {
                    collection: collection.to_owned(),
                    id: id.to_owned(),
                });
            };
            for (name, value) in fields.iter() {
                doc.insert(name.clone(), value.clone());
            }
        }

        self.lock_log().push(WriteRecord {
            collection: collection.to_owned(),
            id: id.to_owned(),
            fields,
        });
        self.notify_document(collection, id);
        Ok(())
    }

    async fn append_to_subcollection(
        &self,
        collection: &str,
        parent_id: &str,
        sub_name: &str,
        record: Fields,
    ) -> Result<String, StoreError> {
        self.ensure_online()?;

        if !self
            .inner
            .documents
            .contains_key(&document_key(collection, parent_id))
        {
            warn!(
                "Appending to {} of missing document {}/{}",
                sub_name, collection, parent_id
            );
        }

        let key = records_key(collection, parent_id, sub_name);
        let id = Uuid::new_v4().simple().to_string();
        let _order = self.lock_order();
        self.inner
            .records
            .entry(key.clone())
            .or_default()
            .push((id.clone(), record.clone()));

        self.notify_record(
            &key,
            RecordChange {
                kind: ChangeKind::Added,
                id: id.clone(),
                data: record,
            },
        );
        Ok(id)
    }

    async fn subscribe_document(
        &self,
        collection: &str,
        id: &str,
        on_change: DocumentHandler,
    ) -> Result<Subscription, StoreError> {
        self.ensure_online()?;

        let key = document_key(collection, id);
        let watcher: DocumentWatcher = Watcher {
            id: self.next_watcher_id(),
            live: Arc::new(AtomicBool::new(true)),
            handler: Arc::from(on_change),
        };

        let _order = self.lock_order();
        (watcher.handler)(self.snapshot(collection, id));
        self.inner
            .document_watchers
            .entry(key.clone())
            .or_default()
            .push(watcher.clone());

        let weak = Arc::downgrade(&self.inner);
        let live = watcher.live;
        let watcher_id = watcher.id;
        Ok(Subscription::new(move || {
            live.store(false, Ordering::SeqCst);
            unsubscribe_document(weak, key, watcher_id);
        }))
    }

    async fn subscribe_subcollection(
        &self,
        collection: &str,
        parent_id: &str,
        sub_name: &str,
        on_added: RecordHandler,
    ) -> Result<Subscription, StoreError> {
        self.ensure_online()?;

        let key = records_key(collection, parent_id, sub_name);
        let watcher: RecordWatcher = Watcher {
            id: self.next_watcher_id(),
            live: Arc::new(AtomicBool::new(true)),
            handler: Arc::from(on_added),
        };

        let _order = self.lock_order();
        let existing: Vec<(String, Fields)> = self
            .inner
            .records
            .get(&key)
            .map(|list| list.value().clone())
            .unwrap_or_default();
        for (record_id, data) in existing {
            (watcher.handler)(RecordChange {
                kind: ChangeKind::Added,
                id: record_id,
                data,
            });
        }
        self.inner
            .record_watchers
            .entry(key.clone())
            .or_default()
            .push(watcher.clone());

        let weak = Arc::downgrade(&self.inner);
        let live = watcher.live;
        let watcher_id = watcher.id;
        Ok(Subscription::new(move || {
            live.store(false, Ordering::SeqCst);
            unsubscribe_records(weak, key, watcher_id);
        }))
    }
}
