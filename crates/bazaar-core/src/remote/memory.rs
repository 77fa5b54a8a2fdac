//! In-memory remote store.
//!
//! Behaves like the hosted document database closely enough to drive the
//! sync pipeline without a network: documents are ordered by id, every
//! write pushes a full snapshot to the listeners of its collection, and
//! failures can be injected for the next call.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::decode::RawRecord;
use crate::paths::CollectionPath;

use super::{
    Filter, ListenerRegistration, LiveQuery, RemoteError, RemoteErrorKind, RemoteGateway,
    RemoteResult, SnapshotEvent,
};

/// A call received by [`MemoryGateway`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create { path: String, id: String },
    Set { path: String, id: String },
    Update { path: String, id: String },
    Delete { path: String, id: String },
    Get { path: String, id: String },
    Query { path: String },
    Upload { bucket_path: String },
}

struct Listener {
    path: CollectionPath,
    sender: mpsc::UnboundedSender<SnapshotEvent>,
}

#[derive(Default)]
struct MemoryState {
    collections: HashMap<CollectionPath, BTreeMap<String, RawRecord>>,
    listeners: BTreeMap<u64, Listener>,
    next_listener_id: u64,
    blobs: HashMap<String, (Vec<u8>, String)>,
    pending_failures: VecDeque<RemoteError>,
    operations: Vec<Operation>,
}

impl MemoryState {
    fn snapshot(&self, path: &CollectionPath) -> Vec<RawRecord> {
        self.collections
            .get(path)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default()
    }

    fn broadcast(&mut self, path: &CollectionPath, event: &SnapshotEvent) {
        let mut closed = Vec::new();
        for (id, listener) in &self.listeners {
            if &listener.path == path && listener.sender.send(event.clone()).is_err() {
                closed.push(*id);
            }
        }
        for id in closed {
            self.listeners.remove(&id);
        }
    }

    fn publish(&mut self, path: &CollectionPath) {
        let snapshot = self.snapshot(path);
        tracing::debug!(
            "Pushing {} records to listeners of {}",
            snapshot.len(),
            path
        );
        self.broadcast(path, &Ok(snapshot));
    }

    fn begin(&mut self, operation: Operation) -> RemoteResult<()> {
        self.operations.push(operation);
        self.pending_failures.pop_front().map_or(Ok(()), Err)
    }
}

/// Thread-safe in-memory implementation of [`RemoteGateway`].
#[derive(Clone)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
    blob_base_url: String,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl MemoryGateway {
    /// Create an empty store building blob URLs from `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            blob_base_url: config.blob_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next gateway call (other than `subscribe`) fail with `error`.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().pending_failures.push_back(error);
    }

    /// Deliver `error` to every live listener of `path`.
    pub fn push_error(&self, path: &CollectionPath, error: RemoteError) {
        self.lock().broadcast(path, &Err(error));
    }

    /// Number of live listeners registered for `path`.
    pub fn listener_count(&self, path: &CollectionPath) -> usize {
        self.lock()
            .listeners
            .values()
            .filter(|listener| &listener.path == path && !listener.sender.is_closed())
            .count()
    }

    /// Every call received so far.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().operations.clone()
    }

    /// Contents and content type of an uploaded blob.
    pub fn blob(&self, bucket_path: &str) -> Option<(Vec<u8>, String)> {
        self.lock().blobs.get(bucket_path).cloned()
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn create(
        &self,
        path: &CollectionPath,
        id_field: &str,
        mut fields: RawRecord,
    ) -> RemoteResult<String> {
        let id = Uuid::now_v7().to_string();
        let mut state = self.lock();
        state.begin(Operation::Create {
            path: path.to_string(),
            id: id.clone(),
        })?;
        fields.insert(id_field.to_string(), Value::from(id.clone()));
        state
            .collections
            .entry(path.clone())
            .or_default()
            .insert(id.clone(), fields);
        state.publish(path);
        Ok(id)
    }

    async fn set(&self, path: &CollectionPath, id: &str, fields: RawRecord) -> RemoteResult<()> {
        let mut state = self.lock();
        state.begin(Operation::Set {
            path: path.to_string(),
            id: id.to_string(),
        })?;
        state
            .collections
            .entry(path.clone())
            .or_default()
            .insert(id.to_string(), fields);
        state.publish(path);
        Ok(())
    }

    async fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: RawRecord,
    ) -> RemoteResult<()> {
        let mut state = self.lock();
        state.begin(Operation::Update {
            path: path.to_string(),
            id: id.to_string(),
        })?;
        let document = state
            .collections
            .get_mut(path)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| RemoteError::not_found(format!("no document {path}/{id}")))?;
        document.extend(fields);
        state.publish(path);
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> RemoteResult<()> {
        let mut state = self.lock();
        state.begin(Operation::Delete {
            path: path.to_string(),
            id: id.to_string(),
        })?;
        let removed = state
            .collections
            .get_mut(path)
            .and_then(|documents| documents.remove(id))
            .is_some();
        if removed {
            state.publish(path);
        }
        Ok(())
    }

    async fn get(&self, path: &CollectionPath, id: &str) -> RemoteResult<Option<RawRecord>> {
        let mut state = self.lock();
        state.begin(Operation::Get {
            path: path.to_string(),
            id: id.to_string(),
        })?;
        Ok(state
            .collections
            .get(path)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn query(&self, path: &CollectionPath, filter: &Filter) -> RemoteResult<Vec<RawRecord>> {
        let mut state = self.lock();
        state.begin(Operation::Query {
            path: path.to_string(),
        })?;
        Ok(state
            .snapshot(path)
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    fn subscribe(&self, path: &CollectionPath) -> LiveQuery {
        let (sender, events) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = state.next_listener_id;
        state.next_listener_id += 1;

        // Initial read goes out before any later write can be pushed.
        let _ = sender.send(Ok(state.snapshot(path)));
        state.listeners.insert(
            id,
            Listener {
                path: path.clone(),
                sender,
            },
        );
        tracing::debug!("Registered listener {} on {}", id, path);

        LiveQuery {
            registration: Box::new(MemoryRegistration {
                state: Arc::downgrade(&self.state),
                id,
                removed: false,
            }),
            events,
        }
    }

    async fn upload_blob(
        &self,
        bucket_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RemoteResult<String> {
        let bucket_path = bucket_path.trim().trim_matches('/').to_string();
        let mut state = self.lock();
        state.begin(Operation::Upload {
            bucket_path: bucket_path.clone(),
        })?;
        if bucket_path.is_empty() {
            return Err(RemoteError::new(
                RemoteErrorKind::Unknown,
                "blob path cannot be empty",
            ));
        }
        state
            .blobs
            .insert(bucket_path.clone(), (bytes, content_type.to_string()));
        Ok(format!("{}/{bucket_path}", self.blob_base_url))
    }
}

struct MemoryRegistration {
    state: Weak<Mutex<MemoryState>>,
    id: u64,
    removed: bool,
}

impl ListenerRegistration for MemoryRegistration {
    fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        if let Some(state) = self.state.upgrade() {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.listeners.remove(&self.id);
            tracing::debug!("Removed listener {}", self.id);
        }
    }
}

impl Drop for MemoryRegistration {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::RemoteDecode;
    use crate::models::Item;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn subscribe_delivers_initial_read_then_each_write() {
        let gateway = MemoryGateway::default();
        let path = CollectionPath::items();
        gateway
            .set(&path, "a", fields(json!({ "itemID": "a" })))
            .await
            .unwrap();

        let mut live = gateway.subscribe(&path);
        gateway
            .set(&path, "b", fields(json!({ "itemID": "b" })))
            .await
            .unwrap();

        let first = live.events.recv().await.unwrap().unwrap();
        let second = live.events.recv().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn writes_to_other_paths_are_not_pushed() {
        let gateway = MemoryGateway::default();
        let mut live = gateway.subscribe(&CollectionPath::items());
        let _initial = live.events.recv().await.unwrap();

        gateway
            .set(&CollectionPath::users(), "u1", RawRecord::new())
            .await
            .unwrap();
        assert!(live.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn removed_registration_stops_pushes() {
        let gateway = MemoryGateway::default();
        let path = CollectionPath::items();
        let mut live = gateway.subscribe(&path);
        assert_eq!(gateway.listener_count(&path), 1);

        live.registration.remove();
        live.registration.remove();
        assert_eq!(gateway.listener_count(&path), 0);

        let _initial = live.events.recv().await.unwrap();
        gateway.set(&path, "a", RawRecord::new()).await.unwrap();
        assert!(live.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let gateway = MemoryGateway::default();
        let path = CollectionPath::items();
        gateway.fail_next(RemoteError::network("offline"));

        let err = gateway.set(&path, "a", RawRecord::new()).await.unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::Network);
        assert!(gateway.get(&path, "a").await.unwrap().is_none());

        gateway.set(&path, "a", RawRecord::new()).await.unwrap();
        assert!(gateway.get(&path, "a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn created_document_carries_its_generated_id() {
        let gateway = MemoryGateway::default();
        let path = CollectionPath::items();
        let mut live = gateway.subscribe(&path);
        let _initial = live.events.recv().await.unwrap();

        let id = gateway
            .create(&path, "itemID", fields(json!({ "sellerID": "u1" })))
            .await
            .unwrap();

        let stored = gateway.get(&path, &id).await.unwrap().unwrap();
        let item = Item::decode(&stored);
        assert_eq!(item.item_id, id);
        assert_eq!(item.seller_id, "u1");

        let pushed = live.events.recv().await.unwrap().unwrap();
        assert_eq!(pushed, vec![stored]);
    }

    #[tokio::test]
    async fn created_ids_are_unique() {
        let gateway = MemoryGateway::default();
        let path = CollectionPath::items();
        let first = gateway.create(&path, "itemID", RawRecord::new()).await.unwrap();
        let second = gateway.create(&path, "itemID", RawRecord::new()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let gateway = MemoryGateway::default();
        let err = gateway
            .update(&CollectionPath::items(), "ghost", RawRecord::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::NotFound);
    }

    #[tokio::test]
    async fn query_filters_and_orders_by_id() {
        let gateway = MemoryGateway::default();
        let path = CollectionPath::items();
        for (id, seller) in [("c", "u1"), ("a", "u1"), ("b", "u2")] {
            gateway
                .set(&path, id, fields(json!({ "itemID": id, "sellerID": seller })))
                .await
                .unwrap();
        }

        let mine = gateway
            .query(&path, &Filter::field_equals("sellerID", "u1"))
            .await
            .unwrap();
        let ids: Vec<_> = mine.iter().map(|record| record["itemID"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("c")]);
    }

    #[tokio::test]
    async fn upload_blob_returns_url_under_base() {
        let gateway = MemoryGateway::default();
        let url = gateway
            .upload_blob("/itemsPhotos/i1.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "memory://bazaar/itemsPhotos/i1.jpg");
        let (bytes, content_type) = gateway.blob("itemsPhotos/i1.jpg").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(content_type, "image/jpeg");
    }
}
