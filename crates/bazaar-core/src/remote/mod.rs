//! Remote store contract.
//!
//! Everything the client knows about the hosted document database and
//! object storage goes through [`RemoteGateway`]. Calls report failures as
//! [`RemoteError`] values; nothing here retries or times out on its own.

mod memory;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::decode::RawRecord;
use crate::paths::CollectionPath;

pub use memory::{MemoryGateway, Operation};

/// Category of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    Network,
    PermissionDenied,
    NotFound,
    Unknown,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Failure reported by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Network, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::PermissionDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// One push from a live query: a full snapshot, or an error.
pub type SnapshotEvent = RemoteResult<Vec<RawRecord>>;

/// Record filter for one-shot queries.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Every record of the collection.
    #[default]
    All,
    /// Records whose `field` equals `value` exactly.
    FieldEquals { field: String, value: Value },
}

impl Filter {
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Check whether `record` passes this filter.
    #[must_use]
    pub fn matches(&self, record: &RawRecord) -> bool {
        match self {
            Self::All => true,
            Self::FieldEquals { field, value } => record.get(field) == Some(value),
        }
    }
}

/// Live registration with the remote store for one collection path.
///
/// After `remove` returns the store sends no further events for it.
/// Calling `remove` more than once is a no-op.
pub trait ListenerRegistration: Send {
    fn remove(&mut self);
}

/// A started live query: its registration and the ordered event stream.
///
/// The first event is the initial read of the collection.
pub struct LiveQuery {
    pub registration: Box<dyn ListenerRegistration>,
    pub events: mpsc::UnboundedReceiver<SnapshotEvent>,
}

impl fmt::Debug for LiveQuery {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LiveQuery")
            .field("registration", &"..")
            .finish_non_exhaustive()
    }
}

/// Read/write/query/upload façade over the remote store.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Add a document with a store-generated id and return that id.
    ///
    /// The id is also written into the document under `id_field`, so the
    /// stored record carries its own identity.
    async fn create(
        &self,
        path: &CollectionPath,
        id_field: &str,
        fields: RawRecord,
    ) -> RemoteResult<String>;

    /// Write a document with a known id, replacing any previous content.
    async fn set(&self, path: &CollectionPath, id: &str, fields: RawRecord) -> RemoteResult<()>;

    /// Merge `fields` into an existing document. Fails with `NotFound` if
    /// the document does not exist.
    async fn update(&self, path: &CollectionPath, id: &str, fields: RawRecord)
        -> RemoteResult<()>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, path: &CollectionPath, id: &str) -> RemoteResult<()>;

    /// Read a single document.
    async fn get(&self, path: &CollectionPath, id: &str) -> RemoteResult<Option<RawRecord>>;

    /// Read every document of a collection matching `filter`.
    async fn query(&self, path: &CollectionPath, filter: &Filter) -> RemoteResult<Vec<RawRecord>>;

    /// Start a live query. Never fails here; errors arrive on the stream.
    fn subscribe(&self, path: &CollectionPath) -> LiveQuery;

    /// Store a blob and return its download URL.
    async fn upload_blob(
        &self,
        bucket_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RemoteResult<String>;
}
