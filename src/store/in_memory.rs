//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LockResult, Mutex, RwLock};

use super::{
    CollectionRef, DocumentData, DocumentRef, DocumentSnapshot, DocumentStore, SnapshotListener,
    StoreCall, StoreError,
};

/// Documents of one collection, keyed by id. Bodies are kept as JSON bytes.
type Documents = BTreeMap<String, Vec<u8>>;

struct Inner {
    collections: RwLock<HashMap<String, Documents>>,
    listeners: RwLock<HashMap<String, Vec<Arc<SnapshotListener>>>>,
    calls: RwLock<Vec<StoreCall>>,
    preset_ids: Mutex<VecDeque<String>>,
    write_failure: RwLock<Option<String>>,
    seq: AtomicU64,
}

/// In-memory document store that journals every call made against it.
///
/// Generated ids are zero-padded sequence numbers, so a collection snapshot
/// lists documents in creation order. Clone-friendly via Arc; clones share
/// documents, listeners and the journal.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                listeners: RwLock::new(HashMap::new()),
                calls: RwLock::new(Vec::new()),
                preset_ids: Mutex::new(VecDeque::new()),
                write_failure: RwLock::new(None),
                seq: AtomicU64::new(1),
            }),
        }
    }

    /// Queue ids to hand out, in order, before falling back to the sequence.
    pub fn with_preset_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        recover(self.inner.preset_ids.lock(), "preset ids")
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Write a document directly, bypassing the journal and listeners.
    pub fn seed(&self, collection: &str, id: &str, data: DocumentData) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&data).map_err(|e| StoreError::Serde(e.to_string()))?;
        let mut collections = self
            .inner
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("seed"))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), bytes);
        Ok(())
    }

    /// Make every subsequent `set` and `delete` fail with `Unavailable(reason)`.
    pub fn fail_writes(&self, reason: impl Into<String>) {
        *recover(self.inner.write_failure.write(), "write failure") = Some(reason.into());
    }

    pub fn restore_writes(&self) {
        *recover(self.inner.write_failure.write(), "write failure") = None;
    }

    /// Number of documents currently stored in a collection.
    pub fn len(&self, collection: &str) -> usize {
        recover(self.inner.collections.read(), "collections")
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        recover(self.inner.calls.read(), "journal").clone()
    }

    pub fn set_calls(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Set { .. }))
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Delete { .. }))
            .collect()
    }

    pub fn clear_calls(&self) {
        recover(self.inner.calls.write(), "journal").clear();
    }
}

impl DocumentStore for InMemoryDocumentStore {
    type Collection = InMemoryCollection;

    fn collection(&self, name: &str) -> InMemoryCollection {
        InMemoryCollection {
            name: name.to_string(),
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Bookkeeping locks stay usable after a panic on another thread, so no
/// journal entry or queued id is dropped.
fn recover<T>(lock: LockResult<T>, name: &'static str) -> T {
    lock.unwrap_or_else(|poisoned| {
        tracing::warn!(lock = name, "document store lock poisoned, recovering");
        poisoned.into_inner()
    })
}

impl Inner {
    fn record(&self, call: StoreCall) {
        recover(self.calls.write(), "journal").push(call);
    }

    fn next_id(&self) -> String {
        let preset = recover(self.preset_ids.lock(), "preset ids").pop_front();
        match preset {
            Some(id) => id,
            None => format!("{:020}", self.seq.fetch_add(1, Ordering::Relaxed)),
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        let failure = self
            .write_failure
            .read()
            .map_err(|_| StoreError::LockPoisoned("write check"))?;
        match failure.as_ref() {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn snapshot(&self, collection: &str) -> Result<Vec<DocumentSnapshot>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("snapshot"))?;

        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        documents
            .iter()
            .map(|(id, bytes)| -> Result<DocumentSnapshot, StoreError> {
                let data: DocumentData =
                    serde_json::from_slice(bytes).map_err(|e| StoreError::Serde(e.to_string()))?;
                Ok(DocumentSnapshot {
                    id: id.clone(),
                    data,
                })
            })
            .collect()
    }

    /// Deliver the current snapshot to every listener of `collection`.
    /// Must be called with no storage lock held.
    fn notify(&self, collection: &str) {
        let listeners: Vec<Arc<SnapshotListener>> = recover(self.listeners.read(), "listeners")
            .get(collection)
            .cloned()
            .unwrap_or_default();
        if listeners.is_empty() {
            return;
        }

        let snapshot = self.snapshot(collection);
        for listener in listeners {
            match &snapshot {
                Ok(documents) => listener(Ok(documents.as_slice())),
                Err(err) => listener(Err(err)),
            }
        }
    }
}

/// A collection handle of an [`InMemoryDocumentStore`].
#[derive(Clone)]
pub struct InMemoryCollection {
    name: String,
    inner: Arc<Inner>,
}

impl InMemoryCollection {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CollectionRef for InMemoryCollection {
    type Document = InMemoryDocument;

    fn document(&self) -> InMemoryDocument {
        let id = self.inner.next_id();
        self.inner.record(StoreCall::Allocate {
            collection: self.name.clone(),
            id: id.clone(),
        });
        InMemoryDocument {
            collection: self.name.clone(),
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    fn document_by_id(&self, id: &str) -> InMemoryDocument {
        self.inner.record(StoreCall::Resolve {
            collection: self.name.clone(),
            id: id.to_string(),
        });
        InMemoryDocument {
            collection: self.name.clone(),
            id: id.to_string(),
            inner: Arc::clone(&self.inner),
        }
    }

    fn snapshot(&self) -> Result<Vec<DocumentSnapshot>, StoreError> {
        self.inner.record(StoreCall::Snapshot {
            collection: self.name.clone(),
        });
        self.inner.snapshot(&self.name)
    }

    fn add_snapshot_listener(&self, listener: SnapshotListener) -> Result<(), StoreError> {
        self.inner.record(StoreCall::Listen {
            collection: self.name.clone(),
        });

        let listener = Arc::new(listener);
        {
            let mut listeners = self
                .inner
                .listeners
                .write()
                .map_err(|_| StoreError::LockPoisoned("listen"))?;
            listeners
                .entry(self.name.clone())
                .or_default()
                .push(Arc::clone(&listener));
        }

        match self.inner.snapshot(&self.name) {
            Ok(documents) => listener(Ok(documents.as_slice())),
            Err(err) => listener(Err(&err)),
        }
        Ok(())
    }
}

/// A document handle of an [`InMemoryDocumentStore`].
#[derive(Clone)]
pub struct InMemoryDocument {
    collection: String,
    id: String,
    inner: Arc<Inner>,
}

impl DocumentRef for InMemoryDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self) -> Result<Option<DocumentData>, StoreError> {
        self.inner.record(StoreCall::Get {
            collection: self.collection.clone(),
            id: self.id.clone(),
        });

        let collections = self
            .inner
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("get"))?;

        match collections.get(&self.collection).and_then(|docs| docs.get(&self.id)) {
            Some(bytes) => {
                let data =
                    serde_json::from_slice(bytes).map_err(|e| StoreError::Serde(e.to_string()))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    fn set(&self, data: DocumentData) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&data).map_err(|e| StoreError::Serde(e.to_string()))?;
        self.inner.record(StoreCall::Set {
            collection: self.collection.clone(),
            id: self.id.clone(),
            data,
        });
        self.inner.check_writable()?;

        {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::LockPoisoned("set"))?;
            collections
                .entry(self.collection.clone())
                .or_default()
                .insert(self.id.clone(), bytes);
        }

        self.inner.notify(&self.collection);
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        self.inner.record(StoreCall::Delete {
            collection: self.collection.clone(),
            id: self.id.clone(),
        });
        self.inner.check_writable()?;

        let removed = {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::LockPoisoned("delete"))?;
            collections
                .get_mut(&self.collection)
                .and_then(|docs| docs.remove(&self.id))
                .is_some()
        };

        if removed {
            self.inner.notify(&self.collection);
        }
        Ok(())
    }
}
