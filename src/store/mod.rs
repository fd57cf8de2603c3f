//! Store - The remote document store as seen by the catalog.
//!
//! The catalog only needs a narrow slice of a document database: resolve a
//! collection, allocate or resolve a document slot, and overwrite, read or
//! delete that slot. Any backend (a hosted document service, a KV store, the
//! bundled in-memory fake) plugs in by implementing the three traits below.
//!
//! ## Example
//!
//! ```ignore
//! use movie_catalog::{CollectionRef, DocumentRef, DocumentStore, InMemoryDocumentStore};
//!
//! let store = InMemoryDocumentStore::new();
//! let movies = store.collection("movies");
//! let doc = movies.document();
//! doc.set(data)?;
//! assert!(movies.document_by_id(doc.id()).get()?.is_some());
//! ```

mod in_memory;

use serde_json::{Map, Value};
use std::fmt;

/// The fields of a stored document.
pub type DocumentData = Map<String, Value>;

/// Callback fed with the full contents of a collection whenever it changes.
pub type SnapshotListener =
    Box<dyn Fn(Result<&[DocumentSnapshot], &StoreError>) + Send + Sync + 'static>;

/// A document id paired with its stored fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub data: DocumentData,
}

/// Entry point of a document store.
pub trait DocumentStore: Send + Sync {
    type Collection: CollectionRef;

    /// Resolve a collection by name. Collections need not exist beforehand.
    fn collection(&self, name: &str) -> Self::Collection;
}

/// Handle to a named collection of documents.
pub trait CollectionRef: Send + Sync {
    type Document: DocumentRef;

    /// Allocate a new, uniquely identified document slot without writing data.
    fn document(&self) -> Self::Document;

    /// Resolve an existing slot by identifier.
    fn document_by_id(&self, id: &str) -> Self::Document;

    /// Read every document currently in the collection.
    fn snapshot(&self) -> Result<Vec<DocumentSnapshot>, StoreError>;

    /// Register a listener. It receives the current snapshot right away and
    /// again after every write to the collection.
    fn add_snapshot_listener(&self, listener: SnapshotListener) -> Result<(), StoreError>;
}

/// Handle to a single document slot.
pub trait DocumentRef {
    fn id(&self) -> &str;

    /// Read the document's fields. Returns None if nothing was written yet.
    fn get(&self) -> Result<Option<DocumentData>, StoreError>;

    /// Overwrite all fields of the document.
    fn set(&self, data: DocumentData) -> Result<(), StoreError>;

    fn delete(&self) -> Result<(), StoreError>;
}

/// One call made against a store, as recorded by a journaling store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Allocate { collection: String, id: String },
    Resolve { collection: String, id: String },
    Get { collection: String, id: String },
    Set {
        collection: String,
        id: String,
        data: DocumentData,
    },
    Delete { collection: String, id: String },
    Snapshot { collection: String },
    Listen { collection: String },
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or refused the call.
    Unavailable(String),
    NotFound { collection: String, id: String },
    /// Serialization/deserialization error.
    Serde(String),
    LockPoisoned(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "document store unavailable: {}", msg),
            StoreError::NotFound { collection, id } => {
                write!(f, "document not found: {}/{}", collection, id)
            }
            StoreError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            StoreError::LockPoisoned(operation) => {
                write!(f, "document store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}

pub use in_memory::InMemoryDocumentStore;
pub use in_memory::InMemoryCollection;
pub use in_memory::InMemoryDocument;
