mod catalog;
mod error;
mod movie;
mod store;

pub use catalog::{CatalogConfig, CatalogProvider, DataStatus, LogStatus, DEFAULT_COLLECTION};
pub use error::{CatalogError, InvalidArgument};
pub use movie::Movie;
pub use store::{
    CollectionRef, DocumentData, DocumentRef, DocumentSnapshot, DocumentStore,
    InMemoryCollection, InMemoryDocument, InMemoryDocumentStore, SnapshotListener, StoreCall,
    StoreError,
};
