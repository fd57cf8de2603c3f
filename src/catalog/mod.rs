//! Catalog - The validating movie provider and its collaborators.
//!
//! `CatalogProvider` owns the local cache of movies and gates every mutation
//! of the remote collection behind its checks: titles are unique on add,
//! updates need an id the store agrees with and a non-empty title.
//!
//! ## Example
//!
//! ```ignore
//! use movie_catalog::{CatalogProvider, InMemoryDocumentStore, Movie};
//!
//! let store = InMemoryDocumentStore::new();
//! let catalog = CatalogProvider::new(&store);
//!
//! let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
//! catalog.add_movie(&mut movie)?;
//! assert!(movie.is_persisted());
//!
//! catalog.update_movie(&mut movie, "Oppenheimer", "Biopic", 2023)?;
//! catalog.delete_movie(&movie)?;
//! ```

mod config;
mod provider;
mod status;

pub use config::{CatalogConfig, DEFAULT_COLLECTION};
pub use provider::CatalogProvider;
pub use status::{DataStatus, LogStatus};
