use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde_json::Value;

use super::{CatalogConfig, DataStatus};
use crate::error::{CatalogError, InvalidArgument};
use crate::movie::Movie;
use crate::store::{
    CollectionRef, DocumentData, DocumentRef, DocumentSnapshot, DocumentStore, StoreError,
};

/// Validating facade over a remote movie collection plus a local cache.
///
/// Every mutation runs its checks before the first remote call, so a rejected
/// mutation leaves both the store and the cache untouched. Mutations are
/// serialized through a single write gate; the cache lock is never held
/// across a remote call.
pub struct CatalogProvider<S: DocumentStore> {
    collection: S::Collection,
    config: CatalogConfig,
    movies: Arc<RwLock<Vec<Movie>>>,
    write_gate: Mutex<()>,
}

impl<S: DocumentStore> CatalogProvider<S> {
    pub fn new(store: &S) -> Self {
        Self::with_config(store, CatalogConfig::default())
    }

    pub fn with_config(store: &S, config: CatalogConfig) -> Self {
        CatalogProvider {
            collection: store.collection(&config.collection),
            config,
            movies: Arc::new(RwLock::new(Vec::new())),
            write_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn collection(&self) -> &S::Collection {
        &self.collection
    }

    /// Replace the local cache wholesale. The remote store is not consulted.
    pub fn set_movies(&self, movies: Vec<Movie>) -> Result<(), CatalogError> {
        let _gate = self.gate()?;
        let mut cache = self
            .movies
            .write()
            .map_err(|_| CatalogError::LockPoisoned("cache write"))?;
        *cache = movies;
        Ok(())
    }

    /// The cached movies, in insertion order.
    pub fn movies(&self) -> Result<Vec<Movie>, CatalogError> {
        let cache = self
            .movies
            .read()
            .map_err(|_| CatalogError::LockPoisoned("cache read"))?;
        Ok(cache.clone())
    }

    pub fn find_by_title(&self, title: &str) -> Result<Option<Movie>, CatalogError> {
        let cache = self
            .movies
            .read()
            .map_err(|_| CatalogError::LockPoisoned("cache read"))?;
        Ok(cache.iter().find(|movie| movie.title() == title).cloned())
    }

    /// Persist a new movie and write the generated id back onto it.
    ///
    /// Fails with `DuplicateTitle` if a cached movie already carries the same
    /// title; in that case no document is allocated.
    pub fn add_movie(&self, movie: &mut Movie) -> Result<(), CatalogError> {
        let _gate = self.gate()?;

        if self.find_by_title(movie.title())?.is_some() {
            tracing::warn!(title = movie.title(), "rejected movie with duplicate title");
            return Err(InvalidArgument::DuplicateTitle {
                title: movie.title().to_string(),
            }
            .into());
        }

        let document = self.collection.document();
        let mut record = movie.clone();
        record.set_id(document.id());
        document.set(encode(&record)?)?;

        movie.set_id(document.id());
        self.upsert_cached(record)?;

        tracing::debug!(id = movie.id(), title = movie.title(), "added movie");
        Ok(())
    }

    /// Overwrite a persisted movie with new field values.
    ///
    /// The movie must carry an id, the document resolved through it must
    /// report the same id, and `title` must be non-empty. On success the
    /// caller's movie and the cached entry both take the new values.
    pub fn update_movie(
        &self,
        movie: &mut Movie,
        title: &str,
        genre: &str,
        year: i32,
    ) -> Result<(), CatalogError> {
        let _gate = self.gate()?;
        require_id(movie, "update")?;

        let document = self.collection.document_by_id(movie.id());
        let mut updated = movie.clone();
        updated.set_title(title);
        updated.set_genre(genre);
        updated.set_year(year);

        if !Self::is_valid_movie(&updated, &document) {
            if document.id() != movie.id() {
                tracing::warn!(
                    id = movie.id(),
                    document_id = document.id(),
                    "rejected update with mismatched id"
                );
                return Err(InvalidArgument::IdMismatch {
                    expected: movie.id().to_string(),
                    actual: document.id().to_string(),
                }
                .into());
            }
            tracing::warn!(id = movie.id(), "rejected update with empty title");
            return Err(InvalidArgument::EmptyTitle.into());
        }

        document.set(encode(&updated)?)?;

        *movie = updated.clone();
        self.upsert_cached(updated)?;

        tracing::debug!(id = movie.id(), title = movie.title(), "updated movie");
        Ok(())
    }

    /// Delete the document behind `movie.id` and drop it from the cache.
    ///
    /// A movie that was never persisted fails with `MissingId`.
    pub fn delete_movie(&self, movie: &Movie) -> Result<(), CatalogError> {
        let _gate = self.gate()?;
        require_id(movie, "delete")?;

        self.collection.document_by_id(movie.id()).delete()?;

        {
            let mut cache = self
                .movies
                .write()
                .map_err(|_| CatalogError::LockPoisoned("cache write"))?;
            cache.retain(|cached| cached.id() != movie.id());
        }

        tracing::debug!(id = movie.id(), "deleted movie");
        Ok(())
    }

    /// A movie is valid against a document when the ids agree and it has a title.
    pub fn is_valid_movie(movie: &Movie, document: &impl DocumentRef) -> bool {
        movie.id() == document.id() && !movie.title().is_empty()
    }

    /// Mirror the remote collection into the cache from now on.
    ///
    /// Each snapshot the store delivers replaces the cache and notifies
    /// `status`. A snapshot that fails, or holds an undecodable document,
    /// is reported through `on_error` and leaves the cache as it was.
    pub fn listen_for_updates<D>(&self, status: D) -> Result<(), CatalogError>
    where
        D: DataStatus + 'static,
    {
        let movies = Arc::clone(&self.movies);
        let collection = self.config.collection.clone();

        self.collection.add_snapshot_listener(Box::new(
            move |snapshot: Result<&[DocumentSnapshot], &StoreError>| {
                let applied = snapshot
                    .map_err(|err| CatalogError::Store(err.clone()))
                    .and_then(|documents| replace_cache(&movies, documents));

                match applied {
                    Ok(count) => {
                        tracing::debug!(collection = %collection, count, "catalog refreshed");
                        status.on_data_updated();
                    }
                    Err(err) => {
                        tracing::error!(collection = %collection, error = %err, "catalog refresh failed");
                        status.on_error(&err.to_string());
                    }
                }
            },
        ))?;
        Ok(())
    }

    /// Pull the remote collection into the cache once. Returns the movie count.
    pub fn refresh(&self) -> Result<usize, CatalogError> {
        let documents = self.collection.snapshot()?;
        replace_cache(&self.movies, &documents)
    }

    fn gate(&self) -> Result<MutexGuard<'_, ()>, CatalogError> {
        self.write_gate
            .lock()
            .map_err(|_| CatalogError::LockPoisoned("write gate"))
    }

    /// Replace the cached entry with the same id, or append.
    fn upsert_cached(&self, movie: Movie) -> Result<(), CatalogError> {
        let mut cache = self
            .movies
            .write()
            .map_err(|_| CatalogError::LockPoisoned("cache write"))?;

        match cache
            .iter_mut()
            .find(|cached| cached.is_persisted() && cached.id() == movie.id())
        {
            Some(slot) => *slot = movie,
            None => cache.push(movie),
        }
        Ok(())
    }
}

/// Unsaved movies have no document to address.
fn require_id(movie: &Movie, operation: &'static str) -> Result<(), CatalogError> {
    if movie.is_persisted() {
        return Ok(());
    }
    tracing::warn!(title = movie.title(), operation, "rejected movie without id");
    Err(InvalidArgument::MissingId.into())
}

fn encode(movie: &Movie) -> Result<DocumentData, CatalogError> {
    match serde_json::to_value(movie).map_err(|e| CatalogError::Serde(e.to_string()))? {
        Value::Object(data) => Ok(data),
        other => Err(CatalogError::Serde(format!(
            "movie encoded as {} instead of an object",
            other
        ))),
    }
}

/// The document id wins over any id stored in the body.
fn decode(document: &DocumentSnapshot) -> Result<Movie, CatalogError> {
    let mut movie: Movie = serde_json::from_value(Value::Object(document.data.clone()))
        .map_err(|e| CatalogError::Serde(format!("document {}: {}", document.id, e)))?;
    movie.set_id(document.id.as_str());
    Ok(movie)
}

fn replace_cache(
    cache: &RwLock<Vec<Movie>>,
    documents: &[DocumentSnapshot],
) -> Result<usize, CatalogError> {
    let movies = documents
        .iter()
        .map(decode)
        .collect::<Result<Vec<_>, _>>()?;
    let count = movies.len();

    let mut cache = cache
        .write()
        .map_err(|_| CatalogError::LockPoisoned("cache write"))?;
    *cache = movies;
    Ok(count)
}
