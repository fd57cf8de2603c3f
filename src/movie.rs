use serde::{Deserialize, Serialize};

/// A movie record as stored in the catalog.
///
/// `id` is empty until the remote store assigns one on first persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default)]
    id: String,
    title: String,
    genre: String,
    year: i32,
}

impl Movie {
    pub fn new(title: impl Into<String>, genre: impl Into<String>, year: i32) -> Self {
        Movie {
            id: String::new(),
            title: title.into(),
            genre: genre.into(),
            year,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.genre = genre.into();
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// True once the remote store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}
