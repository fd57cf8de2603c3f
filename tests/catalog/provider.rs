//! The provider against a scripted store whose handles report a fixed id.

use movie_catalog::{CatalogProvider, InvalidArgument, Movie, StoreCall};

use crate::support::ScriptedStore;

fn setup() -> (ScriptedStore, CatalogProvider<ScriptedStore>) {
    let store = ScriptedStore::new();
    let catalog = CatalogProvider::new(&store);
    (store, catalog)
}

#[test]
fn add_movie_sets_id() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    store.report_id("123");

    catalog.add_movie(&mut movie).unwrap();

    assert_eq!(movie.id(), "123", "movie was not updated with correct id");
    let sets = store.sets();
    assert_eq!(sets.len(), 1);
    let (id, data) = &sets[0];
    assert_eq!(id, "123");
    let written: Movie = serde_json::from_value(data.clone().into()).unwrap();
    assert_eq!(written, movie);
}

#[test]
fn add_movie_allocates_before_writing() {
    let (store, catalog) = setup();
    store.report_id("123");

    catalog
        .add_movie(&mut Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023))
        .unwrap();

    let calls = store.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], StoreCall::Allocate { collection, id } if collection == "movies" && id == "123"));
    assert!(matches!(&calls[1], StoreCall::Set { .. }));
}

#[test]
fn delete_movie() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    movie.set_id("123");
    store.report_id("123");

    catalog.delete_movie(&movie).unwrap();

    assert_eq!(store.deletes(), vec!["123".to_string()]);
    assert!(matches!(&store.calls()[0], StoreCall::Resolve { id, .. } if id == "123"));
}

#[test]
fn delete_does_not_check_ids() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    movie.set_id("1");
    store.report_id("123");

    catalog.delete_movie(&movie).unwrap();

    assert_eq!(store.deletes().len(), 1);
}

#[test]
fn update_movie_rejects_different_ids() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    movie.set_id("1");
    store.report_id("123");

    let err = catalog
        .update_movie(&mut movie, "Another Title", "Another Genre", 2026)
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(
        err.invalid_argument(),
        Some(&InvalidArgument::IdMismatch {
            expected: "1".into(),
            actual: "123".into(),
        })
    );
    assert!(store.sets().is_empty());
    assert_eq!(movie.title(), "Oppenheimer");
}

#[test]
fn update_movie_rejects_empty_title() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    movie.set_id("123");
    store.report_id("123");

    let err = catalog
        .update_movie(&mut movie, "", "Another Genre", 2026)
        .unwrap_err();

    assert_eq!(err.invalid_argument(), Some(&InvalidArgument::EmptyTitle));
    assert!(store.sets().is_empty());
}

#[test]
fn id_mismatch_is_checked_before_empty_title() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    movie.set_id("1");
    store.report_id("123");

    let err = catalog.update_movie(&mut movie, "", "", 0).unwrap_err();

    assert!(matches!(
        err.invalid_argument(),
        Some(InvalidArgument::IdMismatch { .. })
    ));
}

#[test]
fn unsaved_movie_never_resolves_a_document() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    // an empty reported id would otherwise satisfy the id comparison
    store.report_id("");

    let update = catalog
        .update_movie(&mut movie, "Another Title", "Another Genre", 2026)
        .unwrap_err();
    let delete = catalog.delete_movie(&movie).unwrap_err();

    assert_eq!(update.invalid_argument(), Some(&InvalidArgument::MissingId));
    assert_eq!(delete.invalid_argument(), Some(&InvalidArgument::MissingId));
    assert!(store.calls().is_empty());
    assert_eq!(movie.title(), "Oppenheimer");
}

#[test]
fn update_movie_writes_new_values_once() {
    let (store, catalog) = setup();
    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    movie.set_id("123");
    store.report_id("123");

    catalog
        .update_movie(&mut movie, "Another Title", "Another Genre", 2026)
        .unwrap();

    let sets = store.sets();
    assert_eq!(sets.len(), 1);
    let (id, data) = &sets[0];
    assert_eq!(id, "123");
    assert_eq!(data["title"], "Another Title");
    assert_eq!(data["genre"], "Another Genre");
    assert_eq!(data["year"], 2026);
    assert_eq!(movie.title(), "Another Title");
}

#[test]
fn unique_title() {
    let (store, catalog) = setup();
    catalog
        .set_movies(vec![Movie::new("Barbie", "Thriller/Historical Drama", 2023)])
        .unwrap();
    let mut movie = Movie::new("Barbie", "Thriller/Historical Drama", 2023);
    store.report_id("12345");

    let err = catalog.add_movie(&mut movie).unwrap_err();

    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("duplicate title"));
    assert!(store.calls().is_empty());
    assert_eq!(movie.id(), "");
}

#[test]
fn set_movies_does_not_touch_store() {
    let (store, catalog) = setup();

    catalog
        .set_movies(vec![
            Movie::new("Barbie", "Comedy", 2023),
            Movie::new("Oppenheimer", "Drama", 2023),
        ])
        .unwrap();

    assert!(store.calls().is_empty());
    assert_eq!(catalog.movies().unwrap().len(), 2);
    assert!(catalog.find_by_title("Oppenheimer").unwrap().is_some());
}
