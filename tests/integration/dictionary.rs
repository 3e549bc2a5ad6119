use std::sync::Arc;
use std::time::Duration;

use ontograph::core::{LanguageString, OntologyError};
use ontograph::dictionary::{Dictionary, MemoryCache};
use ontograph::graph::{Committable, DataType, Tag, Term};
use ontograph::store::MemoryStore;

fn register_terms(store: &MemoryStore, dictionary: &Dictionary, locals: &[&str]) {
    for local in locals {
        Term::new("", *local).commit(store, dictionary).unwrap();
    }
}

#[test]
fn test_tag_registration_end_to_end() {
    let store = MemoryStore::new();
    let dictionary = Dictionary::in_memory();
    register_terms(&store, &dictionary, &["crop", "wheat", "variety"]);

    let mut tag = Tag::new(["crop", "wheat"]);
    assert!(!tag.is_initialized());
    assert!(matches!(
        tag.commit(&store, &dictionary).unwrap_err(),
        OntologyError::NotInitialized { .. }
    ));

    tag.push_term("variety").unwrap();
    tag.set_data_type(DataType::String);
    tag.add_label(LanguageString::new("en", "Variety"));
    assert!(tag.is_initialized());
    tag.commit(&store, &dictionary).unwrap();

    let serial = dictionary.resolve_serial("crop:wheat:variety", true).unwrap();
    assert_eq!(serial, tag.serial());

    let definition = dictionary.resolve_definition(serial.unwrap(), true).unwrap();
    assert_eq!(definition.data_type, Some(DataType::String));
    assert_eq!(definition.persistent_id, "crop:wheat:variety");
}

#[test]
fn test_resolution_is_stable_between_writes() {
    let store = MemoryStore::new();
    let dictionary = Dictionary::in_memory();

    let mut tag = Tag::new(["plants"])
        .with_data_type(DataType::Integer)
        .with_label(LanguageString::neutral("Plants"));
    tag.commit(&store, &dictionary).unwrap();

    let first = dictionary.resolve_serial("plants", true).unwrap();
    for _ in 0..5 {
        assert_eq!(dictionary.resolve_serial("plants", true).unwrap(), first);
    }

    let serial = first.unwrap();
    let definition = dictionary.resolve_definition(serial, true).unwrap();
    assert_eq!(dictionary.resolve_definition(serial, true).unwrap(), definition);
}

#[test]
fn test_deleting_a_tag_invalidates_both_keys() {
    let store = MemoryStore::new();
    let dictionary = Dictionary::in_memory();

    let mut tag = Tag::new(["height"])
        .with_data_type(DataType::Float)
        .with_label(LanguageString::neutral("Height"));
    tag.commit(&store, &dictionary).unwrap();
    let serial = tag.serial().unwrap();

    assert!(tag.delete(&store, &dictionary, true).unwrap());
    assert_eq!(dictionary.resolve_serial("height", false).unwrap(), None);
    assert!(dictionary.resolve_definition(serial, true).unwrap_err().is_not_found());

    // Deleting twice finds nothing
    assert!(!tag.delete(&store, &dictionary, false).unwrap());
    assert!(tag.delete(&store, &dictionary, true).is_err());
}

#[test]
fn test_reload_after_flush() {
    let store = MemoryStore::new();
    let dictionary = Dictionary::in_memory();

    let mut serials = Vec::new();
    for path in ["height", "weight", "yield"] {
        let mut tag = Tag::new([path])
            .with_data_type(DataType::Float)
            .with_label(LanguageString::neutral(path));
        tag.commit(&store, &dictionary).unwrap();
        serials.push(tag.serial().unwrap());
    }

    dictionary.flush(0);
    assert_eq!(dictionary.resolve_serial("weight", false).unwrap(), None);

    assert_eq!(dictionary.reload(&store).unwrap(), 3);
    assert_eq!(dictionary.resolve_serial("weight", true).unwrap(), Some(serials[1]));
}

#[test]
fn test_delayed_flush_keeps_entries_until_deadline() {
    let store = MemoryStore::new();
    let dictionary = Dictionary::new(Arc::new(MemoryCache::new()));

    let mut tag = Tag::new(["height"])
        .with_data_type(DataType::Float)
        .with_label(LanguageString::neutral("Height"));
    tag.commit(&store, &dictionary).unwrap();

    dictionary.flush(1);
    assert!(dictionary.resolve_serial("height", false).unwrap().is_some());

    std::thread::sleep(Duration::from_millis(1100));
    assert_eq!(dictionary.resolve_serial("height", false).unwrap(), None);
}

#[test]
fn test_dictionaries_share_a_backend() {
    let backend = Arc::new(MemoryCache::new());
    let writer = Dictionary::new(backend.clone());
    let reader = Dictionary::new(backend);
    let store = MemoryStore::new();

    let mut tag = Tag::new(["height"])
        .with_data_type(DataType::Float)
        .with_label(LanguageString::neutral("Height"));
    tag.commit(&store, &writer).unwrap();

    assert_eq!(reader.resolve_serial("height", true).unwrap(), tag.serial());
}
