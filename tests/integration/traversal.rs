use ontograph::constants::{PREDICATE_PROPERTY_OF, PREDICATE_SUBCLASS_OF};
use ontograph::core::{LanguageString, NodeId};
use ontograph::graph::{Committable, DataKind, DataType, Node, Term};
use ontograph::store::Collection;
use ontograph::structure::{CachedStructure, Direction};
use ontograph::test_utils::{GraphFixture, init_test_logging};

const HAS: &str = "predicate:has";

fn ids(nodes: Option<&Vec<NodeId>>) -> Vec<NodeId> {
    nodes.cloned().unwrap_or_default()
}

#[test]
fn test_subclass_relationships_are_inherited() {
    init_test_logging(None);
    let mut fixture = GraphFixture::new();
    let animal = fixture.term_node("taxon:animal");
    let mammal = fixture.term_node("taxon:mammal");
    let dog = fixture.term_node("taxon:dog");
    let heart = fixture.term_node("organ:heart");
    let fur = fixture.term_node("organ:fur");

    fixture.edge(dog, PREDICATE_SUBCLASS_OF, mammal);
    fixture.edge(mammal, PREDICATE_SUBCLASS_OF, animal);
    fixture.edge(mammal, HAS, fur);
    fixture.edge(animal, HAS, heart);

    let mut structure = fixture.structure(dog);
    let relationships = structure
        .get_relationships(&[dog], Direction::Outgoing, &[])
        .unwrap();

    assert!(!relationships.contains_key(PREDICATE_SUBCLASS_OF));
    assert_eq!(ids(relationships.get(HAS)), vec![fur, heart]);

    // Filtering on the predicate still expands subclasses
    assert_eq!(structure.related(dog, Direction::Outgoing, HAS).unwrap(), vec![fur, heart]);
    assert!(structure.node(heart).is_some());
}

#[test]
fn test_subclass_cycle_terminates() {
    let mut fixture = GraphFixture::new();
    let a = fixture.term_node("demo:a");
    let b = fixture.term_node("demo:b");
    let x = fixture.term_node("demo:x");

    fixture.edge(a, PREDICATE_SUBCLASS_OF, b);
    fixture.edge(b, PREDICATE_SUBCLASS_OF, a);
    fixture.edge(b, HAS, x);

    let mut structure = fixture.structure(a);
    let relationships = structure
        .get_relationships(&[a], Direction::Outgoing, &[])
        .unwrap();
    assert_eq!(relationships.len(), 1);
    assert_eq!(ids(relationships.get(HAS)), vec![x]);
}

#[test]
fn test_incoming_relationships_with_filter() {
    let mut fixture = GraphFixture::new();
    let sheet = fixture.term_node("sheet:plot");
    let area = fixture.tag_node("plot:area", DataType::Float);
    let notes = fixture.term_node("field:notes");
    let other = fixture.term_node("demo:other");

    fixture.edge(area, PREDICATE_PROPERTY_OF, sheet);
    fixture.edge(notes, PREDICATE_PROPERTY_OF, sheet);
    fixture.edge(other, HAS, sheet);

    let mut structure = fixture.structure(sheet);
    let fields = structure
        .get_relationships(&[sheet], Direction::Incoming, &[PREDICATE_PROPERTY_OF])
        .unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(ids(fields.get(PREDICATE_PROPERTY_OF)), vec![area, notes]);

    let everything = structure
        .get_relationships(&[sheet], Direction::Incoming, &[])
        .unwrap();
    assert_eq!(ids(everything.get(HAS)), vec![other]);

    // Nothing leaves the sheet
    assert!(
        structure
            .get_relationships(&[sheet], Direction::Outgoing, &[])
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_language_neutral_entry_is_preferred() {
    let mut fixture = GraphFixture::new();
    Term::new("crop", "wheat")
        .with_label(LanguageString::new("fr", "Blé"))
        .with_label(LanguageString::neutral("Wheat"))
        .commit(fixture.store().as_ref(), fixture.dictionary())
        .unwrap();
    let node = fixture.term_node("crop:wheat");

    let structure = fixture.structure(node);
    let cached = structure.node(node).unwrap();
    assert_eq!(cached.label.as_deref(), Some("Wheat"));

    let french = CachedStructure::new(
        fixture.shared_store(),
        fixture.dictionary().clone(),
        node,
        "fr",
    )
    .unwrap();
    assert_eq!(french.node(node).unwrap().label.as_deref(), Some("Blé"));
}

#[test]
fn test_tag_nodes_merge_tag_kinds_and_warm_the_dictionary() {
    let mut fixture = GraphFixture::new();
    let mut tag = fixture.tag("plot:area", DataType::Float);
    tag.add_kind(DataKind::Mandatory);
    tag.commit(fixture.store().as_ref(), fixture.dictionary()).unwrap();
    let node = fixture.node(Node::tag(tag.id().unwrap().clone()));

    fixture.dictionary().flush(0);
    let mut structure = fixture.structure(node);
    assert!(structure.node(node).unwrap().is_mandatory());
    assert_eq!(
        fixture.dictionary().resolve_serial("plot:area", true).unwrap(),
        tag.serial()
    );

    // Caching by collection name
    assert!(structure.cache_object(Collection::Terms, "plot").is_err());
    fixture.term("plot");
    structure.cache_object(Collection::Terms, "plot").unwrap();
    assert!(structure.cache_object(Collection::Edges, "1:p:2").is_err());
    structure.clear().unwrap();
    assert_eq!(structure.nodes().len(), 1);
}
