use ontograph::constants::{PREDICATE_COLLECTION_OF, PREDICATE_INDEX};
use ontograph::core::{NodeId, OntologyError, TagId, TermId};
use ontograph::dictionary::Dictionary;
use ontograph::graph::{Committable, DataType, Edge, Node, NodeKind, NodeReference};
use ontograph::store::{Collection, DocumentStore, DocumentStoreExt, Filter, IndexedField, MemoryStore};
use ontograph::test_utils::GraphFixture;

#[test]
fn test_edges_are_unique_over_the_full_triple() {
    let mut fixture = GraphFixture::new();
    let a = fixture.term_node("demo:a");
    let b = fixture.term_node("demo:b");
    fixture.term(PREDICATE_COLLECTION_OF);
    fixture.term(PREDICATE_INDEX);

    let store = fixture.store().clone();
    let dictionary = fixture.dictionary().clone();

    Edge::new(a, PREDICATE_COLLECTION_OF, b)
        .commit(store.as_ref(), &dictionary)
        .unwrap();

    let err = Edge::new(a, PREDICATE_COLLECTION_OF, b)
        .commit(store.as_ref(), &dictionary)
        .unwrap_err();
    assert!(matches!(err, OntologyError::Duplicate { .. }), "{err}");

    // Same endpoints, other predicate: a different edge
    Edge::new(a, PREDICATE_INDEX, b)
        .commit(store.as_ref(), &dictionary)
        .unwrap();
    // Reverse direction: a different edge
    Edge::new(b, PREDICATE_COLLECTION_OF, a)
        .commit(store.as_ref(), &dictionary)
        .unwrap();

    assert_eq!(store.count(Collection::Edges).unwrap(), 3);
}

#[test]
fn test_edge_triple_is_locked_after_commit() {
    let mut fixture = GraphFixture::new();
    let a = fixture.term_node("demo:a");
    let b = fixture.term_node("demo:b");
    fixture.term(PREDICATE_INDEX);

    let mut edge = Edge::new(a, PREDICATE_INDEX, b);
    edge.set_object(a).unwrap();
    edge.set_object(b).unwrap();
    edge.commit(fixture.store().as_ref(), fixture.dictionary()).unwrap();

    for result in [
        edge.set_subject(b),
        edge.set_object(a),
        edge.set_predicate(PREDICATE_COLLECTION_OF),
    ] {
        assert!(matches!(result.unwrap_err(), OntologyError::ImmutableField { .. }));
    }
    assert_eq!(edge.id().map(|id| id.as_str()), Some(format!("{a}:{PREDICATE_INDEX}:{b}").as_str()));
}

#[test]
fn test_nodes_need_their_reference() {
    let store = MemoryStore::new();
    let dictionary = Dictionary::in_memory();

    let err = Node::tag(TagId::new("crop:height"))
        .commit(&store, &dictionary)
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");

    let err = Node::term(TermId::new("crop:wheat"))
        .commit(&store, &dictionary)
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert_eq!(store.count(Collection::Nodes).unwrap(), 0);
}

#[test]
fn test_node_serials_increase() {
    let mut fixture = GraphFixture::new();
    let first = fixture.term_node("demo:a");
    let second = fixture.tag_node("demo:height", DataType::Float);
    let third = fixture.term_node("demo:b");
    assert!(first < second && second < third);
}

#[test]
fn test_stored_records_come_back_committed() {
    let mut fixture = GraphFixture::new();
    let id = fixture.node(Node::term("demo:sheet").with_kind(NodeKind::Collection));

    let mut stored = fixture.store().get_node(id).unwrap().unwrap();
    assert!(stored.state().is_committed());
    assert!(stored.has_kind(NodeKind::Collection));
    assert!(matches!(
        stored.set_reference(NodeReference::Term(TermId::new("demo:other"))),
        Err(OntologyError::ImmutableField { .. })
    ));

    // Mutable fields still update through a re-commit
    stored.set_symbol(Some("SHEET".to_string()));
    stored.commit(fixture.store().as_ref(), fixture.dictionary()).unwrap();
    let reloaded = fixture.store().get_node(id).unwrap().unwrap();
    assert_eq!(reloaded.symbol(), Some("SHEET"));
}

#[test]
fn test_snapshot_round_trip_keeps_counters() {
    let mut fixture = GraphFixture::new();
    let a = fixture.term_node("demo:a");
    let b = fixture.term_node("demo:b");
    fixture.edge(a, PREDICATE_COLLECTION_OF, b);

    let snapshot = fixture.store().snapshot().unwrap();
    let copy = MemoryStore::from_snapshot(snapshot).unwrap();

    let edges = copy
        .find_edges(&Filter::new().eq(IndexedField::Subject, a.get()))
        .unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].object(), b);

    let dictionary = Dictionary::in_memory();
    let mut node = Node::term("demo:a");
    node.commit(&copy, &dictionary).unwrap();
    assert!(node.id().unwrap() > NodeId::new(b.get()));
}
