use std::collections::HashSet;

use ontograph::core::{NodeId, OntologyError};
use ontograph::graph::{Node, NodeKind};
use ontograph::structure::{TemplateWorksheetsIterator, WorksheetHeader};
use ontograph::test_utils::{GraphFixture, TemplateFixture};

/// UNIT <- W1 <- W2, UNIT <- W3; W2 also links UNIT directly.
struct Nested {
    fixture: GraphFixture,
    root: NodeId,
    unit: NodeId,
    w1: NodeId,
    w2: NodeId,
    w3: NodeId,
}

fn nested() -> Nested {
    let mut fixture = GraphFixture::new();
    let root = fixture.template_root("template:nested");
    let unit = fixture.worksheet(root, "UNIT", true);
    let w1 = fixture.worksheet(root, "W1", false);
    let w2 = fixture.worksheet(root, "W2", false);
    let w3 = fixture.worksheet(root, "W3", false);
    fixture.unit(root, unit);

    let unit_key = fixture.key(unit, "UNIT_ID");
    let w1_key = fixture.key(w1, "W1_ID");
    fixture.link(w1, "W1_UNIT", unit_key);
    fixture.link(w3, "W3_UNIT", unit_key);
    fixture.link(w2, "W2_W1", w1_key);
    fixture.link(w2, "W2_UNIT", unit_key);

    Nested {
        fixture,
        root,
        unit,
        w1,
        w2,
        w3,
    }
}

#[test]
fn test_worksheets_come_after_the_worksheet_they_reference() {
    let Nested {
        fixture,
        root,
        unit,
        w1,
        w2,
        w3,
    } = nested();
    let template = fixture.template(root).unwrap();
    let mut iterator = TemplateWorksheetsIterator::new(&template).unwrap();

    assert_eq!(iterator.root(), unit);
    assert_eq!(iterator.len(), template.worksheets().len() - 1);

    let mut seen: HashSet<NodeId> = HashSet::from([unit]);
    let mut order = Vec::new();
    for entry in iterator.by_ref() {
        assert!(seen.contains(&entry.parent), "{} visited before {}", entry.worksheet, entry.parent);
        seen.insert(entry.worksheet);
        order.push(entry.worksheet);
    }
    assert_eq!(order, vec![w1, w2, w3]);

    // W2 references both UNIT and W1; only the nearer W1 is its parent
    let w2_entry = iterator.entries().iter().find(|entry| entry.worksheet == w2).unwrap();
    assert_eq!(w2_entry.parent, w1);
    assert_eq!(template.node_symbol(w2_entry.field), Some("W2_W1"));

    iterator.rewind();
    assert_eq!(iterator.next().map(|entry| entry.worksheet), Some(w1));
}

#[test]
fn test_fixture_template_order() {
    let TemplateFixture {
        fixture,
        root,
        unit,
        plot,
        sample,
        plot_key,
        ..
    } = TemplateFixture::build();
    let template = fixture.template(root).unwrap();
    let iterator = TemplateWorksheetsIterator::new(&template).unwrap();

    assert_eq!(iterator.root(), unit);
    let entries: Vec<_> = iterator.collect();
    assert_eq!(entries.len(), 2);
    assert_eq!((entries[0].parent, entries[0].worksheet), (unit, plot));
    assert_eq!(entries[0].key, Some(plot_key));
    assert_eq!((entries[1].parent, entries[1].worksheet), (plot, sample));
}

#[test]
fn test_template_root_must_be_flagged() {
    let mut fixture = GraphFixture::new();
    let plain = fixture.node(Node::term("template:plain").with_kind(NodeKind::Root));
    let err = fixture.template(plain).unwrap_err();
    assert!(matches!(err, OntologyError::InvalidTemplate { .. }), "{err}");
}

#[test]
fn test_worksheet_without_symbol_is_named_in_error() {
    let mut fixture = GraphFixture::new();
    let root = fixture.template_root("template:broken");
    let sheet = fixture.term_node("sheet:nameless");
    fixture.edge(sheet, ontograph::constants::PREDICATE_COLLECTION_OF, root);

    match fixture.template(root).unwrap_err() {
        OntologyError::InvalidTemplate { node, .. } => assert_eq!(node, Some(sheet.to_string())),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_nested_workbook_validation() {
    let Nested { fixture, root, .. } = nested();
    let template = fixture.template(root).unwrap();

    let header = |title: &str, symbols: &[&str]| WorksheetHeader {
        title: title.to_string(),
        symbol_row: Some(1),
        symbols: symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (i as u32 + 1, symbol.to_string()))
            .collect(),
        data_row: 2,
    };

    let report = template.validate_workbook(&[
        header("UNIT", &["UNIT_ID"]),
        header("W1", &["W1_ID", "W1_UNIT"]),
        header("W2", &["W2_W1", "W2_UNIT"]),
    ]);
    assert!(report.is_valid(), "{:?}", report.issues);

    let report = template.validate_workbook(&[header("W1", &["W1_UNIT"])]);
    assert_eq!(report.len(), 2, "{:?}", report.issues);
}

#[test]
fn test_worksheets_nested_under_another_worksheet() {
    let mut fixture = GraphFixture::new();
    let root = fixture.template_root("template:grouped");
    let outer = fixture.worksheet(root, "OUTER", true);
    let inner = fixture.worksheet(outer, "INNER", true);
    fixture.unit(root, outer);

    let outer_key = fixture.key(outer, "OUTER_ID");
    let note = fixture.field(inner, "INNER_NOTE", false);
    let inner_outer = fixture.link(inner, "INNER_OUTER", outer_key);

    let template = fixture.template(root).unwrap();
    assert_eq!(template.worksheets(), &[outer, inner]);
    assert!(template.is_required(inner));
    assert_eq!(template.worksheet_by_symbol("INNER"), Some(inner));
    assert_eq!(template.properties(inner), &[note, inner_outer]);
    assert_eq!(template.linked_index(inner_outer), Some(outer_key));

    let entries: Vec<_> = TemplateWorksheetsIterator::new(&template).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].parent, entries[0].worksheet), (outer, inner));
    assert_eq!(entries[0].field, inner_outer);
    assert_eq!(entries[0].key, None);
}
