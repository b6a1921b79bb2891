use flowsmith::compiler::Compiler;
use flowsmith::error::{CompileError, StoreError};
use flowsmith::graph::builder::GraphBuilder;
use flowsmith::graph::{Edge, FieldType, FieldValue, FileRef, NodeId, NodeType, Position};
use flowsmith::store::{Store, StoreOptions};

fn origin() -> Position {
    Position::new(0.0, 0.0)
}

#[test]
fn test_ids_are_monotonic_and_never_reused() {
    let mut store = Store::new();
    let a = store.add_node(NodeType::ChatInput, origin());
    let b = store.add_node(NodeType::Prompt, origin());
    assert_eq!(a.id.as_str(), "1");
    assert_eq!(b.id.as_str(), "2");

    store.remove_node(&b.id).unwrap();
    let c = store.add_node(NodeType::ChatOutput, origin());

    assert_eq!(c.id.as_str(), "3");
    assert_eq!(store.len(), 2);
}

#[test]
fn test_new_nodes_take_template_fields() {
    let mut store = Store::new();
    let node = store.add_node(NodeType::OpenAi, Position::new(10.0, 20.0));

    assert_eq!(node.fields.len(), 5);
    assert_eq!(node.field("Model").unwrap().value, Some(FieldValue::from("gpt-4o-mini")));
    assert_eq!(node.position, Position::new(10.0, 20.0));
    assert_eq!(store.node(&node.id), Some(&node));
}

#[test]
fn test_update_field_touches_only_the_indexed_field() {
    let mut store = Store::new();
    let id = store.add_node(NodeType::OpenAi, origin()).id;

    store.update_field(&id, 2, Some(FieldValue::from("0.9"))).unwrap();

    let node = store.node(&id).unwrap();
    assert_eq!(node.fields[2].value, Some(FieldValue::from("0.9")));
    assert_eq!(node.fields[0].value, Some(FieldValue::from("gpt-4o-mini")));
    assert_eq!(node.fields[4].value, Some(FieldValue::Bool(false)));
}

#[test]
fn test_update_field_errors() {
    let mut store = Store::new();
    let id = store.add_node(NodeType::ChatInput, origin()).id;

    assert_eq!(
        store.update_field(&id, 3, None),
        Err(StoreError::FieldIndexOutOfRange { node_id: id.clone(), index: 3, len: 1 })
    );
    assert_eq!(
        store.update_field(&NodeId::from("99"), 0, None),
        Err(StoreError::UnknownNode(NodeId::from("99")))
    );
    assert!(matches!(
        store.update_field_by_label(&id, "Nope", None),
        Err(StoreError::UnknownLabel { .. })
    ));

    store.update_field_by_label(&id, "Message", Some("hello".into())).unwrap();
    assert_eq!(store.node(&id).unwrap().fields[0].value, Some(FieldValue::from("hello")));
}

#[test]
fn test_remove_node_drops_incident_edges() {
    let mut store = Store::new();
    let a = store.add_node(NodeType::ChatInput, origin()).id;
    let b = store.add_node(NodeType::Prompt, origin()).id;
    let c = store.add_node(NodeType::ChatOutput, origin()).id;
    store.add_edge(&a, &b).unwrap();
    store.add_edge(&b, &c).unwrap();
    store.add_edge(&a, &c).unwrap();

    let removed = store.remove_node(&b).unwrap();

    assert_eq!(removed.node_type, NodeType::Prompt);
    assert_eq!(store.edges(), &[Edge::new(a.clone(), c.clone())]);
    // the remaining snapshot still compiles
    assert!(Compiler::default().compile_snapshot(&store.snapshot()).is_ok());
}

#[test]
fn test_add_edge_validation() {
    let mut store = Store::new();
    let a = store.add_node(NodeType::Parser, origin()).id;

    assert_eq!(
        store.add_edge(&a, &NodeId::from("42")),
        Err(StoreError::UnknownNode(NodeId::from("42")))
    );

    // self-loops are allowed unless disabled
    store.add_edge(&a, &a).unwrap();
    store.add_edge(&a, &a).unwrap();
    assert_eq!(store.edges().len(), 2);
    assert_eq!(store.remove_edge(&a, &a), 2);

    let mut strict = Store::with_options(StoreOptions { allow_self_loops: false });
    let b = strict.add_node(NodeType::Parser, origin()).id;
    assert_eq!(strict.add_edge(&b, &b), Err(StoreError::SelfLoop(b.clone())));
}

#[test]
fn test_upload_file_targets_file_labelled_fields() {
    let mut store = Store::new();
    let pdf = store.add_node(NodeType::PdfLoader, origin()).id;
    let prompt = store.add_node(NodeType::Prompt, origin()).id;
    let file = FileRef::new("report.pdf", "application/pdf", 2048, 1);

    assert_eq!(store.upload_file(&pdf, file.clone()).unwrap(), 1);
    let field = store.node(&pdf).unwrap().field("PDF File").unwrap().clone();
    assert_eq!(field.value, Some(FieldValue::File(file.clone())));
    assert_eq!(field.field_type, FieldType::File);

    assert_eq!(store.upload_file(&prompt, file), Err(StoreError::NoFileField(prompt.clone())));
}

#[test]
fn test_move_node() {
    let mut store = Store::new();
    let id = store.add_node(NodeType::Prompt, origin()).id;

    store.move_node(&id, Position::new(5.0, -3.0)).unwrap();

    assert_eq!(store.node(&id).unwrap().position, Position::new(5.0, -3.0));
    assert!(store.move_node(&NodeId::from("8"), origin()).is_err());
}

#[test]
fn test_load_replaces_contents_and_advances_counter() {
    let mut store = Store::new();
    store.add_node(NodeType::Prompt, origin());

    let snapshot = GraphBuilder::new()
        .templated("4", NodeType::ChatInput).build()
        .templated("10", NodeType::ChatOutput).build()
        .connect("4", "10")
        .build();
    store.load(snapshot.clone()).unwrap();

    assert_eq!(store.snapshot(), snapshot);
    let next = store.add_node(NodeType::Parser, origin());
    assert_eq!(next.id.as_str(), "11");
}

#[test]
fn test_load_rejects_dangling_edges_and_keeps_state() {
    let mut store = Store::new();
    let kept = store.add_node(NodeType::Prompt, origin());

    let broken = GraphBuilder::new()
        .templated("1", NodeType::ChatInput).build()
        .connect("1", "2")
        .build();

    assert!(matches!(store.load(broken), Err(StoreError::InvalidSnapshot(_))));
    assert_eq!(store.len(), 1);
    assert_eq!(store.node(&kept.id), Some(&kept));
}

#[test]
fn test_snapshot_preserves_insertion_order() {
    let mut store = Store::new();
    for node_type in [NodeType::Prompt, NodeType::Parser, NodeType::Prompt] {
        store.add_node(node_type, origin());
    }

    let document = Compiler::default().compile_snapshot(&store.snapshot()).unwrap();
    let ids: Vec<&str> = document.nodes.iter().map(|n| n.id.as_str()).collect();

    assert_eq!(ids, vec!["prompt_1", "parser_1", "prompt_2"]);
}

#[test]
fn test_load_rejects_repeated_ids_and_keeps_state() {
    let mut store = Store::new();
    let kept = store.add_node(NodeType::Prompt, origin());

    let repeated = GraphBuilder::new()
        .templated("1", NodeType::ChatInput).build()
        .templated("1", NodeType::ChatOutput).build()
        .build();

    assert_eq!(
        store.load(repeated),
        Err(StoreError::InvalidSnapshot(CompileError::DuplicateLocalId { id: "1".to_string() }))
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.node(&kept.id), Some(&kept));
    assert!(Compiler::default().compile_snapshot(&store.snapshot()).is_ok());
}
