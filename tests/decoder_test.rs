use flowsmith::compiler::{Compiler, Decoder, LayoutOptions, decode};
use flowsmith::document::ConfigDocument;
use flowsmith::error::{DecodeError, Endpoint};
use flowsmith::graph::builder::GraphBuilder;
use flowsmith::graph::{FieldType, FieldValue, FileRef, NodeId, NodeType, Position};
use serde_json::json;

fn document(value: serde_json::Value) -> ConfigDocument {
    ConfigDocument::from_value(value).expect("Document should parse")
}

#[test]
fn test_round_trip_preserves_types_props_and_edges() {
    let original = GraphBuilder::new()
        .templated("7", NodeType::ChatInput).set("Message", "hi").build()
        .templated("9", NodeType::Prompt).set("Template", "Say {x}").build()
        .templated("12", NodeType::OpenAi).set("Temperature", 0.2_f64).build()
        .templated("13", NodeType::ChatOutput).build()
        .connect("7", "9")
        .connect("9", "12")
        .connect("12", "13")
        .build();

    let compiler = Compiler::new("app", "desc");
    let first = compiler.compile_snapshot(&original).unwrap();
    let restored = decode(&first).unwrap();
    let second = compiler.compile_snapshot(&restored).unwrap();

    assert_eq!(first, second);

    let types: Vec<&NodeType> = restored.nodes.iter().map(|n| &n.node_type).collect();
    assert_eq!(
        types,
        vec![&NodeType::ChatInput, &NodeType::Prompt, &NodeType::OpenAi, &NodeType::ChatOutput]
    );
    assert_eq!(restored.edges.len(), 3);
}

#[test]
fn test_local_ids_are_fresh_and_sequential() {
    let doc = document(json!({
        "app_name": "a",
        "app_description": "",
        "nodes": [
            { "id": "prompt_1", "type": "prompt", "props": {} },
            { "id": "chatoutput_1", "type": "chatoutput", "props": {} }
        ],
        "edges": [ { "source": "prompt_1", "target": "chatoutput_1" } ]
    }));

    let snapshot = decode(&doc).unwrap();

    assert_eq!(snapshot.nodes[0].id, NodeId::from("1"));
    assert_eq!(snapshot.nodes[1].id, NodeId::from("2"));
    assert_eq!(snapshot.edges[0].source, NodeId::from("1"));
    assert_eq!(snapshot.edges[0].target, NodeId::from("2"));
}

#[test]
fn test_template_fields_rehydrate_with_declared_types() {
    let doc = document(json!({
        "nodes": [{
            "id": "openai_1",
            "type": "openai",
            "props": { "Model": "gpt-4o", "Temperature": 0.5, "Max Tokens": null, "Streaming": true }
        }],
        "edges": []
    }));

    let snapshot = decode(&doc).unwrap();
    let node = &snapshot.nodes[0];

    let labels: Vec<&str> = node.fields.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, vec!["Model", "API Key", "Temperature", "Max Tokens", "Streaming"]);

    assert_eq!(node.field("Model").unwrap().value, Some(FieldValue::from("gpt-4o")));
    assert_eq!(node.field("Temperature").unwrap().value, Some(FieldValue::Number(0.5)));
    assert_eq!(node.field("Temperature").unwrap().field_type, FieldType::Number);
    assert_eq!(node.field("Max Tokens").unwrap().value, None);
    assert_eq!(node.field("Streaming").unwrap().value, Some(FieldValue::Bool(true)));
    // absent from props, so the template default stays
    assert_eq!(node.field("API Key").unwrap().value, Some(FieldValue::from("")));
}

#[test]
fn test_unknown_props_are_appended_as_text_fields() {
    let doc = document(json!({
        "nodes": [{
            "id": "prompt_1",
            "type": "prompt",
            "props": { "Template": "t", "Legacy Option": "x", "Retries": 3 }
        }],
        "edges": []
    }));

    let snapshot = decode(&doc).unwrap();
    let fields = &snapshot.nodes[0].fields;

    assert_eq!(fields.len(), 4);
    assert_eq!(fields[2].label, "Legacy Option");
    assert_eq!(fields[2].field_type, FieldType::Text);
    assert_eq!(fields[2].value, Some(FieldValue::from("x")));
    assert_eq!(fields[3].label, "Retries");
    assert_eq!(fields[3].value, Some(FieldValue::Number(3.0)));
}

#[test]
fn test_file_props_come_back_as_file_refs() {
    let doc = document(json!({
        "nodes": [{
            "id": "pdfLoader_1",
            "type": "pdfLoader",
            "props": {
                "PDF File": { "name": "a.pdf", "type": "application/pdf", "size": 10, "lastModified": 5, "content": null }
            }
        }],
        "edges": []
    }));

    let snapshot = decode(&doc).unwrap();
    let field = snapshot.nodes[0].field("PDF File").unwrap();

    assert_eq!(field.field_type, FieldType::File);
    assert_eq!(
        field.value,
        Some(FieldValue::File(FileRef::new("a.pdf", "application/pdf", 10, 5)))
    );
}

#[test]
fn test_unknown_type_decodes_with_props_only() {
    let doc = document(json!({
        "nodes": [{ "id": "retriever_1", "type": "retriever", "props": { "Top K": 4 } }],
        "edges": []
    }));

    let snapshot = decode(&doc).unwrap();

    assert_eq!(snapshot.nodes[0].node_type, NodeType::Other("retriever".to_string()));
    assert_eq!(snapshot.nodes[0].fields.len(), 1);
    assert_eq!(snapshot.nodes[0].fields[0].label, "Top K");
}

#[test]
fn test_unresolved_edge_is_rejected() {
    let doc = document(json!({
        "nodes": [{ "id": "prompt_1", "type": "prompt", "props": {} }],
        "edges": [ { "source": "missing_1", "target": "prompt_1" } ]
    }));

    assert_eq!(
        decode(&doc).unwrap_err(),
        DecodeError::UnresolvedEdgeReference {
            edge_index: 0,
            endpoint: Endpoint::Source,
            missing_id: "missing_1".to_string(),
        }
    );
}

#[test]
fn test_duplicate_document_ids_are_rejected() {
    let doc = document(json!({
        "nodes": [
            { "id": "prompt_1", "type": "prompt", "props": {} },
            { "id": "prompt_1", "type": "prompt", "props": {} }
        ],
        "edges": []
    }));

    assert_eq!(
        decode(&doc).unwrap_err(),
        DecodeError::DuplicateNodeId { id: "prompt_1".to_string() }
    );
}

#[test]
fn test_legacy_connections_wrapper_is_accepted() {
    let doc = document(json!({
        "app_name": "old",
        "connections": {
            "nodes": [
                { "id": "chatinput_1", "type": "chatinput", "props": { "Message": "hey" } },
                { "id": "chatoutput_1", "type": "chatoutput", "props": {} }
            ],
            "edges": [ { "source": "chatinput_1", "target": "chatoutput_1" } ]
        }
    }));

    assert_eq!(doc.app_name, "old");
    let snapshot = decode(&doc).unwrap();
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.edges.len(), 1);
}

#[test]
fn test_malformed_documents() {
    let cases = [
        "not json at all",
        "[1, 2, 3]",
        r#"{"app_name": "x", "edges": []}"#,
        r#"{"nodes": []}"#,
        r#"{"nodes": [{"type": "prompt"}], "edges": []}"#,
        r#"{"nodes": "oops", "edges": []}"#,
    ];

    for text in cases {
        let err = ConfigDocument::from_json(text).unwrap_err();
        assert!(
            matches!(err, DecodeError::MalformedDocument { .. }),
            "expected malformed error for {}, got {:?}",
            text,
            err
        );
    }
}

#[test]
fn test_missing_app_metadata_defaults_to_empty() {
    let doc = ConfigDocument::from_json(r#"{"nodes": [], "edges": []}"#).unwrap();
    assert_eq!(doc.app_name, "");
    assert_eq!(doc.app_description, "");
}

#[test]
fn test_layout_cascades_from_origin() {
    let doc = document(json!({
        "nodes": [
            { "id": "parser_1", "type": "parser", "props": {} },
            { "id": "parser_2", "type": "parser", "props": {} },
            { "id": "parser_3", "type": "parser", "props": {} }
        ],
        "edges": []
    }));

    let default = decode(&doc).unwrap();
    assert_eq!(default.nodes[0].position, Position::new(100.0, 100.0));
    assert_eq!(default.nodes[2].position, Position::new(600.0, 180.0));

    let layout = LayoutOptions {
        origin: Position::new(0.0, 0.0),
        step: Position::new(0.0, 120.0),
    };
    let stacked = Decoder::with_layout(layout).decode(&doc).unwrap();
    assert_eq!(stacked.nodes[1].position, Position::new(0.0, 120.0));
}

#[test]
fn test_malformed_file_props_keep_their_metadata() {
    let doc = document(json!({
        "nodes": [
            {
                "id": "pdfLoader_1",
                "type": "pdfLoader",
                "props": {
                    "PDF File": { "name": "a.pdf", "type": "application/pdf", "size": 3, "lastModified": 1, "content": "%PDF-1.4 raw" }
                }
            },
            {
                "id": "csvLoader_1",
                "type": "csvLoader",
                "props": { "CSV File": { "name": "b.csv", "type": "text/csv", "size": 12.5, "lastModified": 2 } }
            },
            {
                "id": "pdfLoader_2",
                "type": "pdfLoader",
                "props": { "PDF File": { "type": "application/pdf", "size": 3 } }
            }
        ],
        "edges": []
    }));

    let snapshot = decode(&doc).unwrap();

    assert_eq!(
        snapshot.nodes[0].field("PDF File").unwrap().value,
        Some(FieldValue::File(FileRef::new("a.pdf", "application/pdf", 3, 1)))
    );
    assert_eq!(
        snapshot.nodes[1].field("CSV File").unwrap().value,
        Some(FieldValue::File(FileRef::new("b.csv", "text/csv", 12, 2)))
    );
    assert_eq!(snapshot.nodes[2].field("PDF File").unwrap().value, None);
}
