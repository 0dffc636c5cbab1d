//! Flow import/export and whole-workspace documents.
mod common;
use katagami::error::DocumentError;
use katagami::prelude::*;
use serde_json::json;

#[test]
fn test_export_then_import_into_fresh_session() {
    let mut source = EditorSession::new(common::config_graph());
    source
        .add_block(common::CONFIG_NODE, common::image_with_elements("img"))
        .unwrap();
    let exported = export_flow(
        &source,
        &ExportOptions {
            name: "Welcome".to_string(),
            include_timestamp: true,
        },
    )
    .unwrap();

    assert_eq!(exported["name"], "Welcome");
    assert!(exported["exportedAt"].is_string());
    assert!(exported["blocksByNode"][common::CONFIG_NODE].is_array());

    let mut target = EditorSession::new(FlowGraph::default());
    import_flow(&mut target, exported, true).unwrap();
    assert_eq!(target.graph(), source.graph());
    assert_eq!(target.history().len(), 1);
}

#[test]
fn test_export_without_timestamp_omits_field() {
    let session = EditorSession::new(common::config_graph());
    let exported = export_flow(&session, &ExportOptions::default()).unwrap();
    assert!(exported.get("exportedAt").is_none());
}

#[test]
fn test_import_without_clearing_is_undoable() {
    let mut session = EditorSession::new(common::config_graph());
    let before = session.graph().clone();
    let document = json!({
        "name": "Other",
        "nodes": [{ "id": "solo", "type": "messageNode", "position": { "x": 1.0, "y": 2.0 } }],
        "edges": [],
        "blocksByNode": {}
    });

    import_flow(&mut session, document, false).unwrap();
    assert_eq!(common::node_ids(session.graph()), vec!["solo"]);
    assert_eq!(session.history().len(), 2);

    assert!(session.undo());
    assert_eq!(session.graph(), &before);
}

#[test]
fn test_malformed_import_leaves_graph_unchanged() {
    let mut session = EditorSession::new(common::config_graph());
    session.add_node(common::node("n-2", "messageNode")).unwrap();
    let before = session.graph().clone();
    let revision = session.revision();

    let missing_id = json!({
        "name": "Broken",
        "nodes": [{ "type": "messageNode", "position": { "x": 0.0, "y": 0.0 } }],
        "edges": []
    });
    let err = import_flow(&mut session, missing_id, true).unwrap_err();
    assert!(matches!(err, DocumentError::JsonParseError(_)));
    assert_eq!(session.graph(), &before);
    assert_eq!(session.revision(), revision);
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_structurally_invalid_import_is_rejected() {
    let mut session = EditorSession::new(common::config_graph());
    let before = session.graph().clone();
    let dangling = json!({
        "nodes": [{ "id": "a", "type": "messageNode" }],
        "edges": [{ "id": "e", "source": "a", "target": "ghost" }]
    });

    let err = import_flow(&mut session, dangling, false).unwrap_err();
    assert!(matches!(err, DocumentError::Invalid(ref errors) if errors.iter().any(|e| e.contains("ghost"))));
    assert_eq!(session.graph(), &before);
}

#[test]
fn test_workspace_document_round_trips_through_stores() {
    let catalog = common::onboarding_catalog();
    let result = Instantiator::new(&catalog)
        .instantiate_by_id("bp-onboarding", "script-1")
        .unwrap();
    let mut workspace = Workspace::new();
    workspace.put_script(common::script("script-1"));
    workspace.insert_instantiation(result);

    let document = WorkspaceDocument::from_stores(&catalog, &workspace);
    assert!(document.validate().valid, "{:?}", document.validate().errors);

    let json = serde_json::to_string(&document).unwrap();
    let reloaded = WorkspaceDocument::from_json(&json).unwrap();
    assert_eq!(reloaded, document);

    let (catalog, workspace) = reloaded.into_stores().unwrap();
    assert!(catalog.blueprint("bp-onboarding").is_some());
    assert_eq!(workspace.flows().count(), 2);
    let setup = workspace.setups().next().unwrap();
    assert_eq!(workspace.flows_of(&setup.id).len(), 2);
}

#[test]
fn test_workspace_document_reports_dangling_references() {
    let mut document = WorkspaceDocument::from_stores(&common::onboarding_catalog(), &Workspace::new());
    document.templates.retain(|t| t.id != "t-welcome");

    let validation = document.validate();
    assert!(!validation.valid);
    assert!(validation.errors.iter().any(|e| e.contains("missing template 't-welcome'")));
    assert!(matches!(document.into_stores(), Err(DocumentError::Invalid(_))));
}
