//! Configuration constraints, impact analysis and confirmed resets.
mod common;
use katagami::constraint::{ConstraintConfig, ResetAction, reset_affected_blocks};
use katagami::error::SessionError;
use katagami::prelude::*;
use serde_json::{Value, json};

fn engine() -> ConstraintEngine {
    ConstraintEngine::new(ConstraintConfig::default())
}

/// A configuration node holding an image and three blocks that depend on it.
fn dependent_graph() -> FlowGraph {
    common::config_graph_with(vec![
        common::image_with_elements("img"),
        Block::new(
            "collect",
            BlockKind::Collection,
            json!({ "collectionMethods": [
                { "blockId": "img", "method": "tap" },
                { "blockId": "other", "method": "swipe" }
            ] }),
        ),
        Block::new(
            "act",
            BlockKind::Action,
            json!({ "actionTarget": "img", "actionMethod": "open", "actionElementId": "obj-1", "note": "keep" }),
        ),
        Block::new(
            "cond",
            BlockKind::Condition,
            json!({ "predefinedConditions": [{ "blockId": "img", "expression": "seen" }], "label": "Seen" }),
        ),
        Block::new("unrelated", BlockKind::Text, json!({ "text": "hi" })),
    ])
}

#[test]
fn test_second_visual_element_image_is_rejected() {
    let mut session = EditorSession::new(common::config_graph_with(vec![common::image_with_elements("img-1")]));
    let before = session.graph().clone();

    let err = session
        .try_add_config_block(common::image_with_elements("img-2"))
        .unwrap_err();
    assert!(matches!(err, SessionError::Constraint(_)));
    assert_eq!(session.graph(), &before);

    session
        .try_add_config_block(common::plain_block("img-3", BlockKind::Image))
        .unwrap();
    assert!(session.validate_constraints().valid);
}

#[test]
fn test_config_block_needs_configuration_node() {
    let mut graph = common::config_graph();
    graph.nodes.retain(|n| !n.is_configuration());
    graph.edges.clear();
    let mut session = EditorSession::new(graph);
    assert_eq!(
        session.try_add_config_block(common::plain_block("b", BlockKind::Text)),
        Err(SessionError::MissingConfigurationNode)
    );
}

#[test]
fn test_integration_type_and_sub_kind_must_match() {
    let graph = common::config_graph_with(vec![
        common::integration("i-1", "crm", Some("salesforce")),
        common::integration("i-2", "messaging", Some("whatsapp")),
    ]);
    let validation = engine().validate(&graph);
    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 2, "{:?}", validation.errors);
}

#[test]
fn test_sub_kind_required_for_configured_types() {
    let graph = common::config_graph_with(vec![common::integration("i-1", "crm", None)]);
    assert!(!engine().validate(&graph).valid);

    let graph = common::config_graph_with(vec![common::integration("i-1", "webhook", None)]);
    assert!(engine().validate(&graph).valid);
}

#[test]
fn test_dual_asset_follows_allow_list() {
    let media = || {
        vec![
            common::plain_block("img", BlockKind::Image),
            common::plain_block("vid", BlockKind::Video),
        ]
    };

    let mut blocks = media();
    blocks.push(common::integration("i-1", "messaging", Some("whatsapp")));
    let graph = common::config_graph_with(blocks);
    assert!(engine().dual_asset_allowed(&graph));
    assert!(engine().validate(&graph).valid);

    let mut blocks = media();
    blocks.push(common::integration("i-1", "messaging", Some("sms")));
    let graph = common::config_graph_with(blocks);
    assert!(!engine().dual_asset_allowed(&graph));
    assert!(!engine().validate(&graph).valid);

    let graph = common::config_graph_with(media());
    assert!(engine().validate(&graph).valid, "no integration, no limit");
}

#[test]
fn test_shared_integration_profile() {
    let graph = common::config_graph_with(vec![common::integration("i-1", "crm", Some("hubspot"))]);
    let profile = engine().shared_integration(&graph).unwrap();
    assert_eq!(profile.integration_type, "crm");
    assert_eq!(profile.sub_kind.as_deref(), Some("hubspot"));
}

#[test]
fn test_removal_impact_lists_every_dependent() {
    let analysis = engine().analyze_change_impact(&dependent_graph(), "img", ChangeKind::Remove);

    let affected: Vec<&str> = analysis.affected.iter().map(|a| a.block_id.as_str()).collect();
    assert_eq!(affected, vec!["collect", "act", "cond"]);
    assert_eq!(analysis.field_count(), 5);
    assert_eq!(analysis.affected[0].fields[0].action, ResetAction::RemoveEntries);
    assert!(analysis.summary.contains("3 block(s)"), "{}", analysis.summary);
}

#[test]
fn test_type_change_impact_spares_targets() {
    let analysis = engine().analyze_change_impact(&dependent_graph(), "img", ChangeKind::TypeChange);
    let act = analysis.affected.iter().find(|a| a.block_id == "act").unwrap();
    let fields: Vec<&str> = act.fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["actionMethod"]);
}

#[test]
fn test_elements_change_impact() {
    let analysis = engine().analyze_change_impact(&dependent_graph(), "img", ChangeKind::ElementsChange);
    let affected: Vec<&str> = analysis.affected.iter().map(|a| a.block_id.as_str()).collect();
    assert_eq!(affected, vec!["act", "cond"]);
}

#[test]
fn test_no_dependents_skips_the_gate() {
    let mut session = EditorSession::new(dependent_graph());
    let mut asked = false;
    let outcome = remove_shared_block(&mut session, "unrelated", &mut |_: &ImpactAnalysis| {
        asked = true;
        false
    })
    .unwrap();

    assert!(matches!(outcome, ChangeOutcome::Applied(ref a) if a.is_empty()));
    assert!(!asked);
    assert!(session.graph().find_block("unrelated").is_none());
}

#[test]
fn test_declined_change_mutates_nothing() {
    let mut session = EditorSession::new(dependent_graph());
    let before = session.graph().clone();
    let revision = session.revision();

    let outcome = remove_shared_block(&mut session, "img", &mut Decision::Decline).unwrap();
    assert!(matches!(outcome, ChangeOutcome::Declined(_)));
    assert_eq!(session.graph(), &before);
    assert_eq!(session.revision(), revision);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_confirmed_removal_resets_only_dependent_fields() {
    let mut session = EditorSession::new(dependent_graph());
    let outcome = remove_shared_block(&mut session, "img", &mut true).unwrap();
    assert!(matches!(outcome, ChangeOutcome::Applied(ref a) if a.affected.len() == 3));

    let graph = session.graph();
    assert!(graph.find_block("img").is_none());

    let (_, collect) = graph.find_block("collect").unwrap();
    assert_eq!(
        collect.data["collectionMethods"],
        json!([{ "blockId": "other", "method": "swipe" }])
    );

    let (_, act) = graph.find_block("act").unwrap();
    assert_eq!(act.data["actionTarget"], Value::Null);
    assert_eq!(act.data["actionMethod"], Value::Null);
    assert_eq!(act.data["actionElementId"], Value::Null);
    assert_eq!(act.data["note"], "keep");

    let (_, cond) = graph.find_block("cond").unwrap();
    assert_eq!(cond.data["predefinedConditions"], json!([]));
    assert_eq!(cond.data["label"], "Seen");

    let (_, text) = graph.find_block("unrelated").unwrap();
    assert_eq!(text.data, json!({ "text": "hi" }));

    assert_eq!(session.history().len(), 2, "one snapshot for the whole change");
    assert!(session.undo());
    assert!(session.graph().find_block("img").is_some());
}

#[test]
fn test_confirm_change_applies_caller_edit() {
    let mut session = EditorSession::new(dependent_graph());
    let outcome = confirm_change(
        &mut session,
        "img",
        ChangeKind::ElementsChange,
        &mut Decision::Approve,
        |graph| {
            let block = graph
                .find_block_mut("img")
                .ok_or_else(|| SessionError::BlockNotFound("img".to_string()))?;
            block.data = json!({ "visualElements": { "objects": [], "texts": [] } });
            Ok(())
        },
    )
    .unwrap();

    assert!(matches!(outcome, ChangeOutcome::Applied(_)));
    let (_, act) = session.graph().find_block("act").unwrap();
    assert_eq!(act.data["actionTarget"], "img");
    assert_eq!(act.data["actionElementId"], Value::Null);
}

#[test]
fn test_reset_affected_blocks_counts_fields() {
    let mut session = EditorSession::new(dependent_graph());
    let analysis = session
        .constraints()
        .analyze_change_impact(session.graph(), "img", ChangeKind::TypeChange);
    let count = reset_affected_blocks(&mut session, &analysis).unwrap();
    assert_eq!(count, analysis.field_count());
    assert!(session.graph().find_block("img").is_some());
}
