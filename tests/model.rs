//! Entity creation, validation and immutable mutators.
mod common;
use katagami::prelude::*;
use serde_json::json;

#[test]
fn test_create_fills_identity_and_timestamps() {
    let a = Section::create(SectionDraft::default());
    let b = Section::create(SectionDraft::default());
    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
    assert_eq!(a.created_at, a.updated_at);
}

#[test]
fn test_create_keeps_supplied_id() {
    let template = common::template("t-keep", "Keep");
    assert_eq!(template.id, "t-keep");
    assert_eq!(template.version, 1);
    assert!(template.validate().valid, "{:?}", template.validate().errors);
}

#[test]
fn test_template_with_structure_bumps_version_and_prunes_defaults() {
    let template = common::template("t-1", "One");
    let next = template.with_structure(FlowGraph {
        nodes: vec![common::node("start", "messageNode")],
        ..Default::default()
    });

    assert_eq!(next.version, 2);
    assert!(next.default_data.is_empty());
    assert_eq!(template.version, 1, "the original value is untouched");
    assert_eq!(template.default_data.len(), 1);
}

#[test]
fn test_template_validation_reports_dangling_edge() {
    let mut template = common::template("t-1", "One");
    template.graph.edges.push(Edge::new("e-bad", "start", "ghost"));
    let validation = template.validate();
    assert!(!validation.valid);
    assert!(
        validation.errors.iter().any(|e| e.contains("ghost")),
        "{:?}",
        validation.errors
    );
}

#[test]
fn test_section_requires_activity_type() {
    let section = Section::create(SectionDraft {
        name: Some("Unscoped".to_string()),
        ..Default::default()
    });
    assert!(!section.validate().valid);
}

#[test]
fn test_section_add_group_is_idempotent() {
    let section = Section::create(SectionDraft::default())
        .add_group("g-1")
        .add_group("g-1");
    assert_eq!(section.group_ids, vec!["g-1".to_string()]);
}

#[test]
fn test_setup_add_group_ignores_known_id() {
    let setup = Setup::create(SetupDraft {
        script_id: Some("script-1".to_string()),
        original_blueprint_id: Some("bp-1".to_string()),
        ..Default::default()
    })
    .add_group("g-a", "A", 0)
    .add_group("g-a", "Again", 1);

    assert_eq!(setup.groups.len(), 1);
    assert_eq!(setup.groups[0].group_name, "A");
    assert!(setup.validate().valid, "{:?}", setup.validate().errors);
}

#[test]
fn test_blueprint_flags_second_use_as_duplicate() {
    let blueprint = common::onboarding_blueprint();
    let group = blueprint.group("g-intro").unwrap();
    let flags: Vec<bool> = group.templates.iter().map(|t| t.is_duplicate).collect();
    assert_eq!(flags, vec![false, true]);
    assert_ne!(group.templates[0].instance_id, group.templates[1].instance_id);
    assert!(blueprint.validate().valid, "{:?}", blueprint.validate().errors);
}

#[test]
fn test_blueprint_remove_first_use_clears_duplicate_flag() {
    let blueprint = common::onboarding_blueprint();
    let first = blueprint.group("g-intro").unwrap().templates[0].instance_id.clone();

    let blueprint = blueprint.remove_template(&first);
    let group = blueprint.group("g-intro").unwrap();
    assert_eq!(group.templates.len(), 1);
    assert!(!group.templates[0].is_duplicate);
    assert_eq!(group.templates[0].position, 0);
}

#[test]
fn test_blueprint_tampered_duplicate_flag_is_invalid() {
    let mut blueprint = common::onboarding_blueprint();
    blueprint.groups[0].templates[1].is_duplicate = false;
    assert!(!blueprint.validate().valid);
}

#[test]
fn test_flow_with_block_data_leaves_original() {
    let flow = Flow::create(FlowDraft {
        setup_id: Some("setup-1".to_string()),
        group_id: Some("group-1".to_string()),
        template_id: Some("t-1".to_string()),
        instance_id: Some("i-1".to_string()),
        ..Default::default()
    });
    let edited = flow.with_block_data("b-1", json!({ "text": "hi" }));
    assert!(flow.blocks.is_empty());
    assert_eq!(edited.blocks["b-1"], json!({ "text": "hi" }));
    assert_eq!(edited.template_id(), "t-1");
    assert!(edited.validate().valid);
}

#[test]
fn test_graph_rejects_second_configuration_node() {
    let mut graph = common::config_graph();
    graph.nodes.push(common::node("config-2", "configNode"));
    assert!(!graph.validate().valid);
}

#[test]
fn test_node_serialises_type_key() {
    let value = serde_json::to_value(common::node("n-1", "messageNode")).unwrap();
    assert_eq!(value["type"], "messageNode");
    assert_eq!(value["position"], json!({ "x": 0.0, "y": 0.0 }));
}
