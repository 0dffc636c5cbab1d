//! Common test utilities for building templates, catalogs and editable graphs.
use katagami::prelude::*;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const CONFIG_NODE: &str = "config";
pub const MESSAGE_NODE: &str = "message";

#[allow(dead_code)]
pub fn node(id: &str, node_type: &str) -> Node {
    Node::new(id, node_type, Point::default())
}

/// A graph with one configuration node and one message node connected by `e-1`.
#[allow(dead_code)]
pub fn config_graph() -> FlowGraph {
    FlowGraph {
        nodes: vec![node(CONFIG_NODE, "configNode"), node(MESSAGE_NODE, "messageNode")],
        edges: vec![Edge::new("e-1", CONFIG_NODE, MESSAGE_NODE)],
        blocks_by_node: BTreeMap::new(),
    }
}

/// Same as [`config_graph`] with `blocks` on the configuration node.
#[allow(dead_code)]
pub fn config_graph_with(blocks: Vec<Block>) -> FlowGraph {
    let mut graph = config_graph();
    graph.blocks_by_node.insert(CONFIG_NODE.to_string(), blocks);
    graph
}

/// An image block whose visual elements hold one object overlay.
#[allow(dead_code)]
pub fn image_with_elements(id: &str) -> Block {
    Block::new(
        id,
        BlockKind::Image,
        json!({ "visualElements": { "objects": [{ "id": "obj-1" }], "texts": [] } }),
    )
}

#[allow(dead_code)]
pub fn plain_block(id: &str, kind: BlockKind) -> Block {
    Block::new(id, kind, json!({}))
}

#[allow(dead_code)]
pub fn integration(id: &str, integration_type: &str, sub_kind: Option<&str>) -> Block {
    let mut data = json!({ "integrationType": integration_type });
    if let Some(sub_kind) = sub_kind {
        data["integrationSubKind"] = Value::String(sub_kind.to_string());
    }
    Block::new(id, BlockKind::Integration, data)
}

/// A two-node template with a text block seeded by default data.
#[allow(dead_code)]
pub fn template(id: &str, name: &str) -> Template {
    let text_block = format!("{}-text", id);
    let mut blocks_by_node = BTreeMap::new();
    blocks_by_node.insert(
        "start".to_string(),
        vec![Block::new(&text_block, BlockKind::Text, json!({ "text": "" }))],
    );
    let mut default_data = BTreeMap::new();
    default_data.insert(text_block, json!({ "text": "Hello" }));

    Template::create(TemplateDraft {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        graph: Some(FlowGraph {
            nodes: vec![node("start", "messageNode"), node("end", "messageNode")],
            edges: vec![Edge::new("start-end", "start", "end")],
            blocks_by_node,
        }),
        default_data: Some(default_data),
        ..Default::default()
    })
}

/// A catalog whose blueprint `bp-onboarding` holds one group with the welcome
/// template twice (the second use flagged as duplicate).
#[allow(dead_code)]
pub fn onboarding_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.put_template(template("t-welcome", "Welcome"));
    catalog.put_template(template("t-survey", "Survey"));

    let group = Group::create(GroupDraft {
        id: Some("g-intro".to_string()),
        name: Some("Intro".to_string()),
        ..Default::default()
    })
    .add_template("t-welcome", 0)
    .add_template("t-survey", 1);
    catalog.put_group(group);

    let section = Section::create(SectionDraft {
        id: Some("s-onboarding".to_string()),
        name: Some("Onboarding".to_string()),
        activity_type: Some("onboarding".to_string()),
        ..Default::default()
    })
    .add_group("g-intro");
    catalog.put_section(section);

    catalog.put_blueprint(onboarding_blueprint());
    catalog
}

#[allow(dead_code)]
pub fn onboarding_blueprint() -> Blueprint {
    Blueprint::create(BlueprintDraft {
        id: Some("bp-onboarding".to_string()),
        name: Some("Onboarding".to_string()),
        section_id: Some("s-onboarding".to_string()),
        ..Default::default()
    })
    .add_group("g-intro", "Intro", 0)
    .add_template("g-intro", "t-welcome", "Welcome", 0)
    .and_then(|b| b.add_template("g-intro", "t-welcome", "Welcome", 1))
    .expect("g-intro was just added")
}

#[allow(dead_code)]
pub fn script(id: &str) -> Script {
    Script::create(ScriptDraft {
        id: Some(id.to_string()),
        name: Some("Launch".to_string()),
        created_by: Some("collaborator-1".to_string()),
        ..Default::default()
    })
    .add_section("s-onboarding", "Onboarding", 0)
}

#[allow(dead_code)]
pub fn node_ids(graph: &FlowGraph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}
