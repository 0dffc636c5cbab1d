//! Keys the constraint and impact engine reads from `Block::data`.

use crate::model::{Block, BlockKind};
use serde_json::Value;

pub const VISUAL_ELEMENTS: &str = "visualElements";
pub const VISUAL_OBJECTS: &str = "objects";
pub const VISUAL_TEXTS: &str = "texts";
pub const INTEGRATION_TYPE: &str = "integrationType";
pub const INTEGRATION_SUB_KIND: &str = "integrationSubKind";
pub const COLLECTION_METHODS: &str = "collectionMethods";
pub const ACTION_TARGET: &str = "actionTarget";
pub const ACTION_METHOD: &str = "actionMethod";
pub const ACTION_ELEMENT_ID: &str = "actionElementId";
pub const PREDEFINED_CONDITIONS: &str = "predefinedConditions";
pub const SELECTED_ASSET_ID: &str = "selectedAssetId";
/// Key inside list entries naming the block the entry depends on.
pub const ENTRY_BLOCK_ID: &str = "blockId";

/// An image block whose visual-elements configuration holds any object or text overlay.
pub fn has_visual_elements(block: &Block) -> bool {
    if block.kind != BlockKind::Image {
        return false;
    }
    let Some(elements) = block.field(VISUAL_ELEMENTS) else {
        return false;
    };
    [VISUAL_OBJECTS, VISUAL_TEXTS].iter().any(|key| {
        elements
            .get(key)
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty())
    })
}

/// Number of entries in the list at `field` whose `blockId` is `block_id`.
pub fn entries_referencing(block: &Block, field: &str, block_id: &str) -> usize {
    block
        .field(field)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.get(ENTRY_BLOCK_ID).and_then(Value::as_str) == Some(block_id))
                .count()
        })
        .unwrap_or(0)
}

pub fn points_at(block: &Block, field: &str, block_id: &str) -> bool {
    block.str_field(field) == Some(block_id)
}
