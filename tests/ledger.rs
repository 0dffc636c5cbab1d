//! Position ledger behaviour as seen through the positioned entities.
mod common;
use katagami::error::{LedgerError, StructureError};
use katagami::ledger::{self, Positioned};
use katagami::model::{SetupGroup, TemplateRef};
use katagami::prelude::*;

fn positions<T: Positioned>(list: &[T]) -> Vec<usize> {
    list.iter().map(Positioned::position).collect()
}

fn refs(ids: &[&str]) -> Vec<TemplateRef> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| TemplateRef {
            template_id: id.to_string(),
            position,
        })
        .collect()
}

#[test]
fn test_insert_in_middle_shifts_followers() {
    let list = ledger::insert_at(
        refs(&["a", "b", "c"]),
        TemplateRef {
            template_id: "x".to_string(),
            position: 0,
        },
        1,
    );
    let ids: Vec<&str> = list.iter().map(|t| t.template_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "x", "b", "c"]);
    assert_eq!(positions(&list), vec![0, 1, 2, 3]);
}

#[test]
fn test_insert_beyond_end_appends() {
    let list = ledger::insert_at(
        refs(&["a"]),
        TemplateRef {
            template_id: "z".to_string(),
            position: 0,
        },
        42,
    );
    assert_eq!(list[1].template_id, "z");
    assert_eq!(positions(&list), vec![0, 1]);
}

#[test]
fn test_normalize_repairs_gaps() {
    let mut list = refs(&["a", "b", "c"]);
    list[0].position = 7;
    list[1].position = 3;
    list[2].position = 3;
    assert!(!ledger::is_dense(&list));

    let list = ledger::normalize(list);
    let ids: Vec<&str> = list.iter().map(|t| t.template_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert!(ledger::is_dense(&list));
}

#[test]
fn test_reorder_out_of_range_is_an_error() {
    let err = ledger::reorder(refs(&["a", "b"]), 5, 0).unwrap_err();
    assert_eq!(err, LedgerError::IndexOutOfRange { index: 5, len: 2 });
}

#[test]
fn test_reorder_clamps_target() {
    let list = ledger::reorder(refs(&["a", "b", "c"]), 0, 99).unwrap();
    let ids: Vec<&str> = list.iter().map(|t| t.template_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert_eq!(positions(&list), vec![0, 1, 2]);
}

#[test]
fn test_removing_middle_setup_group_compacts() {
    let setup = Setup::create(SetupDraft {
        script_id: Some("script-1".to_string()),
        original_blueprint_id: Some("bp-1".to_string()),
        ..Default::default()
    })
    .add_group("g-a", "A", 0)
    .add_group("g-b", "B", 1)
    .add_group("g-c", "C", 2);

    let setup = setup.remove_group("g-b");
    let groups: Vec<(&str, usize)> = setup
        .groups
        .iter()
        .map(|g: &SetupGroup| (g.group_id.as_str(), g.position))
        .collect();
    assert_eq!(groups, vec![("g-a", 0), ("g-c", 1)]);
    assert!(setup.validate().valid);
}

#[test]
fn test_blueprint_reorder_unknown_group_fails() {
    let blueprint = common::onboarding_blueprint();
    let err = blueprint.reorder_templates("g-missing", 0, 1).unwrap_err();
    assert!(matches!(err, StructureError::MissingChild { .. }));
}

#[test]
fn test_group_remove_template_compacts_every_use() {
    let group = Group::create(GroupDraft {
        name: Some("Mixed".to_string()),
        ..Default::default()
    })
    .add_template("t-a", 0)
    .add_template("t-b", 1)
    .add_template("t-a", 2);

    let group = group.remove_template("t-a");
    assert_eq!(group.templates.len(), 1);
    assert_eq!(group.templates[0].template_id, "t-b");
    assert_eq!(group.templates[0].position, 0);
}
