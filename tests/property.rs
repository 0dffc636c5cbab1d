//! Property tests for ledger density and undo/redo round-trips.
mod common;
use katagami::ledger;
use katagami::model::TemplateRef;
use katagami::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum LedgerOp {
    Insert(usize),
    Remove(usize),
    Reorder(usize, usize),
}

fn ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (0usize..12).prop_map(LedgerOp::Insert),
        (0usize..12).prop_map(LedgerOp::Remove),
        (0usize..12, 0usize..12).prop_map(|(from, to)| LedgerOp::Reorder(from, to)),
    ]
}

proptest! {
    #[test]
    fn ledger_stays_dense(ops in prop::collection::vec(ledger_op(), 0..40)) {
        let mut list: Vec<TemplateRef> = Vec::new();
        for (step, op) in ops.into_iter().enumerate() {
            list = match op {
                LedgerOp::Insert(position) => ledger::insert_at(
                    list,
                    TemplateRef { template_id: format!("t-{}", step), position: 0 },
                    position,
                ),
                LedgerOp::Remove(index) => {
                    let target = list.get(index).map(|t| t.template_id.clone());
                    ledger::remove_and_compact(list, |t| Some(&t.template_id) == target.as_ref())
                }
                LedgerOp::Reorder(from, to) => {
                    let len = list.len();
                    match ledger::reorder(list.clone(), from, to) {
                        Ok(next) => next,
                        Err(_) => {
                            prop_assert!(from >= len);
                            list
                        }
                    }
                }
            };
            prop_assert!(ledger::is_dense(&list));
        }
    }

    #[test]
    fn undo_all_then_redo_all_round_trips(count in 1usize..15) {
        let mut session = EditorSession::new(common::config_graph());
        let initial = session.graph().clone();
        for i in 0..count {
            session.add_node(common::node(&format!("n-{}", i), "messageNode")).unwrap();
        }
        let last = session.graph().clone();

        for _ in 0..count {
            prop_assert!(session.undo());
        }
        prop_assert_eq!(session.graph(), &initial);
        for _ in 0..count {
            prop_assert!(session.redo());
        }
        prop_assert_eq!(session.graph(), &last);
        prop_assert!(!session.redo());
    }
}
