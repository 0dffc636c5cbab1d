use super::fields::ENTRY_BLOCK_ID;
use super::impact::{ChangeKind, ImpactAnalysis, ResetAction};
use crate::error::SessionError;
use crate::model::{Block, FlowGraph};
use crate::session::EditorSession;
use serde_json::Value;
use tracing::{info, warn};

/// The yes/no gate a destructive change must pass before anything is mutated.
pub trait ConfirmationGate {
    fn confirm(&mut self, analysis: &ImpactAnalysis) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: FnMut(&ImpactAnalysis) -> bool,
{
    fn confirm(&mut self, analysis: &ImpactAnalysis) -> bool {
        self(analysis)
    }
}

impl ConfirmationGate for bool {
    fn confirm(&mut self, _analysis: &ImpactAnalysis) -> bool {
        *self
    }
}

/// A fixed answer, for callers that already asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

impl ConfirmationGate for Decision {
    fn confirm(&mut self, _analysis: &ImpactAnalysis) -> bool {
        *self == Decision::Approve
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome {
    /// Dependents were reset and the change applied as one history entry.
    Applied(ImpactAnalysis),
    /// The gate said no; nothing was touched.
    Declined(ImpactAnalysis),
}

/// Runs impact analysis for a change to `block_id` and, once confirmed, resets
/// the affected fields and applies `apply` as a single transaction.
///
/// The gate is only consulted when some block is affected. A declined change
/// leaves the session exactly as it was.
pub fn confirm_change<G, F>(
    session: &mut EditorSession,
    block_id: &str,
    change: ChangeKind,
    gate: &mut G,
    apply: F,
) -> Result<ChangeOutcome, SessionError>
where
    G: ConfirmationGate + ?Sized,
    F: FnOnce(&mut FlowGraph) -> Result<(), SessionError>,
{
    let analysis = session
        .constraints()
        .analyze_change_impact(session.graph(), block_id, change);

    if !analysis.is_empty() && !gate.confirm(&analysis) {
        info!(block_id, ?change, "change declined");
        return Ok(ChangeOutcome::Declined(analysis));
    }

    session.transact(|graph| {
        apply_resets(graph, &analysis);
        apply(graph)
    })?;
    Ok(ChangeOutcome::Applied(analysis))
}

/// Removes a shared block after confirmation, resetting everything that referred to it.
pub fn remove_shared_block<G>(
    session: &mut EditorSession,
    block_id: &str,
    gate: &mut G,
) -> Result<ChangeOutcome, SessionError>
where
    G: ConfirmationGate + ?Sized,
{
    if session.graph().find_block(block_id).is_none() {
        return Err(SessionError::BlockNotFound(block_id.to_string()));
    }
    confirm_change(session, block_id, ChangeKind::Remove, gate, |graph| {
        graph
            .remove_block(block_id)
            .map(|_| ())
            .ok_or_else(|| SessionError::BlockNotFound(block_id.to_string()))
    })
}

/// Clears only the fields named by `analysis` on each affected block, recorded
/// as one history entry. Returns the number of fields reset.
pub fn reset_affected_blocks(
    session: &mut EditorSession,
    analysis: &ImpactAnalysis,
) -> Result<usize, SessionError> {
    let mut count = 0;
    session.transact(|graph| {
        count = apply_resets(graph, analysis);
        Ok(())
    })?;
    Ok(count)
}

fn apply_resets(graph: &mut FlowGraph, analysis: &ImpactAnalysis) -> usize {
    let mut count = 0;
    for affected in &analysis.affected {
        let Some(block) = graph.find_block_mut(&affected.block_id) else {
            warn!(block_id = %affected.block_id, "affected block vanished before reset");
            continue;
        };
        for reset in &affected.fields {
            if reset_field(block, &reset.field, reset.action, &analysis.block_id) {
                count += 1;
            }
        }
    }
    count
}

fn reset_field(block: &mut Block, field: &str, action: ResetAction, block_id: &str) -> bool {
    let Some(data) = block.data.as_object_mut() else {
        return false;
    };
    match action {
        ResetAction::Clear => data.insert(field.to_string(), Value::Null).is_some(),
        ResetAction::RemoveEntries => match data.get_mut(field).and_then(Value::as_array_mut) {
            Some(entries) => {
                entries.retain(|entry| {
                    entry.get(ENTRY_BLOCK_ID).and_then(Value::as_str) != Some(block_id)
                });
                true
            }
            None => false,
        },
    }
}
