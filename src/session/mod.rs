//! The editing session: an explicit context object that owns one live graph,
//! its history and its constraint engine.
//!
//! A session is created with [`EditorSession::builder`], used through its
//! commands, and disposed with [`EditorSession::dispose`]. Nothing is global,
//! so independent sessions can live side by side.
//!
//! The display layer pulls [`EditorSession::graph`] after each command and can
//! poll [`EditorSession::revision`] to notice changes. Undo, redo and import
//! swap the whole graph in one step through [`EditorSession::replace`].

mod branch;

use crate::config::EngineConfig;
use crate::constraint::{ConstraintConfig, ConstraintEngine};
use crate::error::{ConstraintViolation, LedgerError, SessionError};
use crate::history::{EdgeChange, GraphChange, History};
use crate::model::{Block, Edge, Flow, FlowGraph, Node, Validate, Validation};
use ahash::AHashSet;
use branch::BranchIndex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub struct SessionBuilder {
    graph: FlowGraph,
    config: EngineConfig,
}

impl SessionBuilder {
    pub fn new(graph: FlowGraph) -> Self {
        Self {
            graph,
            config: EngineConfig::default(),
        }
    }

    /// Starts from a flow's graph with the flow's block data laid over each block.
    pub fn for_flow(flow: &Flow) -> Self {
        let mut graph = flow.graph.clone();
        for block in graph.blocks_by_node.values_mut().flatten() {
            if let Some(data) = flow.blocks.get(&block.id) {
                block.data = data.clone();
            }
        }
        Self::new(graph)
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_history_limit(mut self, max_entries: usize) -> Self {
        self.config.history.max_entries = max_entries;
        self
    }

    pub fn with_constraints(mut self, constraints: ConstraintConfig) -> Self {
        self.config.constraints = constraints;
        self
    }

    /// Builds the session and records the starting graph as history entry 0.
    pub fn build(self) -> EditorSession {
        let mut history = History::new(self.config.history);
        history.save_state(&self.graph);
        EditorSession {
            branch_index: BranchIndex::build(&self.graph),
            graph: self.graph,
            history,
            constraints: ConstraintEngine::new(self.config.constraints),
            selection: AHashSet::new(),
            revision: 0,
        }
    }
}

pub struct EditorSession {
    graph: FlowGraph,
    history: History,
    constraints: ConstraintEngine,
    branch_index: BranchIndex,
    selection: AHashSet<String>,
    revision: u64,
}

impl EditorSession {
    pub fn builder(graph: FlowGraph) -> SessionBuilder {
        SessionBuilder::new(graph)
    }

    pub fn new(graph: FlowGraph) -> Self {
        SessionBuilder::new(graph).build()
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn constraints(&self) -> &ConstraintEngine {
        &self.constraints
    }

    /// Increments on every change to the live graph or selection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn validate_constraints(&self) -> Validation {
        self.constraints.validate(&self.graph)
    }

    /// Applies one batch of node changes from the display layer.
    ///
    /// The batch records at most one history entry, and only when it holds an
    /// addition, a removal or the end of a drag. Returns whether it recorded.
    pub fn apply_node_changes(&mut self, changes: Vec<GraphChange>) -> Result<bool, SessionError> {
        let mut incoming = AHashSet::new();
        for change in &changes {
            if let GraphChange::Add { node, blocks } = change {
                let ids = std::iter::once(&node.id).chain(blocks.iter().map(|b| &b.id));
                for id in ids {
                    if self.graph.contains_id(id) || !incoming.insert(id.as_str()) {
                        return Err(SessionError::DuplicateId(id.clone()));
                    }
                }
            }
        }

        let significant = changes.iter().any(GraphChange::is_history_significant);
        for change in changes {
            match change {
                GraphChange::Add { node, blocks } => {
                    if !blocks.is_empty() {
                        self.graph.blocks_by_node.insert(node.id.clone(), blocks);
                    }
                    self.graph.nodes.push(node);
                }
                GraphChange::Remove { id } => {
                    if self.detach_node(&id).is_none() {
                        debug!(node_id = %id, "ignoring removal of unknown node");
                    }
                }
                GraphChange::Position { id, position, .. } => {
                    if let (Some(node), Some(position)) = (self.node_mut(&id), position) {
                        node.position = position;
                    }
                }
                GraphChange::Select { id, selected } => self.set_selected(id, selected),
                GraphChange::Resize { id, dimensions } => {
                    if let Some(node) = self.node_mut(&id) {
                        node.dimensions = Some(dimensions);
                    }
                }
            }
        }

        self.finish(significant);
        Ok(significant)
    }

    /// Applies one batch of edge changes from the display layer.
    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) -> Result<bool, SessionError> {
        let mut incoming = AHashSet::new();
        for change in &changes {
            if let EdgeChange::Add { edge } = change {
                self.check_connectable(edge)?;
                if !incoming.insert(edge.id.as_str()) {
                    return Err(SessionError::DuplicateId(edge.id.clone()));
                }
            }
        }

        let significant = changes.iter().any(EdgeChange::is_history_significant);
        for change in changes {
            match change {
                EdgeChange::Add { edge } => {
                    let edge = self.with_branch(edge);
                    self.graph.edges.push(edge);
                }
                EdgeChange::Remove { id } => {
                    self.graph.edges.retain(|e| e.id != id);
                    self.selection.remove(&id);
                }
                EdgeChange::Select { id, selected } => self.set_selected(id, selected),
            }
        }

        self.finish(significant);
        Ok(significant)
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), SessionError> {
        if self.graph.contains_id(&node.id) {
            return Err(SessionError::DuplicateId(node.id));
        }
        self.graph.nodes.push(node);
        self.commit();
        Ok(())
    }

    /// Removes a node with its incident edges and blocks.
    pub fn remove_node(&mut self, node_id: &str) -> Result<Node, SessionError> {
        let node = self
            .detach_node(node_id)
            .ok_or_else(|| SessionError::NodeNotFound(node_id.to_string()))?;
        self.commit();
        Ok(node)
    }

    /// Adds an edge. When its source handle names a condition block of the
    /// source node, the branch label and expression are attached.
    pub fn connect(&mut self, edge: Edge) -> Result<(), SessionError> {
        self.check_connectable(&edge)?;
        let edge = self.with_branch(edge);
        self.graph.edges.push(edge);
        self.commit();
        Ok(())
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<Edge, SessionError> {
        let index = self
            .graph
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| SessionError::EdgeNotFound(edge_id.to_string()))?;
        let edge = self.graph.edges.remove(index);
        self.selection.remove(edge_id);
        self.commit();
        Ok(edge)
    }

    /// Appends a block to a node.
    pub fn add_block(&mut self, node_id: &str, block: Block) -> Result<(), SessionError> {
        if self.graph.node(node_id).is_none() {
            return Err(SessionError::NodeNotFound(node_id.to_string()));
        }
        if self.graph.contains_id(&block.id) {
            return Err(SessionError::DuplicateId(block.id));
        }
        self.graph
            .blocks_by_node
            .entry(node_id.to_string())
            .or_default()
            .push(block);
        self.commit();
        Ok(())
    }

    /// Adds a block to the configuration node after checking the flow's
    /// constraints against the graph as it would be with the block.
    pub fn try_add_config_block(&mut self, block: Block) -> Result<(), SessionError> {
        let config_id = self
            .graph
            .configuration_node()
            .map(|n| n.id.clone())
            .ok_or(SessionError::MissingConfigurationNode)?;

        let validation = self.constraints.validate_addition(&self.graph, &block);
        if !validation.valid {
            warn!(block_id = %block.id, errors = ?validation.errors, "rejected configuration block");
            return Err(ConstraintViolation(validation.errors).into());
        }
        self.add_block(&config_id, block)
    }

    pub fn remove_block(&mut self, block_id: &str) -> Result<Block, SessionError> {
        let block = self
            .graph
            .remove_block(block_id)
            .ok_or_else(|| SessionError::BlockNotFound(block_id.to_string()))?;
        self.commit();
        Ok(block)
    }

    pub fn reorder_blocks(
        &mut self,
        node_id: &str,
        from: usize,
        to: usize,
    ) -> Result<(), SessionError> {
        let blocks = self
            .graph
            .blocks_by_node
            .get_mut(node_id)
            .ok_or_else(|| SessionError::NodeNotFound(node_id.to_string()))?;
        if from >= blocks.len() {
            return Err(LedgerError::IndexOutOfRange {
                index: from,
                len: blocks.len(),
            }
            .into());
        }
        let block = blocks.remove(from);
        let target = to.min(blocks.len());
        blocks.insert(target, block);
        self.commit();
        Ok(())
    }

    pub fn update_block_data(&mut self, block_id: &str, data: Value) -> Result<(), SessionError> {
        let block = self
            .graph
            .find_block_mut(block_id)
            .ok_or_else(|| SessionError::BlockNotFound(block_id.to_string()))?;
        block.data = data;
        self.commit();
        Ok(())
    }

    /// Runs `edit` against a copy of the live graph and swaps it in only if the
    /// edit succeeds and the result is structurally valid. One history entry.
    pub fn transact<F>(&mut self, edit: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut FlowGraph) -> Result<(), SessionError>,
    {
        let mut draft = self.graph.clone();
        edit(&mut draft)?;
        draft
            .validate()
            .into_result()
            .map_err(SessionError::Invalid)?;
        self.graph = draft;
        self.commit();
        Ok(())
    }

    /// Records the live graph as a new history entry.
    pub fn save_state(&mut self) -> bool {
        self.history.save_state(&self.graph)
    }

    /// Steps back one state. Unrecorded edits to the live graph are folded
    /// into the current entry first, so a following redo brings them back.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        self.settle_pending();
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn jump_to_state(&mut self, index: usize) -> bool {
        if index >= self.history.len() {
            return false;
        }
        self.settle_pending();
        match self.history.jump_to_state(index).cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Forgets all history; the live graph becomes the only entry.
    pub fn clear_history(&mut self) {
        self.history.clear_history();
        self.history.save_state(&self.graph);
    }

    /// Swaps the whole live graph in one step without touching history.
    pub fn replace(&mut self, graph: FlowGraph) {
        self.restore(graph);
    }

    /// The flow with this session's edits: the graph shape keeps the flow's
    /// original block configuration and the live block data goes to `blocks`.
    pub fn write_back(&self, flow: &Flow) -> Flow {
        let mut graph = self.graph.clone();
        let mut blocks = BTreeMap::new();
        for block in graph.blocks_by_node.values_mut().flatten() {
            let shape = flow
                .graph
                .find_block(&block.id)
                .map(|(_, b)| b.data.clone())
                .unwrap_or(Value::Null);
            blocks.insert(block.id.clone(), std::mem::replace(&mut block.data, shape));
        }
        let mut next = flow.with_graph(graph);
        next.blocks = blocks;
        next
    }

    /// Ends the session and hands back the live graph.
    pub fn dispose(self) -> FlowGraph {
        self.graph
    }

    fn restore(&mut self, graph: FlowGraph) {
        self.history.set_restoring(true);
        self.graph = graph;
        let graph = &self.graph;
        self.selection.retain(|id| graph.node(id).is_some() || graph.edge(id).is_some());
        self.commit();
        self.history.set_restoring(false);
        debug!(revision = self.revision, "replaced live graph");
    }

    fn settle_pending(&mut self) {
        let dirty = self.history.current().is_some_and(|snapshot| snapshot != &self.graph);
        if dirty && self.history.amend_current(&self.graph) {
            debug!(revision = self.revision, "folded unrecorded edits into history");
        }
    }

    fn commit(&mut self) {
        self.branch_index = BranchIndex::build(&self.graph);
        self.revision += 1;
        self.history.save_state(&self.graph);
    }

    fn finish(&mut self, significant: bool) {
        if significant {
            self.commit();
        } else {
            self.revision += 1;
        }
    }

    fn check_connectable(&self, edge: &Edge) -> Result<(), SessionError> {
        if self.graph.contains_id(&edge.id) {
            return Err(SessionError::DuplicateId(edge.id.clone()));
        }
        for endpoint in [&edge.source, &edge.target] {
            if self.graph.node(endpoint).is_none() {
                return Err(SessionError::NodeNotFound(endpoint.clone()));
            }
        }
        Ok(())
    }

    fn with_branch(&self, mut edge: Edge) -> Edge {
        if edge.branch.is_none() {
            edge.branch = self.branch_index.branch_for(&edge);
        }
        edge
    }

    fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.graph.nodes.iter_mut().find(|n| n.id == node_id)
    }

    fn set_selected(&mut self, id: String, selected: bool) {
        if selected {
            self.selection.insert(id);
        } else {
            self.selection.remove(&id);
        }
    }

    fn detach_node(&mut self, node_id: &str) -> Option<Node> {
        let index = self.graph.nodes.iter().position(|n| n.id == node_id)?;
        let node = self.graph.nodes.remove(index);
        self.graph.edges.retain(|e| !e.touches(node_id));
        self.graph.blocks_by_node.remove(node_id);
        self.selection.remove(node_id);
        Some(node)
    }
}
