use crate::error::ReferenceError;
use crate::instantiate::Instantiation;
use crate::model::{Flow, Script, Setup};
use ahash::AHashMap;
use tracing::{debug, info};

/// Collaborator-owned scripts, setups and flows.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    scripts: AHashMap<String, Script>,
    setups: AHashMap<String, Setup>,
    flows: AHashMap<String, Flow>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, id: &str) -> Option<&Script> {
        self.scripts.get(id)
    }

    pub fn setup(&self, id: &str) -> Option<&Setup> {
        self.setups.get(id)
    }

    pub fn flow(&self, id: &str) -> Option<&Flow> {
        self.flows.get(id)
    }

    pub fn scripts(&self) -> impl Iterator<Item = &Script> {
        self.scripts.values()
    }

    pub fn setups(&self) -> impl Iterator<Item = &Setup> {
        self.setups.values()
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn put_script(&mut self, script: Script) {
        self.scripts.insert(script.id.clone(), script);
    }

    /// Stores a freshly instantiated setup together with all of its flows.
    pub fn insert_instantiation(&mut self, instantiation: Instantiation) {
        let Instantiation { setup, flows } = instantiation;
        debug!(setup_id = %setup.id, flows = flows.len(), "storing instantiation");
        for flow in flows {
            self.flows.insert(flow.id.clone(), flow);
        }
        self.setups.insert(setup.id.clone(), setup);
    }

    /// Replaces a stored setup. Flows of groups that no longer exist are deleted.
    pub fn update_setup(&mut self, setup: Setup) -> Result<Vec<Flow>, ReferenceError> {
        if !self.setups.contains_key(&setup.id) {
            return Err(ReferenceError::SetupNotFound(setup.id.clone()));
        }
        let kept: Vec<&str> = setup.flow_ids();
        let orphaned: Vec<String> = self
            .flows
            .values()
            .filter(|f| f.setup_id == setup.id && !kept.contains(&f.id.as_str()))
            .map(|f| f.id.clone())
            .collect();
        let removed = orphaned
            .iter()
            .filter_map(|id| self.flows.remove(id))
            .collect();
        self.setups.insert(setup.id.clone(), setup);
        Ok(removed)
    }

    /// Stores a flow whose setup already exists.
    pub fn put_flow(&mut self, flow: Flow) -> Result<(), ReferenceError> {
        if !self.setups.contains_key(&flow.setup_id) {
            return Err(ReferenceError::SetupNotFound(flow.setup_id.clone()));
        }
        self.flows.insert(flow.id.clone(), flow);
        Ok(())
    }

    /// Flows of a setup in group order, then flow order.
    pub fn flows_of(&self, setup_id: &str) -> Vec<&Flow> {
        self.setups
            .get(setup_id)
            .map(|setup| {
                setup
                    .flow_ids()
                    .into_iter()
                    .filter_map(|id| self.flows.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deletes a setup and every flow that belongs to it.
    pub fn delete_setup(&mut self, setup_id: &str) -> Result<(Setup, Vec<Flow>), ReferenceError> {
        let setup = self
            .setups
            .remove(setup_id)
            .ok_or_else(|| ReferenceError::SetupNotFound(setup_id.to_string()))?;
        let flow_ids: Vec<String> = self
            .flows
            .values()
            .filter(|f| f.setup_id == setup_id)
            .map(|f| f.id.clone())
            .collect();
        let flows: Vec<Flow> = flow_ids
            .iter()
            .filter_map(|id| self.flows.remove(id))
            .collect();
        info!(setup_id, flows = flows.len(), "deleted setup");
        Ok((setup, flows))
    }

    /// Deletes one flow and detaches it from its setup.
    pub fn delete_flow(&mut self, flow_id: &str) -> Result<Flow, ReferenceError> {
        let flow = self
            .flows
            .remove(flow_id)
            .ok_or_else(|| ReferenceError::FlowNotFound(flow_id.to_string()))?;
        if let Some(setup) = self.setups.get(&flow.setup_id) {
            let detached = setup.detach_flow(flow_id);
            self.setups.insert(detached.id.clone(), detached);
        }
        Ok(flow)
    }

    /// Deletes a script and cascades to the setups created under it.
    pub fn delete_script(&mut self, script_id: &str) -> Option<Script> {
        let script = self.scripts.remove(script_id)?;
        let setup_ids: Vec<String> = self
            .setups
            .values()
            .filter(|s| s.script_id == script_id)
            .map(|s| s.id.clone())
            .collect();
        for setup_id in setup_ids {
            if let Err(err) = self.delete_setup(&setup_id) {
                debug!(%setup_id, %err, "setup vanished during script cascade");
            }
        }
        Some(script)
    }
}
