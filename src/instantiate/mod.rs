//! Turns a blueprint into an independent setup and one flow per template use.
//!
//! Everything that can fail (validation, reference resolution) runs before the
//! first identifier is generated, and the result is only handed back as a
//! whole, so a partial instantiation is never observable.

mod resync;

pub use resync::{Resync, resync_flow};

use crate::catalog::Catalog;
use crate::error::{InstantiateError, ReferenceError};
use crate::model::{
    Blueprint, BlueprintTemplate, Flow, FlowDraft, Setup, SetupDraft, SetupGroup, Template,
    Validate, new_id,
};
use serde::Serialize;
use tracing::{debug, info};

/// A setup together with the flows created for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instantiation {
    pub setup: Setup,
    pub flows: Vec<Flow>,
}

impl Instantiation {
    /// Every identifier generated for this instantiation.
    pub fn generated_ids(&self) -> Vec<&str> {
        std::iter::once(self.setup.id.as_str())
            .chain(self.setup.groups.iter().map(|g| g.group_id.as_str()))
            .chain(self.flows.iter().map(|f| f.id.as_str()))
            .collect()
    }
}

/// Instantiates blueprints against the templates of one catalog.
pub struct Instantiator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Instantiator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Looks the blueprint up by id, then instantiates it.
    pub fn instantiate_by_id(
        &self,
        blueprint_id: &str,
        script_id: &str,
    ) -> Result<Instantiation, InstantiateError> {
        let blueprint = self
            .catalog
            .blueprint(blueprint_id)
            .ok_or_else(|| ReferenceError::BlueprintNotFound(blueprint_id.to_string()))?;
        self.instantiate(blueprint, script_id)
    }

    pub fn instantiate(
        &self,
        blueprint: &Blueprint,
        script_id: &str,
    ) -> Result<Instantiation, InstantiateError> {
        blueprint
            .validate()
            .into_result()
            .map_err(InstantiateError::Invalid)?;
        self.catalog.resolve_blueprint(blueprint)?;

        // Resolve every template up front so nothing below can fail halfway.
        let mut plan = Vec::with_capacity(blueprint.groups.len());
        for group in blueprint.ordered_groups() {
            let mut entries: Vec<&BlueprintTemplate> = group.templates.iter().collect();
            entries.sort_by_key(|t| t.position);
            let resolved = entries
                .into_iter()
                .map(|entry| {
                    self.catalog
                        .template(&entry.template_id)
                        .map(|template| (entry, template))
                        .ok_or_else(|| ReferenceError::TemplateNotFound(entry.template_id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            plan.push((group, resolved));
        }

        let setup_id = new_id();
        let mut groups = Vec::with_capacity(plan.len());
        let mut flows = Vec::new();

        for (group, resolved) in plan {
            let setup_group_id = new_id();
            let mut flow_ids = Vec::with_capacity(resolved.len());
            for (entry, template) in resolved {
                let flow = instantiate_flow(template, entry, &setup_id, &setup_group_id);
                debug!(
                    flow_id = %flow.id,
                    template_id = %entry.template_id,
                    instance_id = %entry.instance_id,
                    "created flow"
                );
                flow_ids.push(flow.id.clone());
                flows.push(flow);
            }
            groups.push(SetupGroup::copied_from(
                setup_group_id,
                group.group_id.clone(),
                group.group_name.clone(),
                group.position,
                flow_ids,
            ));
        }

        let setup = Setup::create(SetupDraft {
            id: Some(setup_id),
            script_id: Some(script_id.to_string()),
            section_id: Some(blueprint.section_id.clone()),
            original_blueprint_id: Some(blueprint.id.clone()),
            groups: Some(groups),
            ..Default::default()
        });

        info!(
            setup_id = %setup.id,
            blueprint_id = %blueprint.id,
            groups = setup.groups.len(),
            flows = flows.len(),
            "instantiated blueprint"
        );
        Ok(Instantiation { setup, flows })
    }
}

/// Creates the flow for one template use. Shape and default data are cloned,
/// so the flow shares nothing mutable with the template.
pub fn instantiate_flow(
    template: &Template,
    entry: &BlueprintTemplate,
    setup_id: &str,
    group_id: &str,
) -> Flow {
    Flow::create(FlowDraft {
        setup_id: Some(setup_id.to_string()),
        group_id: Some(group_id.to_string()),
        template_id: Some(entry.template_id.clone()),
        template_name: Some(entry.template_name.clone()),
        instance_id: Some(entry.instance_id.clone()),
        template_version: Some(template.version),
        graph: Some(template.graph.clone()),
        blocks: Some(template.default_data.clone()),
        ..Default::default()
    })
}
