use crate::catalog::{Catalog, Workspace};
use crate::error::DocumentError;
use crate::instantiate::Instantiation;
use crate::model::{
    Blueprint, Flow, Group, Script, Section, Setup, Template, Validate, Validation,
};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

/// Every entity of both hierarchies, as stored by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceDocument {
    pub templates: Vec<Template>,
    pub groups: Vec<Group>,
    pub sections: Vec<Section>,
    pub blueprints: Vec<Blueprint>,
    pub scripts: Vec<Script>,
    pub setups: Vec<Setup>,
    pub flows: Vec<Flow>,
}

impl WorkspaceDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Collects both stores into a document, ordered by id for stable output.
    pub fn from_stores(catalog: &Catalog, workspace: &Workspace) -> Self {
        Self {
            templates: catalog.templates().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect(),
            groups: catalog.groups().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect(),
            sections: catalog.sections().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect(),
            blueprints: catalog.blueprints().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect(),
            scripts: workspace.scripts().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect(),
            setups: workspace.setups().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect(),
            flows: workspace.flows().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect(),
        }
    }

    /// Splits the document into the administrator catalog and the collaborator
    /// workspace, after validating it as a whole.
    pub fn into_stores(self) -> Result<(Catalog, Workspace), DocumentError> {
        self.validate()
            .into_result()
            .map_err(DocumentError::Invalid)?;

        let mut catalog = Catalog::new();
        for template in self.templates {
            catalog.put_template(template);
        }
        for group in self.groups {
            catalog.put_group(group);
        }
        for section in self.sections {
            catalog.put_section(section);
        }
        for blueprint in self.blueprints {
            catalog.put_blueprint(blueprint);
        }

        let mut flows_by_setup: AHashMap<String, Vec<Flow>> = AHashMap::new();
        for flow in self.flows {
            flows_by_setup.entry(flow.setup_id.clone()).or_default().push(flow);
        }

        let mut workspace = Workspace::new();
        for script in self.scripts {
            workspace.put_script(script);
        }
        for setup in self.setups {
            let flows = flows_by_setup.remove(&setup.id).unwrap_or_default();
            workspace.insert_instantiation(Instantiation { setup, flows });
        }

        info!(
            templates = catalog.templates().count(),
            setups = workspace.setups().count(),
            flows = workspace.flows().count(),
            "loaded workspace document"
        );
        Ok((catalog, workspace))
    }
}

impl Validate for WorkspaceDocument {
    fn validate(&self) -> Validation {
        let mut result = Validation::ok();
        for template in &self.templates {
            result = result.merge(&format!("template '{}'", template.id), template.validate());
        }
        for group in &self.groups {
            result = result.merge(&format!("group '{}'", group.id), group.validate());
        }
        for section in &self.sections {
            result = result.merge(&format!("section '{}'", section.id), section.validate());
        }
        for blueprint in &self.blueprints {
            result = result.merge(&format!("blueprint '{}'", blueprint.id), blueprint.validate());
        }
        for script in &self.scripts {
            result = result.merge(&format!("script '{}'", script.id), script.validate());
        }
        for setup in &self.setups {
            result = result.merge(&format!("setup '{}'", setup.id), setup.validate());
        }
        for flow in &self.flows {
            result = result.merge(&format!("flow '{}'", flow.id), flow.validate());
        }
        result.merge("references", self.check_references())
    }
}

impl WorkspaceDocument {
    fn check_references(&self) -> Validation {
        fn ids<'a, T>(items: &'a [T], id: impl Fn(&'a T) -> &'a str) -> AHashSet<&'a str> {
            items.iter().map(id).collect()
        }

        let templates = ids(&self.templates, |t| t.id.as_str());
        let groups = ids(&self.groups, |g| g.id.as_str());
        let sections = ids(&self.sections, |s| s.id.as_str());
        let scripts = ids(&self.scripts, |s| s.id.as_str());
        let setups = ids(&self.setups, |s| s.id.as_str());
        let flows = ids(&self.flows, |f| f.id.as_str());

        let mut errors = Vec::new();
        let collections: Vec<(&str, Vec<&str>)> = vec![
            ("templates", self.templates.iter().map(|t| t.id.as_str()).collect()),
            ("groups", self.groups.iter().map(|g| g.id.as_str()).collect()),
            ("sections", self.sections.iter().map(|s| s.id.as_str()).collect()),
            ("blueprints", self.blueprints.iter().map(|b| b.id.as_str()).collect()),
            ("scripts", self.scripts.iter().map(|s| s.id.as_str()).collect()),
            ("setups", self.setups.iter().map(|s| s.id.as_str()).collect()),
            ("flows", self.flows.iter().map(|f| f.id.as_str()).collect()),
        ];
        for (name, list) in collections {
            for duplicate in list.into_iter().duplicates() {
                errors.push(format!("{} contains duplicate id '{}'", name, duplicate));
            }
        }

        let mut refs = References { errors };
        for group in &self.groups {
            let owner = format!("group '{}'", group.id);
            for entry in &group.templates {
                refs.require(&owner, "template", &entry.template_id, &templates);
            }
        }
        for section in &self.sections {
            let owner = format!("section '{}'", section.id);
            for group_id in &section.group_ids {
                refs.require(&owner, "group", group_id, &groups);
            }
        }
        for blueprint in &self.blueprints {
            let owner = format!("blueprint '{}'", blueprint.id);
            refs.require(&owner, "section", &blueprint.section_id, &sections);
            for group in &blueprint.groups {
                refs.require(&owner, "group", &group.group_id, &groups);
                for entry in &group.templates {
                    refs.require(&owner, "template", &entry.template_id, &templates);
                }
            }
        }
        for script in &self.scripts {
            let owner = format!("script '{}'", script.id);
            for entry in &script.sections {
                refs.require(&owner, "section", &entry.section_id, &sections);
            }
        }
        for setup in &self.setups {
            let owner = format!("setup '{}'", setup.id);
            refs.require(&owner, "script", &setup.script_id, &scripts);
            for flow_id in setup.flow_ids() {
                refs.require(&owner, "flow", flow_id, &flows);
            }
        }
        for flow in &self.flows {
            refs.require(&format!("flow '{}'", flow.id), "setup", &flow.setup_id, &setups);
        }

        Validation::from_errors(refs.errors)
    }
}

struct References {
    errors: Vec<String>,
}

impl References {
    fn require(&mut self, owner: &str, kind: &str, id: &str, known: &AHashSet<&str>) {
        if !known.contains(id) {
            self.errors
                .push(format!("{} references missing {} '{}'", owner, kind, id));
        }
    }
}
