//! In-memory stores for both sides of the hierarchy.
//!
//! [`Catalog`] holds what administrators author and [`Workspace`] holds what
//! collaborators instantiate from it. Role checks happen before these are
//! called (see [`crate::access`]).

mod workspace;

pub use workspace::Workspace;

use crate::error::ReferenceError;
use crate::model::{Blueprint, Group, Section, Template};
use ahash::AHashMap;
use tracing::debug;

/// Administrator-owned templates, groups, sections and blueprints.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: AHashMap<String, Template>,
    groups: AHashMap<String, Group>,
    sections: AHashMap<String, Section>,
    blueprints: AHashMap<String, Blueprint>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn blueprint(&self, id: &str) -> Option<&Blueprint> {
        self.blueprints.get(id)
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn blueprints(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.values()
    }

    /// Stores a template. When it replaces a stored template with a different
    /// structure but no higher version, the version is bumped past the stored one.
    pub fn put_template(&mut self, mut template: Template) {
        if let Some(existing) = self.templates.get(&template.id) {
            if existing.graph != template.graph && template.version <= existing.version {
                template.version = existing.version + 1;
            }
        }
        debug!(template_id = %template.id, version = template.version, "storing template");
        self.templates.insert(template.id.clone(), template);
    }

    pub fn put_group(&mut self, group: Group) {
        self.groups.insert(group.id.clone(), group);
    }

    pub fn put_section(&mut self, section: Section) {
        self.sections.insert(section.id.clone(), section);
    }

    pub fn put_blueprint(&mut self, blueprint: Blueprint) {
        self.blueprints.insert(blueprint.id.clone(), blueprint);
    }

    /// Removes a template that no group or blueprint references any more.
    pub fn remove_template(&mut self, id: &str) -> Result<Template, ReferenceError> {
        if let Some(group) = self.groups.values().find(|g| g.references(id)) {
            return Err(ReferenceError::TemplateInUse {
                template_id: id.to_string(),
                referrer_id: group.id.clone(),
            });
        }
        if let Some(blueprint) = self.blueprints.values().find(|b| b.references_template(id)) {
            return Err(ReferenceError::TemplateInUse {
                template_id: id.to_string(),
                referrer_id: blueprint.id.clone(),
            });
        }
        self.templates
            .remove(id)
            .ok_or_else(|| ReferenceError::TemplateNotFound(id.to_string()))
    }

    /// Removes a group that no section or blueprint references any more.
    pub fn remove_group(&mut self, id: &str) -> Result<Group, ReferenceError> {
        if let Some(section) = self
            .sections
            .values()
            .find(|s| s.group_ids.iter().any(|g| g == id))
        {
            return Err(ReferenceError::GroupInUse {
                group_id: id.to_string(),
                referrer_id: section.id.clone(),
            });
        }
        if let Some(blueprint) = self.blueprints.values().find(|b| b.references_group(id)) {
            return Err(ReferenceError::GroupInUse {
                group_id: id.to_string(),
                referrer_id: blueprint.id.clone(),
            });
        }
        self.groups
            .remove(id)
            .ok_or_else(|| ReferenceError::GroupNotFound(id.to_string()))
    }

    /// Removes a section. Fails while any blueprint is scoped to it.
    pub fn remove_section(&mut self, id: &str) -> Result<Section, ReferenceError> {
        if let Some(blueprint) = self.blueprints.values().find(|b| b.section_id == id) {
            return Err(ReferenceError::SectionInUse {
                section_id: id.to_string(),
                blueprint_id: blueprint.id.clone(),
            });
        }
        self.sections
            .remove(id)
            .ok_or_else(|| ReferenceError::SectionNotFound(id.to_string()))
    }

    pub fn remove_blueprint(&mut self, id: &str) -> Result<Blueprint, ReferenceError> {
        self.blueprints
            .remove(id)
            .ok_or_else(|| ReferenceError::BlueprintNotFound(id.to_string()))
    }

    pub fn blueprints_for_section<'a>(
        &'a self,
        section_id: &'a str,
    ) -> impl Iterator<Item = &'a Blueprint> + 'a {
        self.blueprints
            .values()
            .filter(move |b| b.section_id == section_id)
    }

    /// Checks that the blueprint's section, groups and templates all exist.
    pub fn resolve_blueprint(&self, blueprint: &Blueprint) -> Result<(), ReferenceError> {
        if !self.sections.contains_key(&blueprint.section_id) {
            return Err(ReferenceError::SectionNotFound(
                blueprint.section_id.clone(),
            ));
        }
        for group in &blueprint.groups {
            if !self.groups.contains_key(&group.group_id) {
                return Err(ReferenceError::GroupNotFound(group.group_id.clone()));
            }
            if let Some(missing) = group
                .templates
                .iter()
                .find(|t| !self.templates.contains_key(&t.template_id))
            {
                return Err(ReferenceError::TemplateNotFound(missing.template_id.clone()));
            }
        }
        Ok(())
    }
}
