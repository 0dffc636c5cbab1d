use super::ids::{Timestamp, new_id, now};
use super::validation::{Checker, Validate, Validation};
use crate::error::StructureError;
use crate::ledger::{self, Positioned};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// One use of a template inside a blueprint group.
///
/// The same template may appear more than once; every use has its own `instance_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintTemplate {
    pub template_id: String,
    pub template_name: String,
    pub position: usize,
    pub instance_id: String,
    #[serde(default)]
    pub is_duplicate: bool,
}

impl Positioned for BlueprintTemplate {
    fn position(&self) -> usize {
        self.position
    }
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintGroup {
    pub group_id: String,
    pub group_name: String,
    pub position: usize,
    #[serde(default)]
    pub templates: Vec<BlueprintTemplate>,
}

impl Positioned for BlueprintGroup {
    fn position(&self) -> usize {
        self.position
    }
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// The structural composition of groups and templates under exactly one section.
/// Blueprints are the source every setup is instantiated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub section_id: String,
    #[serde(default)]
    pub groups: Vec<BlueprintGroup>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct BlueprintDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub section_id: Option<String>,
    pub groups: Option<Vec<BlueprintGroup>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Blueprint {
    pub fn create(draft: BlueprintDraft) -> Self {
        let stamp = now();
        Self {
            id: draft.id.unwrap_or_else(new_id),
            name: draft.name.unwrap_or_default(),
            section_id: draft.section_id.unwrap_or_default(),
            groups: draft.groups.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or(stamp),
            updated_at: draft.updated_at.unwrap_or(stamp),
        }
    }

    pub fn group(&self, group_id: &str) -> Option<&BlueprintGroup> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    /// Groups in position order.
    pub fn ordered_groups(&self) -> Vec<&BlueprintGroup> {
        let mut groups: Vec<_> = self.groups.iter().collect();
        groups.sort_by_key(|g| g.position);
        groups
    }

    pub fn references_group(&self, group_id: &str) -> bool {
        self.group(group_id).is_some()
    }

    pub fn references_template(&self, template_id: &str) -> bool {
        self.groups
            .iter()
            .flat_map(|g| &g.templates)
            .any(|t| t.template_id == template_id)
    }

    /// Adds a group at `position`. A group that is already present is left where it is.
    #[must_use]
    pub fn add_group(
        &self,
        group_id: impl Into<String>,
        group_name: impl Into<String>,
        position: usize,
    ) -> Self {
        let group_id = group_id.into();
        if self.references_group(&group_id) {
            return self.clone();
        }
        let group = BlueprintGroup {
            group_id,
            group_name: group_name.into(),
            position,
            templates: Vec::new(),
        };
        self.with_groups(ledger::insert_at(self.groups.clone(), group, position))
    }

    #[must_use]
    pub fn remove_group(&self, group_id: &str) -> Self {
        self.with_groups(ledger::remove_and_compact(self.groups.clone(), |g| {
            g.group_id == group_id
        }))
    }

    pub fn reorder_groups(&self, from: usize, to: usize) -> Result<Self, StructureError> {
        let groups = ledger::reorder(self.groups.clone(), from, to)?;
        Ok(self.with_groups(groups))
    }

    /// Places a template in a group under a fresh instance id.
    pub fn add_template(
        &self,
        group_id: &str,
        template_id: impl Into<String>,
        template_name: impl Into<String>,
        position: usize,
    ) -> Result<Self, StructureError> {
        let entry = BlueprintTemplate {
            template_id: template_id.into(),
            template_name: template_name.into(),
            position,
            instance_id: new_id(),
            is_duplicate: false,
        };
        self.update_group(group_id, |templates| {
            Ok(ledger::insert_at(templates, entry, position))
        })
    }

    /// Removes the template use identified by `instance_id`, wherever it lives.
    #[must_use]
    pub fn remove_template(&self, instance_id: &str) -> Self {
        let mut next = self.clone();
        for group in &mut next.groups {
            let templates = std::mem::take(&mut group.templates);
            group.templates = mark_duplicates(ledger::remove_and_compact(templates, |t| {
                t.instance_id == instance_id
            }));
        }
        next.updated_at = now();
        next
    }

    pub fn reorder_templates(
        &self,
        group_id: &str,
        from: usize,
        to: usize,
    ) -> Result<Self, StructureError> {
        self.update_group(group_id, |templates| {
            Ok(ledger::reorder(templates, from, to)?)
        })
    }

    fn update_group<F>(&self, group_id: &str, edit: F) -> Result<Self, StructureError>
    where
        F: FnOnce(Vec<BlueprintTemplate>) -> Result<Vec<BlueprintTemplate>, StructureError>,
    {
        let mut next = self.clone();
        let group = next
            .groups
            .iter_mut()
            .find(|g| g.group_id == group_id)
            .ok_or_else(|| StructureError::MissingChild {
                parent_id: self.id.clone(),
                child_id: group_id.to_string(),
            })?;
        let templates = std::mem::take(&mut group.templates);
        group.templates = mark_duplicates(edit(templates)?);
        next.updated_at = now();
        Ok(next)
    }

    fn with_groups(&self, groups: Vec<BlueprintGroup>) -> Self {
        Self {
            groups,
            updated_at: now(),
            ..self.clone()
        }
    }
}

/// Flags every use of a template after its first (by position) within one group.
fn mark_duplicates(mut templates: Vec<BlueprintTemplate>) -> Vec<BlueprintTemplate> {
    templates.sort_by_key(|t| t.position);
    let mut seen = AHashSet::new();
    for entry in &mut templates {
        entry.is_duplicate = !seen.insert(entry.template_id.clone());
    }
    templates
}

impl Validate for Blueprint {
    fn validate(&self) -> Validation {
        let mut check = Checker::new();
        check
            .non_empty("blueprint id", &self.id)
            .non_empty("blueprint section id", &self.section_id)
            .dense("blueprint groups", &self.groups)
            .unique(
                "blueprint groups",
                self.groups.iter().map(|g| g.group_id.as_str()),
            )
            .unique(
                "blueprint template instances",
                self.groups
                    .iter()
                    .flat_map(|g| &g.templates)
                    .map(|t| t.instance_id.as_str()),
            );

        for group in &self.groups {
            check
                .non_empty("blueprint group id", &group.group_id)
                .dense(&format!("group '{}' templates", group.group_id), &group.templates);

            let expected = mark_duplicates(group.templates.clone());
            for entry in &expected {
                check
                    .non_empty("blueprint template id", &entry.template_id)
                    .non_empty("blueprint template instance id", &entry.instance_id);
            }
            let mismatched = expected.iter().filter(|e| {
                group
                    .templates
                    .iter()
                    .any(|t| t.instance_id == e.instance_id && t.is_duplicate != e.is_duplicate)
            });
            for entry in mismatched {
                check.push(format!(
                    "template instance '{}' in group '{}' has an inconsistent duplicate flag",
                    entry.instance_id, group.group_id
                ));
            }
        }
        check.finish()
    }
}
