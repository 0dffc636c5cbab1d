use super::ids::{Timestamp, new_id, now};
use super::validation::{Checker, Validate, Validation};
use crate::error::LedgerError;
use crate::ledger::{self, Positioned};
use serde::{Deserialize, Serialize};

/// A positioned reference from a group to a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRef {
    pub template_id: String,
    pub position: usize,
}

impl Positioned for TemplateRef {
    fn position(&self) -> usize {
        self.position
    }
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// A named, ordered collection of template references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub templates: Vec<TemplateRef>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct GroupDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub templates: Option<Vec<TemplateRef>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Group {
    pub fn create(draft: GroupDraft) -> Self {
        let stamp = now();
        Self {
            id: draft.id.unwrap_or_else(new_id),
            name: draft.name.unwrap_or_default(),
            templates: draft.templates.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or(stamp),
            updated_at: draft.updated_at.unwrap_or(stamp),
        }
    }

    pub fn references(&self, template_id: &str) -> bool {
        self.templates.iter().any(|t| t.template_id == template_id)
    }

    #[must_use]
    pub fn add_template(&self, template_id: impl Into<String>, position: usize) -> Self {
        let entry = TemplateRef {
            template_id: template_id.into(),
            position,
        };
        self.with_templates(ledger::insert_at(self.templates.clone(), entry, position))
    }

    /// Removes every reference to `template_id`.
    #[must_use]
    pub fn remove_template(&self, template_id: &str) -> Self {
        self.with_templates(ledger::remove_and_compact(self.templates.clone(), |t| {
            t.template_id == template_id
        }))
    }

    #[must_use]
    pub fn remove_template_at(&self, position: usize) -> Self {
        self.with_templates(ledger::remove_and_compact(self.templates.clone(), |t| {
            t.position == position
        }))
    }

    pub fn reorder_templates(&self, from: usize, to: usize) -> Result<Self, LedgerError> {
        let templates = ledger::reorder(self.templates.clone(), from, to)?;
        Ok(self.with_templates(templates))
    }

    fn with_templates(&self, templates: Vec<TemplateRef>) -> Self {
        Self {
            templates,
            updated_at: now(),
            ..self.clone()
        }
    }
}

impl Validate for Group {
    fn validate(&self) -> Validation {
        let mut check = Checker::new();
        check
            .non_empty("group id", &self.id)
            .non_empty("group name", &self.name)
            .dense("group templates", &self.templates);
        for entry in &self.templates {
            check.non_empty("group template id", &entry.template_id);
        }
        check.finish()
    }
}
