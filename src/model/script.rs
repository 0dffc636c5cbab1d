use super::ids::{Timestamp, new_id, now};
use super::validation::{Checker, Validate, Validation};
use crate::error::LedgerError;
use crate::ledger::{self, Positioned};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSection {
    pub section_id: String,
    pub section_name: String,
    pub position: usize,
}

impl Positioned for ScriptSection {
    fn position(&self) -> usize {
        self.position
    }
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// A collaborator-owned, ordered list of section references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub id: String,
    pub name: String,
    pub created_by: String,
    #[serde(default)]
    pub sections: Vec<ScriptSection>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub created_by: Option<String>,
    pub sections: Option<Vec<ScriptSection>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Script {
    pub fn create(draft: ScriptDraft) -> Self {
        let stamp = now();
        Self {
            id: draft.id.unwrap_or_else(new_id),
            name: draft.name.unwrap_or_default(),
            created_by: draft.created_by.unwrap_or_default(),
            sections: draft.sections.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or(stamp),
            updated_at: draft.updated_at.unwrap_or(stamp),
        }
    }

    /// Inserts a section reference. A section already in the script is left where it is.
    #[must_use]
    pub fn add_section(
        &self,
        section_id: impl Into<String>,
        section_name: impl Into<String>,
        position: usize,
    ) -> Self {
        let section_id = section_id.into();
        if self.sections.iter().any(|s| s.section_id == section_id) {
            return self.clone();
        }
        let entry = ScriptSection {
            section_id,
            section_name: section_name.into(),
            position,
        };
        self.with_sections(ledger::insert_at(self.sections.clone(), entry, position))
    }

    #[must_use]
    pub fn remove_section(&self, section_id: &str) -> Self {
        self.with_sections(ledger::remove_and_compact(self.sections.clone(), |s| {
            s.section_id == section_id
        }))
    }

    pub fn reorder_sections(&self, from: usize, to: usize) -> Result<Self, LedgerError> {
        let sections = ledger::reorder(self.sections.clone(), from, to)?;
        Ok(self.with_sections(sections))
    }

    fn with_sections(&self, sections: Vec<ScriptSection>) -> Self {
        Self {
            sections,
            updated_at: now(),
            ..self.clone()
        }
    }
}

impl Validate for Script {
    fn validate(&self) -> Validation {
        Checker::new()
            .non_empty("script id", &self.id)
            .non_empty("script name", &self.name)
            .non_empty("script owner", &self.created_by)
            .dense("script sections", &self.sections)
            .unique(
                "script sections",
                self.sections.iter().map(|s| s.section_id.as_str()),
            )
            .finish()
    }
}
