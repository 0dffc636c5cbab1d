use super::ids::{Timestamp, new_id, now};
use super::validation::{Checker, Validate, Validation};
use serde::{Deserialize, Serialize};

/// A named classification of groups tied to one activity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub name: String,
    pub activity_type: String,
    #[serde(default)]
    pub group_ids: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct SectionDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub activity_type: Option<String>,
    pub group_ids: Option<Vec<String>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Section {
    pub fn create(draft: SectionDraft) -> Self {
        let stamp = now();
        Self {
            id: draft.id.unwrap_or_else(new_id),
            name: draft.name.unwrap_or_default(),
            activity_type: draft.activity_type.unwrap_or_default(),
            group_ids: draft.group_ids.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or(stamp),
            updated_at: draft.updated_at.unwrap_or(stamp),
        }
    }

    /// Adds a group reference. Adding a group that is already present changes nothing.
    #[must_use]
    pub fn add_group(&self, group_id: impl Into<String>) -> Self {
        let group_id = group_id.into();
        let mut next = self.clone();
        if !next.group_ids.contains(&group_id) {
            next.group_ids.push(group_id);
            next.updated_at = now();
        }
        next
    }

    #[must_use]
    pub fn remove_group(&self, group_id: &str) -> Self {
        let mut next = self.clone();
        next.group_ids.retain(|id| id != group_id);
        next.updated_at = now();
        next
    }
}

impl Validate for Section {
    fn validate(&self) -> Validation {
        Checker::new()
            .non_empty("section id", &self.id)
            .non_empty("section name", &self.name)
            .non_empty("section activity type", &self.activity_type)
            .unique("section groups", self.group_ids.iter().map(String::as_str))
            .finish()
    }
}
