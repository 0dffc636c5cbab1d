use crate::ledger::{self, Positioned};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Outcome of a structural check. Never an error by itself: the caller decides
/// whether an invalid result blocks the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    /// Folds the errors of `other` into this result, prefixing each with `context`.
    pub fn merge(mut self, context: &str, other: Validation) -> Self {
        self.errors.extend(
            other
                .errors
                .into_iter()
                .map(|e| format!("{}: {}", context, e)),
        );
        self.valid = self.errors.is_empty();
        self
    }

    pub fn into_result(self) -> Result<(), Vec<String>> {
        if self.valid { Ok(()) } else { Err(self.errors) }
    }
}

/// Pure structural validation. Implementations perform no I/O and never panic.
pub trait Validate {
    fn validate(&self) -> Validation;
}

/// Accumulates messages while walking an entity.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: Vec<String>,
}

impl Checker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{} must not be empty", field));
        }
        self
    }

    pub(crate) fn dense<T: Positioned>(&mut self, field: &str, list: &[T]) -> &mut Self {
        if !ledger::is_dense(list) {
            let positions = list.iter().map(Positioned::position).join(", ");
            self.errors.push(format!(
                "{} positions must be a dense 0-based sequence, found [{}]",
                field, positions
            ));
        }
        self
    }

    pub(crate) fn unique<'a, I>(&mut self, field: &str, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for duplicate in ids.into_iter().duplicates() {
            self.errors
                .push(format!("{} contains duplicate id '{}'", field, duplicate));
        }
        self
    }

    pub(crate) fn push(&mut self, message: String) -> &mut Self {
        self.errors.push(message);
        self
    }

    pub(crate) fn finish(&mut self) -> Validation {
        Validation::from_errors(std::mem::take(&mut self.errors))
    }
}
