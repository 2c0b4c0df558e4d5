//! Variable selection for definition checking
//!
//! CDD Principle: Domain Services - the selector derives the run's working set once
//! - An explicit list wins over a regex filter when both are given
//! - Without either, every declared name is selected
//! - Selection filters names only and never touches occurrence counts

use crate::config::{AuditSettings, ListInput};
use crate::domain::findings::{GuardianError, GuardianResult};
use crate::domain::occurrences::{OccurrenceSet, VariableSet};
use crate::patterns::is_identifier;
use regex::Regex;
use std::collections::BTreeSet;

/// How the working set was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    All,
    Pattern,
    List,
}

/// Chooses which declared names get resolved
#[derive(Debug, Clone, Default)]
pub struct VariableSelector {
    from_list: Vec<String>,
    from_pattern: Option<Regex>,
}

impl VariableSelector {
    pub fn new(from_list: Vec<String>, from_pattern: Option<Regex>) -> Self {
        Self {
            from_list,
            from_pattern,
        }
    }

    /// Build from settings; an invalid regex or list token is a configuration error
    pub fn from_settings(settings: &AuditSettings) -> GuardianResult<Self> {
        Ok(Self::new(
            parse_list(&settings.from_list)?,
            settings.from_pattern_regex()?,
        ))
    }

    pub fn mode(&self) -> SelectionMode {
        if !self.from_list.is_empty() {
            SelectionMode::List
        } else if self.from_pattern.is_some() {
            SelectionMode::Pattern
        } else {
            SelectionMode::All
        }
    }

    /// Derive the sorted, deduplicated working set
    pub fn select(&self, occurrences: &OccurrenceSet) -> VariableSet {
        let selected = match self.mode() {
            SelectionMode::List => {
                for name in &self.from_list {
                    if occurrences.count(name) == 0 {
                        tracing::warn!("Listed variable '{}' is not declared in any layer", name);
                    }
                }
                VariableSet::new(self.from_list.iter().cloned())
            }
            SelectionMode::Pattern => {
                let regex = self.from_pattern.as_ref();
                VariableSet::new(
                    occurrences
                        .names()
                        .into_iter()
                        .filter(|name| regex.is_some_and(|r| r.is_match(name))),
                )
            }
            SelectionMode::All => VariableSet::new(occurrences.names()),
        };

        tracing::info!("Selected {} variables ({:?})", selected.len(), self.mode());
        selected
    }
}

/// Parse an explicit list; free text splits on commas and whitespace
///
/// Empty tokens are dropped and the result is sorted and deduplicated.
pub fn parse_list(input: &ListInput) -> GuardianResult<Vec<String>> {
    let tokens: Vec<&str> = match input {
        ListInput::List(items) => items.iter().map(|i| i.trim()).collect(),
        ListInput::Text(text) => text.split(|c: char| c == ',' || c.is_whitespace()).collect(),
    };

    let mut names = BTreeSet::new();
    for token in tokens.into_iter().filter(|t| !t.is_empty()) {
        if !is_identifier(token) {
            return Err(GuardianError::config(format!(
                "Invalid variable name '{token}' in from_list"
            )));
        }
        names.insert(token.to_string());
    }

    Ok(names.into_iter().collect())
}
