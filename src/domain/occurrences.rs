//! Occurrence multiset built from the layered inventory scan
//!
//! Architecture: Value Objects - occurrences are immutable facts read from layer sources
//! - LayerId carries the precedence position of a layer without deciding which layer wins
//! - OccurrenceSet is built once per run and only read afterwards
//! - Counts per name are load-bearing; scan order is not

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One configuration layer in precedence order (lowest precedence first)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId {
    /// Position in the precedence order
    pub precedence: usize,
    /// Human-readable layer name, e.g. `all`, `group:web`, `host:db01`
    pub name: String,
}

impl LayerId {
    pub fn new(precedence: usize, name: impl Into<String>) -> Self {
        Self {
            precedence,
            name: name.into(),
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.precedence)
    }
}

/// A single textual declaration of a variable in a layer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub name: String,
    pub layer: LayerId,
}

impl Occurrence {
    pub fn new(name: impl Into<String>, layer: LayerId) -> Self {
        Self {
            name: name.into(),
            layer,
        }
    }
}

/// Sorted multiset of occurrences with per-name counts
///
/// A name declared twice in the same layer counts twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceSet {
    occurrences: Vec<Occurrence>,
    counts: BTreeMap<String, usize>,
}

impl OccurrenceSet {
    /// Build a set from raw occurrences in any order
    pub fn from_occurrences(mut occurrences: Vec<Occurrence>) -> Self {
        occurrences.sort();

        let mut counts = BTreeMap::new();
        for occurrence in &occurrences {
            *counts.entry(occurrence.name.clone()).or_insert(0) += 1;
        }

        Self {
            occurrences,
            counts,
        }
    }

    /// Convenience constructor placing every name in a single layer
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let layer = LayerId::new(0, "inline");
        Self::from_occurrences(
            names
                .into_iter()
                .map(|name| Occurrence::new(name, layer.clone()))
                .collect(),
        )
    }

    /// Raw occurrence count for a name (0 when never declared)
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Occurrence count per distinct name
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// Deduplicated, sorted names
    pub fn names(&self) -> BTreeSet<String> {
        self.counts.keys().cloned().collect()
    }

    /// Number of distinct names
    pub fn distinct_names(&self) -> usize {
        self.counts.len()
    }

    /// Layers declaring a name, one entry per occurrence
    pub fn layers_of(&self, name: &str) -> Vec<&LayerId> {
        self.occurrences
            .iter()
            .filter(|o| o.name == name)
            .map(|o| &o.layer)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter()
    }

    /// Total number of raw occurrences
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Deduplicated, sorted set of names selected for definition checking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSet {
    names: Vec<String>,
}

impl VariableSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_keep_duplicates() {
        let set = OccurrenceSet::from_names(["a", "a", "b"]);

        assert_eq!(set.count("a"), 2);
        assert_eq!(set.count("b"), 1);
        assert_eq!(set.count("missing"), 0);
        assert_eq!(set.len(), 3);
        assert_eq!(set.distinct_names(), 2);
    }

    #[test]
    fn test_occurrences_are_sorted() {
        let low = LayerId::new(0, "all");
        let high = LayerId::new(1, "host");
        let set = OccurrenceSet::from_occurrences(vec![
            Occurrence::new("web_port", high.clone()),
            Occurrence::new("db_host", low.clone()),
            Occurrence::new("web_port", low.clone()),
        ]);

        let names: Vec<_> = set.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["db_host", "web_port", "web_port"]);
        assert_eq!(set.layers_of("web_port"), vec![&low, &high]);
    }

    #[test]
    fn test_variable_set_dedups_and_sorts() {
        let vars = VariableSet::new(["foo", "bar", "foo"]);

        assert_eq!(vars.names(), &["bar".to_string(), "foo".to_string()]);
        assert!(vars.contains("foo"));
        assert!(!vars.contains("baz"));
    }
}
