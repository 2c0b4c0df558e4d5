//! Namespace auditing over variable name prefixes
//!
//! Three noisy signals are computed over the whole inventory; the inventory
//! is only reported as confusing when at least two of them fail together.

use super::overrides::exceeds_dual_threshold;
use crate::domain::findings::{NamespaceAudit, SignalCheck};
use crate::domain::occurrences::OccurrenceSet;
use crate::patterns::prefix_token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Remark printed alongside namespace evidence
pub const NAMESPACE_REMARK: &str =
    "If at least two of these three namespace checks fail, consider simplifying variable names.";

/// Limits for the three namespace signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceThresholds {
    /// Minimum average number of names per prefix
    pub min_uses: usize,
    /// Maximum count and percentage of names without prefix
    pub max_none: usize,
    /// Maximum count and percentage of prefixes used once
    pub max_once: usize,
}

impl Default for NamespaceThresholds {
    fn default() -> Self {
        Self {
            min_uses: 4,
            max_none: 10,
            max_once: 10,
        }
    }
}

/// Audit prefix usage across every distinct declared name
pub fn audit_namespace(
    occurrences: &OccurrenceSet,
    thresholds: &NamespaceThresholds,
) -> NamespaceAudit {
    let total_names = occurrences.distinct_names();

    let mut one_words = Vec::new();
    let mut prefixes: BTreeMap<String, usize> = BTreeMap::new();
    for name in occurrences.counts().keys() {
        match prefix_token(name).token() {
            Some(token) => *prefixes.entry(token.to_string()).or_insert(0) += 1,
            None => one_words.push(name.clone()),
        }
    }

    let one_words_check = SignalCheck {
        observed: one_words.len() as f64,
        threshold: thresholds.max_none,
        failed: exceeds_dual_threshold(one_words.len(), total_names, thresholds.max_none),
    };

    let used_once: Vec<String> = prefixes
        .iter()
        .filter(|(_, count)| **count == 1)
        .map(|(token, _)| token.clone())
        .collect();
    let prefix_once_check = SignalCheck {
        observed: used_once.len() as f64,
        threshold: thresholds.max_once,
        failed: exceeds_dual_threshold(used_once.len(), total_names, thresholds.max_once),
    };

    let token_occurrences: usize = prefixes.values().sum();
    let average_use = if prefixes.is_empty() {
        0.0
    } else {
        token_occurrences as f64 / prefixes.len() as f64
    };
    let average_use_check = SignalCheck {
        observed: average_use,
        threshold: thresholds.min_uses,
        failed: average_use < thresholds.min_uses as f64,
    };

    let failing = [
        one_words_check.failed,
        prefix_once_check.failed,
        average_use_check.failed,
    ]
    .iter()
    .filter(|failed| **failed)
    .count();
    let confusing = failing >= 2;

    if confusing {
        tracing::warn!("Namespace audit failed: {} of 3 signals", failing);
    } else if failing == 1 {
        tracing::info!("One namespace signal failed; not escalated");
    }

    NamespaceAudit {
        total_names,
        one_words,
        one_words_check,
        prefixes,
        used_once,
        prefix_once_check,
        average_use,
        average_use_check,
        confusing,
    }
}
