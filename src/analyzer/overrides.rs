//! Override auditing: how often each variable is redeclared across layers
//!
//! A variable declared twice is the normal override pattern (base value plus
//! one override). Many such variables, or any variable declared three or more
//! times, points to an inventory that lacks factorization.

use crate::domain::findings::OverrideAudit;
use crate::domain::occurrences::OccurrenceSet;
use std::collections::BTreeMap;

/// Absolute and percentage limit on duplicated names
pub const DUPLICATE_LIMIT: usize = 10;

/// Classify every declared name by its raw occurrence count
pub fn audit_overrides(occurrences: &OccurrenceSet) -> OverrideAudit {
    let total_names = occurrences.distinct_names();

    let mut singly_declared = 0;
    let mut duplicates = BTreeMap::new();
    let mut multicates = BTreeMap::new();

    for (name, &count) in occurrences.counts() {
        if count > 1 {
            duplicates.insert(name.clone(), count);
        } else {
            singly_declared += 1;
        }
        if count > 2 {
            multicates.insert(name.clone(), count);
        }
    }

    let too_many_duplicates = exceeds_dual_threshold(duplicates.len(), total_names, DUPLICATE_LIMIT);
    let passed = !too_many_duplicates && multicates.is_empty();

    if !passed {
        tracing::warn!(
            "Override audit failed: {} duplicated, {} declared three or more times",
            duplicates.len(),
            multicates.len()
        );
    }

    OverrideAudit {
        total_names,
        singly_declared,
        duplicates,
        multicates,
        too_many_duplicates,
        passed,
    }
}

/// `count > limit` and `count * 100 / total > limit`, in integer arithmetic
pub(crate) fn exceeds_dual_threshold(count: usize, total: usize, limit: usize) -> bool {
    if total == 0 {
        return false;
    }
    count > limit && count * 100 / total > limit
}
