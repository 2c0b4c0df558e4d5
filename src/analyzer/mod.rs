//! Main audit orchestrator for Inventory Guardian
//!
//! CDD Principle: Domain Services - Analyzer orchestrates the three independent auditors
//! - Override and namespace audits read the full occurrence set
//! - The definition audit reads only the selected variable set
//! - Auditors share no mutable state and run concurrently

pub mod definitions;
pub mod namespace;
pub mod overrides;

use crate::config::GuardianConfig;
use crate::domain::findings::{AuditReport, GuardianResult};
use crate::domain::occurrences::{OccurrenceSet, VariableSet};
use crate::resolver::Resolver;
use std::time::Instant;

pub use definitions::DefinitionAuditor;
pub use namespace::{audit_namespace, NamespaceThresholds, NAMESPACE_REMARK};
pub use overrides::audit_overrides;

/// Runs every auditor over one collected inventory
pub struct Analyzer {
    thresholds: NamespaceThresholds,
    definitions: DefinitionAuditor,
    fingerprint: String,
}

impl Analyzer {
    /// Create a new analyzer; invalid regexes surface here, before any audit
    pub fn new(config: &GuardianConfig) -> GuardianResult<Self> {
        Ok(Self {
            thresholds: config.audit.namespace_thresholds(),
            definitions: DefinitionAuditor::from_settings(&config.audit)?,
            fingerprint: config.fingerprint(),
        })
    }

    pub fn with_defaults() -> GuardianResult<Self> {
        Self::new(&GuardianConfig::default())
    }

    pub fn thresholds(&self) -> &NamespaceThresholds {
        &self.thresholds
    }

    /// Run the three auditors; a failing auditor never stops the others
    pub fn run(
        &self,
        occurrences: &OccurrenceSet,
        variables: &VariableSet,
        resolver: &dyn Resolver,
    ) -> AuditReport {
        let start_time = Instant::now();

        let ((override_audit, namespace_audit), definition_audit) = rayon::join(
            || {
                rayon::join(
                    || audit_overrides(occurrences),
                    || audit_namespace(occurrences, &self.thresholds),
                )
            },
            || self.definitions.audit(variables, resolver),
        );

        let mut report = AuditReport::new(
            variables.names().to_vec(),
            override_audit,
            namespace_audit,
            definition_audit,
        );
        report.summary.total_occurrences = occurrences.len();
        report.summary.distinct_names = occurrences.distinct_names();
        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report.set_config_fingerprint(self.fingerprint.clone());

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::findings::{Concern, EscalationPolicy};
    use crate::resolver::MapResolver;

    #[test]
    fn test_auditors_run_independently() {
        let occurrences = OccurrenceSet::from_names(["a", "a", "a", "foo", "bar"]);
        let variables = VariableSet::new(["foo", "bar"]);
        let resolver = MapResolver::new([("foo", "VARIABLE IS NOT DEFINED!"), ("bar", "baz")]);

        let report = Analyzer::with_defaults()
            .unwrap()
            .run(&occurrences, &variables, &resolver);

        assert!(!report.passed(Concern::Override));
        assert!(!report.passed(Concern::Definitions));
        assert_eq!(report.definition_audit.residual, vec!["foo"]);
        assert_eq!(report.override_audit.multicates.get("a"), Some(&3));
        assert_eq!(report.variables, vec!["bar", "foo"]);
        assert_eq!(report.summary.total_occurrences, 5);
        assert_eq!(
            report.fatal_failures(&EscalationPolicy::default()),
            vec![Concern::Definitions]
        );
    }

    #[test]
    fn test_override_audit_ignores_selection() {
        let occurrences = OccurrenceSet::from_names(["a", "a", "a", "b"]);
        let variables = VariableSet::new(["b"]);
        let resolver = MapResolver::new([("b", "1")]);

        let report = Analyzer::with_defaults()
            .unwrap()
            .run(&occurrences, &variables, &resolver);

        assert!(!report.override_audit.passed);
        assert!(report.definition_audit.passed);
        assert_eq!(report.namespace_audit.total_names, 2);
    }
}
