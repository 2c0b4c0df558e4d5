//! Definition auditing: resolve every selected variable and budget the failures
//!
//! Resolution calls are independent and run on a bounded rayon pool; the
//! report is sorted by name regardless of completion order.

use crate::config::AuditSettings;
use crate::domain::findings::{DefinitionAudit, GuardianError, GuardianResult};
use crate::domain::occurrences::VariableSet;
use crate::resolver::{ResolutionOutcome, Resolver};
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;

/// Resolves the selected variables and applies exemption and budget
pub struct DefinitionAuditor {
    error_filter: Option<Regex>,
    error_assume: usize,
    pool: Option<rayon::ThreadPool>,
}

impl DefinitionAuditor {
    pub fn new(error_filter: Option<Regex>, error_assume: usize) -> Self {
        Self {
            error_filter,
            error_assume,
            pool: None,
        }
    }

    pub fn from_settings(settings: &AuditSettings) -> GuardianResult<Self> {
        let mut auditor = Self::new(settings.error_filter_regex()?, settings.error_assume);
        if let Some(threads) = settings.resolver_threads {
            auditor = auditor.with_threads(threads)?;
        }
        Ok(auditor)
    }

    /// Bound resolution to a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> GuardianResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("resolver-{i}"))
            .build()
            .map_err(|e| GuardianError::config(format!("Failed to build resolver pool: {e}")))?;
        self.pool = Some(pool);
        Ok(self)
    }

    pub fn audit(&self, variables: &VariableSet, resolver: &dyn Resolver) -> DefinitionAudit {
        let outcomes = match &self.pool {
            Some(pool) => pool.install(|| resolve_all(variables, resolver)),
            None => resolve_all(variables, resolver),
        };

        let mut undefined = BTreeMap::new();
        for (name, outcome) in outcomes {
            if let ResolutionOutcome::Undefined(cause) = outcome {
                tracing::debug!("'{}' is undefined: {}", name, cause);
                undefined.insert(name, cause);
            }
        }

        let (exempted, residual): (Vec<String>, Vec<String>) = undefined
            .keys()
            .cloned()
            .partition(|name| self.is_exempted(name));

        let passed = residual.len() <= self.error_assume;
        if passed {
            tracing::info!(
                "{} variables checked, {} undefined ({} exempted)",
                variables.len(),
                undefined.len(),
                exempted.len()
            );
        } else {
            tracing::warn!("{} undefined variables: {}", residual.len(), residual.join(", "));
        }

        DefinitionAudit {
            checked: variables.len(),
            undefined,
            exempted,
            residual,
            error_filter: self.error_filter.as_ref().map(|r| r.as_str().to_string()),
            error_assume: self.error_assume,
            passed,
        }
    }

    fn is_exempted(&self, name: &str) -> bool {
        self.error_filter.as_ref().is_some_and(|r| r.is_match(name))
    }
}

fn resolve_all(variables: &VariableSet, resolver: &dyn Resolver) -> Vec<(String, ResolutionOutcome)> {
    let mut outcomes: Vec<(String, ResolutionOutcome)> = variables
        .names()
        .par_iter()
        .map(|name| (name.clone(), resolver.resolve(name)))
        .collect();
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{FnResolver, MapResolver};

    fn resolver() -> MapResolver {
        MapResolver::new([("foo", "VARIABLE IS NOT DEFINED!"), ("bar", "baz")])
    }

    #[test]
    fn test_undefined_fails_without_budget() {
        let audit = DefinitionAuditor::new(None, 0).audit(&VariableSet::new(["foo", "bar"]), &resolver());

        assert!(!audit.passed);
        assert_eq!(audit.residual, vec!["foo"]);
        assert_eq!(audit.checked, 2);
    }

    #[test]
    fn test_exemption_filter() {
        let auditor = DefinitionAuditor::new(Some(Regex::new("^foo$").unwrap()), 0);
        let audit = auditor.audit(&VariableSet::new(["foo", "bar"]), &resolver());

        assert!(audit.passed);
        assert!(audit.residual.is_empty());
        assert_eq!(audit.exempted, vec!["foo"]);
        assert_eq!(
            audit.success_summary(),
            "all variables (2) are defined - or filtered by this regex: `^foo$`"
        );
    }

    #[test]
    fn test_error_budget_absorbs_failures() {
        let vars = VariableSet::new(["a", "b", "c"]);
        let resolver = MapResolver::new([("c", "ok")]);

        assert!(DefinitionAuditor::new(None, 2).audit(&vars, &resolver).passed);

        let audit = DefinitionAuditor::new(None, 1).audit(&vars, &resolver);
        assert!(!audit.passed);
        assert_eq!(audit.residual, vec!["a", "b"]);
    }

    #[test]
    fn test_bounded_pool_keeps_order() {
        let names: Vec<String> = (0..50).map(|i| format!("var_{i:02}")).collect();
        let resolver = FnResolver::new(|name: &str| {
            if name.ends_with('7') {
                "VARIABLE IS NOT DEFINED!".to_string()
            } else {
                "ok".to_string()
            }
        });

        let audit = DefinitionAuditor::new(None, 0)
            .with_threads(3)
            .unwrap()
            .audit(&VariableSet::new(names), &resolver);

        assert_eq!(audit.residual, vec!["var_07", "var_17", "var_27", "var_37", "var_47"]);
    }

    #[test]
    fn test_from_settings_rejects_bad_filter() {
        let settings = AuditSettings {
            error_filter: "[".to_string(),
            ..Default::default()
        };
        assert!(DefinitionAuditor::from_settings(&settings).is_err());
    }
}
