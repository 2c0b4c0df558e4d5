//! Core domain models for audit findings and run reports
//!
//! Architecture: Rich Domain Models - audits are entities with behavior, not just data
//! - Each auditor produces its own audit value carrying verdict and evidence
//! - AuditReport acts as an aggregate root over the three concerns
//! - Escalation of a failed concern into a fatal error is a caller decision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Severity of a reported concern
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Concern passed, reported for completeness
    Info,
    /// Concern failed but is advisory under the active escalation policy
    Warning,
    /// Concern failed and is fatal under the active escalation policy
    Error,
}

impl Severity {
    /// Whether this severity level should cause the run to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// The individually reportable concerns of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Concern {
    Override,
    NamespaceOnewords,
    NamespacePrefixonce,
    NamespaceAvguse,
    Definitions,
}

impl Concern {
    pub const ALL: [Concern; 5] = [
        Concern::Override,
        Concern::NamespaceOnewords,
        Concern::NamespacePrefixonce,
        Concern::NamespaceAvguse,
        Concern::Definitions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::NamespaceOnewords => "namespace-onewords",
            Self::NamespacePrefixonce => "namespace-prefixonce",
            Self::NamespaceAvguse => "namespace-avguse",
            Self::Definitions => "definitions",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s.trim().to_lowercase())
    }

    /// Whether this concern belongs to the namespace auditor
    pub fn is_namespace(self) -> bool {
        matches!(
            self,
            Self::NamespaceOnewords | Self::NamespacePrefixonce | Self::NamespaceAvguse
        )
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which failed concerns are fatal to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationPolicy {
    /// Escalate a failed override audit
    pub overrides: bool,
    /// Escalate an overall namespace failure ("confusing variables")
    pub namespace: bool,
    /// Escalate undefined variables beyond the error budget
    pub definitions: bool,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            overrides: false,
            namespace: false,
            definitions: true,
        }
    }
}

/// Override audit over the full deduplicated name set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideAudit {
    /// Number of distinct names in the inventory
    pub total_names: usize,
    /// Names declared exactly once
    pub singly_declared: usize,
    /// Names declared more than once, with their counts
    pub duplicates: BTreeMap<String, usize>,
    /// Names declared more than twice, with their counts
    pub multicates: BTreeMap<String, usize>,
    /// Dual absolute/relative duplicate threshold exceeded
    pub too_many_duplicates: bool,
    pub passed: bool,
}

impl OverrideAudit {
    pub fn has_multicates(&self) -> bool {
        !self.multicates.is_empty()
    }

    /// Labelled counts behind the outcome, one entry per failing rule
    ///
    /// A passing audit yields the duplicates alone.
    pub fn evidence_maps(&self) -> Vec<(&'static str, &BTreeMap<String, usize>)> {
        let mut maps = Vec::new();
        if self.too_many_duplicates || !self.has_multicates() {
            maps.push(("overridden", &self.duplicates));
        }
        if self.has_multicates() {
            maps.push(("declared in three or more layers", &self.multicates));
        }
        maps
    }
}

/// Outcome of one namespace signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalCheck {
    /// Observed value (count, or average for the average-use signal)
    pub observed: f64,
    /// Configured threshold
    pub threshold: usize,
    pub failed: bool,
}

/// Namespace audit over the full deduplicated name set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceAudit {
    pub total_names: usize,
    /// Names without a prefix token
    pub one_words: Vec<String>,
    pub one_words_check: SignalCheck,
    /// Number of names sharing each prefix token
    pub prefixes: BTreeMap<String, usize>,
    /// Prefix tokens used by exactly one name
    pub used_once: Vec<String>,
    pub prefix_once_check: SignalCheck,
    /// Mean number of names per prefix token
    pub average_use: f64,
    pub average_use_check: SignalCheck,
    /// Overall failure, raised when at least two signals fail
    pub confusing: bool,
}

impl NamespaceAudit {
    /// Number of failed signals (0..=3)
    pub fn failing_signals(&self) -> usize {
        [
            self.one_words_check.failed,
            self.prefix_once_check.failed,
            self.average_use_check.failed,
        ]
        .iter()
        .filter(|failed| **failed)
        .count()
    }

    pub fn passed(&self) -> bool {
        !self.confusing
    }
}

/// Definition audit over the selected variable set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionAudit {
    /// Number of variables resolved
    pub checked: usize,
    /// Undefined variables with the evaluator's cause
    pub undefined: BTreeMap<String, String>,
    /// Undefined variables tolerated by the exemption filter
    pub exempted: Vec<String>,
    /// Undefined, non-exempted variables (sorted)
    pub residual: Vec<String>,
    /// Exemption regex, when one was active
    pub error_filter: Option<String>,
    /// Number of residual undefined variables tolerated
    pub error_assume: usize,
    pub passed: bool,
}

impl DefinitionAudit {
    /// Success line, e.g. ``all variables (3) are defined - or filtered by this regex: `^vault_` ``
    pub fn success_summary(&self) -> String {
        let mut line = format!("all variables ({}) are defined", self.checked);
        if let Some(filter) = &self.error_filter {
            line.push_str(&format!(" - or filtered by this regex: `{filter}`"));
        }
        line
    }
}

/// Machine-readable verdict for a single concern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub concern: Concern,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
    /// Names or `name=count` entries supporting the verdict
    pub evidence: Vec<String>,
}

/// Summary metadata for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Number of layer sources scanned
    pub total_sources: usize,
    /// Raw number of declarations found
    pub total_occurrences: usize,
    /// Distinct names in the inventory
    pub distinct_names: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    pub audited_at: DateTime<Utc>,
}

/// Complete audit report for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub run_id: Uuid,
    /// Variables selected for definition checking (sorted)
    pub variables: Vec<String>,
    pub override_audit: OverrideAudit,
    pub namespace_audit: NamespaceAudit,
    pub definition_audit: DefinitionAudit,
    pub summary: AuditSummary,
    pub config_fingerprint: Option<String>,
}

impl AuditReport {
    pub fn new(
        variables: Vec<String>,
        override_audit: OverrideAudit,
        namespace_audit: NamespaceAudit,
        definition_audit: DefinitionAudit,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            variables,
            override_audit,
            namespace_audit,
            definition_audit,
            summary: AuditSummary {
                audited_at: Utc::now(),
                ..Default::default()
            },
            config_fingerprint: None,
        }
    }

    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    /// Checked-count line printed when the definition audit passes
    pub fn definition_summary(&self) -> String {
        self.definition_audit.success_summary()
    }

    /// Whether a concern passed
    pub fn passed(&self, concern: Concern) -> bool {
        match concern {
            Concern::Override => self.override_audit.passed,
            Concern::NamespaceOnewords => !self.namespace_audit.one_words_check.failed,
            Concern::NamespacePrefixonce => !self.namespace_audit.prefix_once_check.failed,
            Concern::NamespaceAvguse => !self.namespace_audit.average_use_check.failed,
            Concern::Definitions => self.definition_audit.passed,
        }
    }

    /// Whether a failure of this concern is fatal under the policy
    ///
    /// A single namespace signal is never fatal on its own; only the
    /// two-of-three overall verdict escalates.
    pub fn is_fatal(&self, concern: Concern, policy: &EscalationPolicy) -> bool {
        if self.passed(concern) {
            return false;
        }
        match concern {
            Concern::Override => policy.overrides,
            Concern::Definitions => policy.definitions,
            _ => policy.namespace && self.namespace_audit.confusing,
        }
    }

    /// One result per concern, in a stable order
    pub fn results(&self, policy: &EscalationPolicy) -> Vec<AuditResult> {
        Concern::ALL
            .into_iter()
            .map(|concern| {
                let passed = self.passed(concern);
                let severity = if passed {
                    Severity::Info
                } else if self.is_fatal(concern, policy) {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                AuditResult {
                    concern,
                    passed,
                    severity,
                    message: self.message_for(concern),
                    evidence: self.evidence_for(concern),
                }
            })
            .collect()
    }

    /// Concerns that failed and are fatal under the policy
    pub fn fatal_failures(&self, policy: &EscalationPolicy) -> Vec<Concern> {
        Concern::ALL
            .into_iter()
            .filter(|c| self.is_fatal(*c, policy))
            .collect()
    }

    pub fn has_fatal_failures(&self, policy: &EscalationPolicy) -> bool {
        !self.fatal_failures(policy).is_empty()
    }

    /// Convert fatal failures into an error, definitions first
    pub fn into_outcome(self, policy: &EscalationPolicy) -> GuardianResult<Self> {
        let fatal = self.fatal_failures(policy);
        if fatal.contains(&Concern::Definitions) {
            return Err(GuardianError::UndefinedVariables {
                names: self.definition_audit.residual.clone(),
            });
        }
        if fatal.contains(&Concern::Override) {
            return Err(GuardianError::OverrideWarning {
                message: self.message_for(Concern::Override),
            });
        }
        if fatal.iter().any(|c| c.is_namespace()) {
            return Err(GuardianError::NamespaceWarning {
                message: format!(
                    "{} of 3 namespace checks failed",
                    self.namespace_audit.failing_signals()
                ),
            });
        }
        Ok(self)
    }

    fn message_for(&self, concern: Concern) -> String {
        let ns = &self.namespace_audit;
        match concern {
            Concern::Override => {
                let o = &self.override_audit;
                if o.passed {
                    format!(
                        "{} of {} variables declared in more than one layer",
                        o.duplicates.len(),
                        o.total_names
                    )
                } else if o.has_multicates() && o.too_many_duplicates {
                    format!(
                        "{} variables declared in three or more layers; too many overridden variables: {} of {}",
                        o.multicates.len(),
                        o.duplicates.len(),
                        o.total_names
                    )
                } else if o.has_multicates() {
                    format!(
                        "{} variables declared in three or more layers",
                        o.multicates.len()
                    )
                } else {
                    format!(
                        "too many overridden variables: {} of {}",
                        o.duplicates.len(),
                        o.total_names
                    )
                }
            }
            Concern::NamespaceOnewords => format!(
                "{} variables without namespace prefix (limit {})",
                ns.one_words.len(),
                ns.one_words_check.threshold
            ),
            Concern::NamespacePrefixonce => format!(
                "{} prefixes used only once (limit {})",
                ns.used_once.len(),
                ns.prefix_once_check.threshold
            ),
            Concern::NamespaceAvguse => format!(
                "prefixes used {:.2} times on average (minimum {})",
                ns.average_use, ns.average_use_check.threshold
            ),
            Concern::Definitions => {
                let d = &self.definition_audit;
                if d.passed {
                    d.success_summary()
                } else {
                    format!("{} undefined variables", d.residual.len())
                }
            }
        }
    }

    fn evidence_for(&self, concern: Concern) -> Vec<String> {
        let counted = |map: &BTreeMap<String, usize>| {
            map.iter().map(|(k, v)| format!("{k}={v}")).collect()
        };
        let ns = &self.namespace_audit;
        match concern {
            Concern::Override => match self.override_audit.evidence_maps().as_slice() {
                [(_, map)] => counted(*map),
                maps => maps
                    .iter()
                    .flat_map(|(label, map)| map.iter().map(move |(k, v)| format!("{label}: {k}={v}")))
                    .collect(),
            },
            Concern::NamespaceOnewords => ns.one_words.clone(),
            Concern::NamespacePrefixonce => ns.used_once.clone(),
            Concern::NamespaceAvguse => counted(&ns.prefixes),
            Concern::Definitions => self.definition_audit.residual.clone(),
        }
    }
}

/// Error types that can occur during an audit
#[derive(Debug, thiserror::Error)]
pub enum GuardianError {
    /// Configuration could not be loaded, parsed or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Variables resolved to undefined beyond the error budget
    #[error("Undefined variables: {}", names.join(", "))]
    UndefinedVariables { names: Vec<String> },

    /// Escalated override audit failure
    #[error("Override audit failed: {message}")]
    OverrideWarning { message: String },

    /// Escalated namespace audit failure
    #[error("Confusing variables: {message}")]
    NamespaceWarning { message: String },

    /// A resolver could not be set up or queried
    #[error("Resolution error for '{name}': {message}")]
    Resolution { name: String, message: String },
}

impl GuardianError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for Guardian operations
pub type GuardianResult<T> = Result<T, GuardianError>;
