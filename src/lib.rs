//! Inventory Guardian - Quality audits for layered configuration inventories
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure domain logic separated from file discovery and template rendering
//! - Clean boundaries between the auditors and the pluggable `Resolver`
//! - The façade runs collection, selection, auditing and formatting in one pass

pub mod analyzer;
pub mod collector;
pub mod config;
pub mod domain;
pub mod patterns;
pub mod report;
pub mod resolver;
pub mod selector;

// Re-export main types for convenient access
pub use domain::findings::{
    AuditReport, AuditResult, AuditSummary, Concern, DefinitionAudit, EscalationPolicy,
    GuardianError, GuardianResult, NamespaceAudit, OverrideAudit, Severity,
};
pub use domain::occurrences::{LayerId, Occurrence, OccurrenceSet, VariableSet};

pub use config::{
    AuditSettings, ConfigBuilder, GuardianConfig, InventoryTarget, LayerConfig, ListInput,
};

pub use analyzer::{Analyzer, NamespaceThresholds, NAMESPACE_REMARK};

pub use collector::{
    expand_layers, instantiate_layers, layers_from_paths, LayerSource, OccurrenceCollector,
};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use resolver::{LayeredResolver, ResolutionOutcome, Resolver};

pub use selector::VariableSelector;

use serde_yaml::Value as YamlValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main auditor providing the high-level inventory operations
pub struct InventoryGuardian {
    config: GuardianConfig,
    collector: OccurrenceCollector,
    selector: VariableSelector,
    analyzer: Analyzer,
    resolver: Option<Box<dyn Resolver>>,
    facts: Option<HashMap<String, YamlValue>>,
    report_formatter: ReportFormatter,
}

impl InventoryGuardian {
    /// Create a new guardian; configuration errors abort here, before any audit
    pub fn new(config: GuardianConfig) -> GuardianResult<Self> {
        config.validate()?;

        let collector = OccurrenceCollector::new(config.declaration()?);
        let selector = VariableSelector::from_settings(&config.audit)?;
        let analyzer = Analyzer::new(&config)?;
        let report_formatter = ReportFormatter::new(ReportOptions {
            escalation: config.escalation,
            ..Default::default()
        });

        Ok(Self {
            config,
            collector,
            selector,
            analyzer,
            resolver: None,
            facts: None,
            report_formatter,
        })
    }

    /// Create a guardian loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> GuardianResult<Self> {
        let config = GuardianConfig::load_from_file(path)?;
        Self::new(config)
    }

    /// Replace the layered resolver with a custom one
    pub fn with_resolver(mut self, resolver: Box<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Host facts handed to the default resolver
    pub fn with_facts(mut self, facts: HashMap<String, YamlValue>) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    pub fn config(&self) -> &GuardianConfig {
        &self.config
    }

    /// Expand the configured layers for the target host relative to `base_dir`
    pub fn sources(&self, base_dir: &Path) -> GuardianResult<Vec<LayerSource>> {
        expand_layers(&self.config.layers, &self.config.target, base_dir)
    }

    /// Scan sources and select the variables to check
    pub fn inventory(&self, sources: &[LayerSource]) -> (OccurrenceSet, VariableSet) {
        let occurrences = self.collector.collect(sources);
        let variables = self.selector.select(&occurrences);
        (occurrences, variables)
    }

    /// Run every auditor over the given sources
    pub fn audit_sources(&self, sources: &[LayerSource]) -> AuditReport {
        let (occurrences, variables) = self.inventory(sources);

        let layered;
        let resolver: &dyn Resolver = match &self.resolver {
            Some(resolver) => resolver.as_ref(),
            None => {
                let mut default = LayeredResolver::from_sources(sources);
                if let Some(facts) = &self.facts {
                    default = default.with_facts(facts.clone());
                }
                layered = default;
                &layered
            }
        };

        let mut report = self.analyzer.run(&occurrences, &variables, resolver);
        report.summary.total_sources = sources.iter().filter(|s| s.path.is_file()).count();

        tracing::info!(
            "Audited {} variables from {} sources",
            report.variables.len(),
            report.summary.total_sources
        );
        report
    }

    /// Expand the configured layers under `base_dir` and audit them
    pub fn audit_layers<P: AsRef<Path>>(&self, base_dir: P) -> GuardianResult<AuditReport> {
        let sources = self.sources(base_dir.as_ref())?;
        Ok(self.audit_sources(&sources))
    }

    /// Format an audit report for output
    pub fn format_report(&self, report: &AuditReport, format: OutputFormat) -> GuardianResult<String> {
        self.report_formatter.format_report(report, format)
    }

    /// Turn fatal failures under the configured policy into an error
    pub fn into_outcome(&self, report: AuditReport) -> GuardianResult<AuditReport> {
        report.into_outcome(&self.config.escalation)
    }
}

/// Audit a directory on a blocking worker, for async callers
pub async fn audit_directory<P: AsRef<Path>>(
    config: GuardianConfig,
    base_dir: P,
) -> GuardianResult<AuditReport> {
    let base_dir: PathBuf = base_dir.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || InventoryGuardian::new(config)?.audit_layers(&base_dir))
        .await
        .map_err(|e| GuardianError::config(format!("Audit task failed: {e}")))?
}

/// Gate check for CI workflows
///
/// Uses the configuration discovered in `base_dir` (or the defaults) and
/// returns an error when a concern fails that the escalation policy treats
/// as fatal.
pub fn check_directory<P: AsRef<Path>>(base_dir: P) -> GuardianResult<AuditReport> {
    let config = GuardianConfig::load_or_default(base_dir.as_ref())?;
    let guardian = InventoryGuardian::new(config)?;
    let report = guardian.audit_layers(base_dir)?;
    guardian.into_outcome(report)
}
