//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - AuditReport (domain) is converted to various external representations
//! - Each formatter encapsulates the rules for its specific output format
//! - Severity per concern comes from the escalation policy, not from the auditors

use crate::analyzer::NAMESPACE_REMARK;
use crate::domain::findings::{
    AuditReport, AuditResult, Concern, EscalationPolicy, GuardianError, GuardianResult, Severity,
};
use std::io::Write;

/// Supported output formats for audit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors and evidence
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// JUnit XML format for CI/CD integration
    Junit,
    /// GitHub Actions format for workflow integration
    GitHub,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "junit" => Some(Self::Junit),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "junit", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to print evidence for passing concerns too
    pub show_passing_evidence: bool,
    /// Maximum number of evidence entries printed per concern
    pub max_evidence: Option<usize>,
    /// Policy deciding which failed concerns are errors
    pub escalation: EscalationPolicy,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_passing_evidence: false,
            max_evidence: None,
            escalation: EscalationPolicy::default(),
        }
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Pass,
    Warn,
    Fail,
    Dim,
    Bold,
}

/// Main report formatter that dispatches to specific formatters
pub struct ReportFormatter {
    options: ReportOptions,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

impl ReportFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Format an audit report in the specified format
    pub fn format_report(&self, report: &AuditReport, format: OutputFormat) -> GuardianResult<String> {
        let results = report.results(&self.options.escalation);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &results)),
            OutputFormat::Json => self.format_json(report, &results),
            OutputFormat::Junit => Ok(self.format_junit(report, &results)),
            OutputFormat::GitHub => Ok(self.format_github(&results)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &AuditReport,
        format: OutputFormat,
        mut writer: W,
    ) -> GuardianResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    fn format_human(&self, report: &AuditReport, results: &[AuditResult]) -> String {
        let mut output = String::new();

        for result in results {
            let status = if result.passed {
                self.paint("ok", Tone::Pass)
            } else if result.severity.is_blocking() {
                self.paint("FAILED", Tone::Fail)
            } else {
                self.paint("warning", Tone::Warn)
            };
            output.push_str(&format!(
                "{} {} - {}\n",
                status,
                self.paint(result.concern.as_str(), Tone::Bold),
                result.message
            ));

            if !result.passed || self.options.show_passing_evidence {
                output.push_str(&self.human_evidence(report, result.concern));
            }
        }

        if report.namespace_audit.failing_signals() > 0 {
            output.push_str(&format!("{}\n", self.paint(NAMESPACE_REMARK, Tone::Dim)));
        }

        output.push('\n');
        output.push_str(&self.format_summary(report, results));
        output
    }

    /// Evidence block for one concern in the human format
    fn human_evidence(&self, report: &AuditReport, concern: Concern) -> String {
        let mut lines: Vec<String> = Vec::new();
        let ns = &report.namespace_audit;

        match concern {
            Concern::Definitions => {
                // only the offending names, one per line
                if report.definition_audit.passed {
                    lines.push(report.definition_audit.success_summary());
                } else {
                    lines.extend(report.definition_audit.residual.iter().cloned());
                }
            }
            Concern::Override => {
                match report.override_audit.evidence_maps().as_slice() {
                    [(_, map)] => {
                        lines.extend(map.iter().map(|(name, count)| format!("{name}: {count}")))
                    }
                    maps => {
                        for (label, map) in maps {
                            lines.push(format!("{label}:"));
                            lines.extend(map.iter().map(|(name, count)| format!("  {name}: {count}")));
                        }
                    }
                }
            }
            Concern::NamespaceOnewords => lines.extend(ns.one_words.iter().cloned()),
            Concern::NamespacePrefixonce | Concern::NamespaceAvguse => {
                lines.extend(ns.prefixes.iter().map(|(token, count)| format!("{token}: {count}")));
            }
        }

        let total = lines.len();
        if let Some(max) = self.options.max_evidence {
            lines.truncate(max);
        }

        let mut block = String::new();
        for line in &lines {
            block.push_str(&format!("    {line}\n"));
        }
        if total > lines.len() {
            block.push_str(&format!(
                "    {}\n",
                self.paint(&format!("... ({total} total)"), Tone::Dim)
            ));
        }
        block
    }

    fn format_json(&self, report: &AuditReport, results: &[AuditResult]) -> GuardianResult<String> {
        let json_report = serde_json::json!({
            "run_id": report.run_id,
            "variables": report.variables,
            "override_audit": report.override_audit,
            "namespace_audit": report.namespace_audit,
            "definition_audit": report.definition_audit,
            "results": results,
            "fatal": report.fatal_failures(&self.options.escalation),
            "summary": report.summary,
            "config_fingerprint": report.config_fingerprint,
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| GuardianError::config(format!("JSON serialization failed: {e}")))
    }

    fn format_junit(&self, report: &AuditReport, results: &[AuditResult]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let failures = results.iter().filter(|r| !r.passed).count();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        xml.push_str(&format!(
            "<testsuite name=\"inventory-guardian\" tests=\"{}\" failures=\"{}\" errors=\"0\" time=\"{:.3}\">\n",
            results.len(),
            failures,
            execution_time
        ));

        for result in results {
            xml.push_str(&format!(
                "  <testcase classname=\"inventory-guardian\" name=\"{}\">\n",
                result.concern
            ));

            if !result.passed {
                xml.push_str(&format!(
                    "    <failure type=\"{}\" message=\"{}\">\n",
                    result.severity.as_str(),
                    escape_xml(&result.message)
                ));
                for entry in &result.evidence {
                    xml.push_str(&format!("      {}\n", escape_xml(entry)));
                }
                xml.push_str("    </failure>\n");
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    fn format_github(&self, results: &[AuditResult]) -> String {
        let mut output = String::new();

        for result in results {
            let level = match result.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info if result.concern == Concern::Definitions => "notice",
                Severity::Info => continue,
            };

            let mut message = result.message.clone();
            if !result.passed && !result.evidence.is_empty() {
                message.push_str(": ");
                message.push_str(&result.evidence.join(", "));
            }

            output.push_str(&format!(
                "::{} title={}::{}\n",
                level,
                result.concern,
                escape_workflow(&message)
            ));
        }

        output
    }

    fn format_summary(&self, report: &AuditReport, results: &[AuditResult]) -> String {
        let passed = results.iter().filter(|r| r.passed).count();
        let fatal = report.fatal_failures(&self.options.escalation);
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        let verdict = if fatal.is_empty() {
            self.paint(&format!("{passed} of {} concerns passed", results.len()), Tone::Pass)
        } else {
            let names: Vec<&str> = fatal.iter().map(|c| c.as_str()).collect();
            self.paint(
                &format!(
                    "{passed} of {} concerns passed, fatal: {}",
                    results.len(),
                    names.join(", ")
                ),
                Tone::Fail,
            )
        };

        format!(
            "{} {} ({} variables checked, {} declarations of {} names, {:.1}s)\n",
            self.paint("Summary:", Tone::Bold),
            verdict,
            report.definition_audit.checked,
            report.summary.total_occurrences,
            report.summary.distinct_names,
            execution_time
        )
    }

    #[cfg(feature = "colors")]
    fn paint(&self, text: &str, tone: Tone) -> String {
        use colored::Colorize;

        if !self.options.use_colors {
            return text.to_string();
        }
        match tone {
            Tone::Pass => text.green().to_string(),
            Tone::Warn => text.yellow().to_string(),
            Tone::Fail => text.red().bold().to_string(),
            Tone::Dim => text.dimmed().to_string(),
            Tone::Bold => text.bold().to_string(),
        }
    }

    #[cfg(not(feature = "colors"))]
    fn paint(&self, text: &str, _tone: Tone) -> String {
        text.to_string()
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape workflow command data
fn escape_workflow(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::domain::occurrences::{OccurrenceSet, VariableSet};
    use crate::resolver::MapResolver;
    use serde_json::Value as JsonValue;

    fn plain() -> ReportFormatter {
        ReportFormatter::new(ReportOptions {
            use_colors: false,
            ..Default::default()
        })
    }

    fn create_report(foo: &str) -> AuditReport {
        let occurrences = OccurrenceSet::from_names(["foo", "bar", "web_port", "web_port"]);
        let variables = VariableSet::new(["foo", "bar"]);
        let resolver = MapResolver::new([("foo", foo), ("bar", "baz")]);
        Analyzer::with_defaults()
            .unwrap()
            .run(&occurrences, &variables, &resolver)
    }

    #[test]
    fn test_human_success() {
        let output = plain()
            .format_report(&create_report("ok"), OutputFormat::Human)
            .unwrap();

        assert!(output.contains("ok definitions - all variables (2) are defined"));
        assert!(output.contains("Summary:"));
        assert!(!output.contains("fatal:"));
    }

    #[test]
    fn test_human_failure_lists_offending_names() {
        let output = plain()
            .format_report(&create_report("VARIABLE IS NOT DEFINED!"), OutputFormat::Human)
            .unwrap();

        assert!(output.contains("FAILED definitions - 1 undefined variables"));
        assert!(output.contains("    foo\n"));
        assert!(!output.contains("    bar\n"));
        assert!(output.contains("fatal: definitions"));
    }

    #[test]
    fn test_human_namespace_remark() {
        let output = plain()
            .format_report(&create_report("ok"), OutputFormat::Human)
            .unwrap();

        // three names, two prefixes or fewer: average use is below 4
        assert!(output.contains("warning namespace-avguse"));
        assert!(output.contains(NAMESPACE_REMARK));
        assert!(output.contains("    web_: 1"));
    }

    #[test]
    fn test_human_override_failure_shows_both_maps() {
        // eleven overridden names out of twelve, one of them declared three times
        let mut names = vec!["solo".to_string(), "v00".to_string()];
        for i in 0..11 {
            names.push(format!("v{i:02}"));
            names.push(format!("v{i:02}"));
        }
        let occurrences = OccurrenceSet::from_names(names);
        let report = Analyzer::with_defaults().unwrap().run(
            &occurrences,
            &VariableSet::new(["solo"]),
            &MapResolver::new([("solo", "1")]),
        );
        assert!(report.override_audit.too_many_duplicates);

        let output = plain().format_report(&report, OutputFormat::Human).unwrap();
        assert!(output.contains("    overridden:\n      v00: 3\n      v01: 2\n"));
        assert!(output.contains("    declared in three or more layers:\n      v00: 3\n"));
    }

    #[test]
    fn test_json_format() {
        let output = plain()
            .format_report(&create_report("VARIABLE IS NOT DEFINED!"), OutputFormat::Json)
            .unwrap();
        let json: JsonValue = serde_json::from_str(&output).unwrap();

        assert_eq!(json["variables"], serde_json::json!(["bar", "foo"]));
        assert_eq!(json["definition_audit"]["residual"], serde_json::json!(["foo"]));
        assert_eq!(json["results"].as_array().unwrap().len(), 5);
        assert_eq!(json["results"][0]["concern"], "override");
        assert_eq!(json["fatal"], serde_json::json!(["definitions"]));
    }

    #[test]
    fn test_junit_format() {
        let output = plain()
            .format_report(&create_report("VARIABLE IS NOT DEFINED!"), OutputFormat::Junit)
            .unwrap();

        assert!(output.contains("<?xml version=\"1.0\""));
        assert!(output.contains("tests=\"5\""));
        assert!(output.contains("<failure type=\"error\" message=\"1 undefined variables\">"));
    }

    #[test]
    fn test_github_format() {
        let output = plain()
            .format_report(&create_report("VARIABLE IS NOT DEFINED!"), OutputFormat::GitHub)
            .unwrap();

        assert!(output.contains("::error title=definitions::1 undefined variables: foo"));
        assert!(output.contains("::warning title=namespace-avguse::"));
        assert!(!output.contains("title=override"));
    }

    #[test]
    fn test_max_evidence() {
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            show_passing_evidence: true,
            max_evidence: Some(1),
            ..Default::default()
        });
        let output = formatter
            .format_report(&create_report("ok"), OutputFormat::Human)
            .unwrap();

        assert!(output.contains("... (2 total)"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("sarif"), None);
        assert_eq!(OutputFormat::all_formats().len(), 4);
    }
}
