//! Configuration loading and management for Inventory Guardian
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to clean domain objects
//! - Default thresholds and layers are embedded in the domain, not infrastructure
//! - Every load is validated so invalid regexes abort before any auditing

use crate::analyzer::namespace::NamespaceThresholds;
use crate::collector::sources::GROUP_PLACEHOLDER;
use crate::domain::findings::{EscalationPolicy, GuardianError, GuardianResult};
use crate::patterns::{DeclarationPattern, DEFAULT_DECLARATION_PATTERN};
use crate::selector;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file names looked up in the working directory
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "inventory_guardian.yaml",
    "inventory_guardian.yml",
    ".inventory_guardian.yaml",
];

/// Main configuration structure for Inventory Guardian
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
pub struct GuardianConfig {
    /// Configuration format version
    pub version: String,
    /// Regex recognising a declaration line; group 1 is the variable name
    #[serde(default = "default_declaration_pattern")]
    pub declaration_pattern: String,
    /// Layers in precedence order, lowest first
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerConfig>,
    /// Host and groups substituted into `{host}` / `{group}` layer paths
    #[serde(default)]
    pub target: InventoryTarget,
    /// Thresholds and selection for the auditors
    #[serde(default)]
    pub audit: AuditSettings,
    /// Which failed concerns are fatal
    #[serde(default)]
    pub escalation: EscalationPolicy,
}

/// A configuration layer and the sources it is read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Unique layer name
    pub id: String,
    /// Files, directories or glob patterns relative to the base directory
    pub paths: Vec<String>,
}

/// The single host whose precedence chain is audited
///
/// A layer path containing `{group}` becomes one layer per group, in the
/// order given; a path containing `{host}` is only used when a host is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryTarget {
    pub host: Option<String>,
    pub groups: Vec<String>,
}

impl InventoryTarget {
    pub fn new(host: Option<String>, groups: Vec<String>) -> Self {
        Self { host, groups }
    }

    fn validate(&self) -> GuardianResult<()> {
        for name in self.host.iter().chain(&self.groups) {
            if name.trim().is_empty() || name.contains(['/', '\\', '*', '?', '[', '{', '}']) {
                return Err(GuardianError::config(format!(
                    "Invalid host or group name '{name}'"
                )));
            }
        }
        Ok(())
    }
}

/// Explicit variable list, structured or free text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    List(Vec<String>),
    Text(String),
}

impl Default for ListInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl ListInput {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.iter().all(|i| i.trim().is_empty()),
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Auditor settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Give the resolver access to live-host facts
    pub remote_facts: bool,
    /// Names matching this regex may be undefined
    pub error_filter: String,
    /// Number of undefined variables tolerated
    pub error_assume: usize,
    /// Minimum average number of names per prefix
    pub pfx_min_uses: usize,
    /// Maximum number (and percentage) of names without prefix
    pub pfx_max_none: usize,
    /// Maximum number (and percentage) of prefixes used once
    pub pfx_max_once: usize,
    /// Only check names matching this regex
    pub from_pattern: String,
    /// Only check these names; wins over `from_pattern`
    pub from_list: ListInput,
    /// Worker threads for resolution (rayon default when unset)
    pub resolver_threads: Option<usize>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            remote_facts: false,
            error_filter: String::new(),
            error_assume: 0,
            pfx_min_uses: 4,
            pfx_max_none: 10,
            pfx_max_once: 10,
            from_pattern: String::new(),
            from_list: ListInput::default(),
            resolver_threads: None,
        }
    }
}

impl AuditSettings {
    pub fn namespace_thresholds(&self) -> NamespaceThresholds {
        NamespaceThresholds {
            min_uses: self.pfx_min_uses,
            max_none: self.pfx_max_none,
            max_once: self.pfx_max_once,
        }
    }

    /// Compiled exemption filter; an empty filter matches nothing
    pub fn error_filter_regex(&self) -> GuardianResult<Option<Regex>> {
        compile_optional("error_filter", &self.error_filter)
    }

    /// Compiled selection filter; an empty filter selects everything
    pub fn from_pattern_regex(&self) -> GuardianResult<Option<Regex>> {
        compile_optional("from_pattern", &self.from_pattern)
    }
}

fn compile_optional(field: &str, pattern: &str) -> GuardianResult<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|e| GuardianError::config(format!("Invalid {field} regex '{pattern}': {e}")))
}

impl GuardianConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GuardianResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            GuardianError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            GuardianError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> GuardianResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| GuardianError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// First default configuration file present in `dir`
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Load the discovered configuration file, or fall back to defaults
    pub fn load_or_default(dir: &Path) -> GuardianResult<Self> {
        match Self::discover(dir) {
            Some(path) => {
                tracing::debug!("Using configuration {}", path.display());
                Self::load_from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Default configuration: Ansible-style `group_vars/all` and `host_vars`
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            declaration_pattern: default_declaration_pattern(),
            layers: default_layers(),
            target: InventoryTarget::default(),
            audit: AuditSettings::default(),
            escalation: EscalationPolicy::default(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> GuardianResult<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(GuardianError::config(format!(
                "Unsupported configuration version: {}. Supported versions: 1.0",
                self.version
            )));
        }

        DeclarationPattern::new(&self.declaration_pattern)?;
        self.audit.error_filter_regex()?;
        self.audit.from_pattern_regex()?;
        selector::parse_list(&self.audit.from_list)?;

        self.target.validate()?;

        if self.audit.resolver_threads == Some(0) {
            return Err(GuardianError::config("resolver_threads must be greater than 0"));
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            if layer.id.trim().is_empty() {
                return Err(GuardianError::config("Layer id must not be empty"));
            }
            if !seen.insert(layer.id.as_str()) {
                return Err(GuardianError::config(format!(
                    "Duplicate layer id '{}'",
                    layer.id
                )));
            }
            let grouped = layer.paths.iter().filter(|p| p.contains(GROUP_PLACEHOLDER)).count();
            if grouped > 0 && grouped < layer.paths.len() {
                return Err(GuardianError::config(format!(
                    "Layer '{}' mixes {GROUP_PLACEHOLDER} paths with plain paths",
                    layer.id
                )));
            }
        }

        Ok(())
    }

    pub fn declaration(&self) -> GuardianResult<DeclarationPattern> {
        DeclarationPattern::new(&self.declaration_pattern)
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> GuardianResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GuardianError::config(format!("Failed to serialize config: {e}")))
    }

    /// Create a fingerprint of the configuration recorded in reports
    pub fn fingerprint(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_declaration_pattern() -> String {
    DEFAULT_DECLARATION_PATTERN.to_string()
}

fn default_layers() -> Vec<LayerConfig> {
    vec![
        LayerConfig {
            id: "all".to_string(),
            paths: vec![
                "group_vars/all.yml".to_string(),
                "group_vars/all.yaml".to_string(),
                "group_vars/all".to_string(),
            ],
        },
        LayerConfig {
            id: "group".to_string(),
            paths: vec![
                "group_vars/{group}.yml".to_string(),
                "group_vars/{group}.yaml".to_string(),
                "group_vars/{group}".to_string(),
            ],
        },
        LayerConfig {
            id: "host".to_string(),
            paths: vec![
                "host_vars/{host}.yml".to_string(),
                "host_vars/{host}.yaml".to_string(),
                "host_vars/{host}".to_string(),
            ],
        },
    ]
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: GuardianConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration and no layers
    pub fn new() -> Self {
        let mut config = GuardianConfig::default();
        config.layers.clear();
        Self { config }
    }

    /// Append a layer above the ones already added
    pub fn add_layer<I, S>(mut self, id: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.layers.push(LayerConfig {
            id: id.into(),
            paths: paths.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn declaration_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.declaration_pattern = pattern.into();
        self
    }

    pub fn error_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.audit.error_filter = filter.into();
        self
    }

    pub fn error_assume(mut self, assume: usize) -> Self {
        self.config.audit.error_assume = assume;
        self
    }

    pub fn from_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.audit.from_pattern = pattern.into();
        self
    }

    pub fn from_list(mut self, list: ListInput) -> Self {
        self.config.audit.from_list = list;
        self
    }

    pub fn namespace_thresholds(mut self, thresholds: NamespaceThresholds) -> Self {
        self.config.audit.pfx_min_uses = thresholds.min_uses;
        self.config.audit.pfx_max_none = thresholds.max_none;
        self.config.audit.pfx_max_once = thresholds.max_once;
        self
    }

    /// Audit the precedence chain of `host` through `groups`
    pub fn target<I, S>(mut self, host: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.target = InventoryTarget::new(
            Some(host.into()),
            groups.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn escalation(mut self, policy: EscalationPolicy) -> Self {
        self.config.escalation = policy;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> GuardianResult<GuardianConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
