//! Variable resolution capability used by the definition auditor
//!
//! Architecture: Ports and Adapters - the auditor depends on the Resolver trait only
//! - Rendered text is classified by a sentinel prefix, never by substring search
//! - Map and closure resolvers back tests and embedding callers
//! - LayeredResolver renders simple template references over the layer files

pub mod layered;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use layered::LayeredResolver;

/// Text an evaluator renders in place of an unresolved variable
pub const UNDEFINED_SENTINEL: &str = "VARIABLE IS NOT DEFINED!";

/// Result of resolving one variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum ResolutionOutcome {
    Defined(String),
    /// Carries the evaluator's cause when one was given
    Undefined(String),
}

impl ResolutionOutcome {
    /// Classify rendered text; only a leading sentinel marks it undefined
    pub fn from_rendered(text: impl Into<String>) -> Self {
        let text = text.into();
        match text.strip_prefix(UNDEFINED_SENTINEL) {
            Some(rest) => {
                let cause = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
                if cause.is_empty() {
                    Self::Undefined("undefined".to_string())
                } else {
                    Self::Undefined(cause.to_string())
                }
            }
            None => Self::Defined(text),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

/// Resolves a variable name to its final value
///
/// Implementations must be idempotent and free of side effects visible to
/// the auditor; they may be called concurrently.
pub trait Resolver: Send + Sync {
    fn resolve(&self, name: &str) -> ResolutionOutcome;
}

/// Resolver over a fixed name to rendered-text mapping
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    rendered: HashMap<String, String>,
}

impl MapResolver {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rendered: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, name: &str) -> ResolutionOutcome {
        match self.rendered.get(name) {
            Some(text) => ResolutionOutcome::from_rendered(text.clone()),
            None => ResolutionOutcome::from_rendered(format!(
                "{UNDEFINED_SENTINEL}: '{name}' is undefined"
            )),
        }
    }
}

/// Adapts any rendering closure into a resolver
pub struct FnResolver<F> {
    render: F,
}

impl<F> FnResolver<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    pub fn new(render: F) -> Self {
        Self { render }
    }
}

impl<F> Resolver for FnResolver<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve(&self, name: &str) -> ResolutionOutcome {
        ResolutionOutcome::from_rendered((self.render)(name))
    }
}
