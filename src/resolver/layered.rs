//! Resolver rendering `{{ name }}` references over merged layer files
//!
//! Layers are merged key by key, higher precedence replacing lower. Only bare
//! variable references are substituted; any other template expression is kept
//! verbatim. A missing reference or a reference cycle renders undefined.

use super::{ResolutionOutcome, Resolver, UNDEFINED_SENTINEL};
use crate::collector::LayerSource;
use crate::domain::findings::{GuardianError, GuardianResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::{
    self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use serde_json::Value as JsonValue;
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref REFERENCE: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap();
}

/// A YAML document where a repeated mapping key keeps its last value
///
/// `serde_yaml::Value` rejects duplicate keys; inventories repeat keys and
/// the later declaration wins.
struct LayerDocument(YamlValue);

impl LayerDocument {
    fn parse(content: &str) -> Result<YamlValue, serde_yaml::Error> {
        serde_yaml::from_str::<LayerDocument>(content).map(|doc| doc.0)
    }
}

impl<'de> Deserialize<'de> for LayerDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LayerDocumentVisitor).map(LayerDocument)
    }
}

struct LayerDocumentVisitor;

impl<'de> Visitor<'de> for LayerDocumentVisitor {
    type Value = YamlValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<YamlValue, E> {
        Ok(YamlValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<YamlValue, E> {
        Ok(YamlValue::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<YamlValue, E> {
        Ok(YamlValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<YamlValue, E> {
        Ok(YamlValue::Number(v.into()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<YamlValue, E> {
        Ok(YamlValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<YamlValue, E> {
        Ok(YamlValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<YamlValue, E> {
        Ok(YamlValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<YamlValue, E> {
        Ok(YamlValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<YamlValue, D::Error> {
        LayerDocument::deserialize(deserializer).map(|doc| doc.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<YamlValue, A::Error> {
        let mut items = Vec::new();
        while let Some(LayerDocument(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(YamlValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<YamlValue, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((LayerDocument(key), LayerDocument(value))) = map.next_entry()? {
            // last declaration wins
            mapping.insert(key, value);
        }
        Ok(YamlValue::Mapping(mapping))
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<YamlValue, A::Error> {
        let (tag, variant): (String, _) = data.variant()?;
        let LayerDocument(value) = variant.newtype_variant()?;
        Ok(YamlValue::Tagged(Box::new(TaggedValue {
            tag: Tag::new(tag),
            value,
        })))
    }
}

/// Resolver over the merged top-level keys of every layer
#[derive(Debug, Clone, Default)]
pub struct LayeredResolver {
    values: HashMap<String, YamlValue>,
    facts: HashMap<String, YamlValue>,
}

impl LayeredResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and merge layer files in precedence order; unreadable files are skipped
    pub fn from_sources(sources: &[LayerSource]) -> Self {
        let mut ordered: Vec<&LayerSource> = sources.iter().collect();
        ordered.sort_by_key(|s| s.layer.precedence);

        let mut resolver = Self::new();
        for source in ordered {
            let Ok(content) = fs::read_to_string(&source.path) else {
                tracing::debug!("Layer source {} not read", source.path.display());
                continue;
            };
            match LayerDocument::parse(&content) {
                Ok(document) => resolver.merge_document(document, &source.path),
                Err(e) => {
                    tracing::warn!("Skipping unparseable layer {}: {}", source.path.display(), e)
                }
            }
        }
        resolver
    }

    /// Merge a document above everything merged so far
    pub fn merge_document(&mut self, document: YamlValue, origin: &Path) {
        match document {
            YamlValue::Mapping(mapping) => {
                for (key, value) in mapping {
                    match key {
                        YamlValue::String(name) => {
                            self.values.insert(name, value);
                        }
                        other => tracing::debug!(
                            "Ignoring non-string key {:?} in {}",
                            other,
                            origin.display()
                        ),
                    }
                }
            }
            YamlValue::Null => {}
            _ => tracing::warn!("Layer {} is not a mapping", origin.display()),
        }
    }

    /// Host facts, consulted above every layer
    pub fn with_facts(mut self, facts: HashMap<String, YamlValue>) -> Self {
        self.facts = facts;
        self
    }

    /// Read a facts file (JSON or YAML), unwrapping an `ansible_facts` envelope
    pub fn load_facts(path: &Path) -> GuardianResult<HashMap<String, YamlValue>> {
        let content = fs::read_to_string(path).map_err(|e| {
            GuardianError::resolution("facts", format!("cannot read {}: {}", path.display(), e))
        })?;
        let document = LayerDocument::parse(&content).map_err(|e| {
            GuardianError::resolution("facts", format!("cannot parse {}: {}", path.display(), e))
        })?;

        let document = match document {
            YamlValue::Mapping(mut mapping) => {
                match mapping.remove("ansible_facts") {
                    Some(inner) => inner,
                    None => YamlValue::Mapping(mapping),
                }
            }
            other => other,
        };

        match document {
            YamlValue::Mapping(mapping) => Ok(mapping
                .into_iter()
                .filter_map(|(k, v)| match k {
                    YamlValue::String(name) => Some((name, v)),
                    _ => None,
                })
                .collect()),
            _ => Err(GuardianError::resolution(
                "facts",
                format!("{} is not a mapping", path.display()),
            )),
        }
    }

    fn lookup(&self, name: &str) -> Option<&YamlValue> {
        self.facts.get(name).or_else(|| self.values.get(name))
    }

    fn render_name(&self, name: &str, stack: &mut Vec<String>) -> Result<String, String> {
        if stack.iter().any(|n| n == name) {
            return Err(format!("recursive loop detected in template string: {name}"));
        }
        let value = self
            .lookup(name)
            .ok_or_else(|| format!("'{name}' is undefined"))?;

        stack.push(name.to_string());
        let rendered = self.render_value(value, stack);
        stack.pop();
        rendered
    }

    fn render_value(&self, value: &YamlValue, stack: &mut Vec<String>) -> Result<String, String> {
        match value {
            YamlValue::String(text) => self.render_text(text, stack),
            YamlValue::Null => Ok(String::new()),
            YamlValue::Bool(b) => Ok(b.to_string()),
            YamlValue::Number(n) => Ok(n.to_string()),
            YamlValue::Tagged(tagged) => self.render_value(&tagged.value, stack),
            YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
                let json = self.render_json(value, stack)?;
                serde_json::to_string(&json).map_err(|e| e.to_string())
            }
        }
    }

    fn render_json(&self, value: &YamlValue, stack: &mut Vec<String>) -> Result<JsonValue, String> {
        Ok(match value {
            YamlValue::Sequence(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.render_json(item, stack))
                    .collect::<Result<_, _>>()?,
            ),
            YamlValue::Mapping(mapping) => {
                let mut object = serde_json::Map::new();
                for (key, item) in mapping {
                    let key = match key {
                        YamlValue::String(s) => s.clone(),
                        other => self.render_value(other, stack)?,
                    };
                    object.insert(key, self.render_json(item, stack)?);
                }
                JsonValue::Object(object)
            }
            YamlValue::String(text) => JsonValue::String(self.render_text(text, stack)?),
            YamlValue::Null => JsonValue::Null,
            YamlValue::Bool(b) => JsonValue::Bool(*b),
            YamlValue::Number(n) => serde_json::to_value(n).map_err(|e| e.to_string())?,
            YamlValue::Tagged(tagged) => self.render_json(&tagged.value, stack)?,
        })
    }

    fn render_text(&self, text: &str, stack: &mut Vec<String>) -> Result<String, String> {
        let mut output = String::with_capacity(text.len());
        let mut last = 0;

        for captures in REFERENCE.captures_iter(text) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            output.push_str(&text[last..whole.start()]);
            output.push_str(&self.render_name(name.as_str(), stack)?);
            last = whole.end();
        }

        output.push_str(&text[last..]);
        Ok(output)
    }
}

impl Resolver for LayeredResolver {
    fn resolve(&self, name: &str) -> ResolutionOutcome {
        match self.render_name(name, &mut Vec::new()) {
            Ok(text) => ResolutionOutcome::from_rendered(text),
            Err(cause) => ResolutionOutcome::from_rendered(format!("{UNDEFINED_SENTINEL}: {cause}")),
        }
    }
}
