//! Occurrence collection over ordered layer sources
//!
//! CDD Principle: Domain Services - the collector turns raw layer text into an occurrence multiset
//! - Missing or unreadable layer sources contribute zero occurrences
//! - Every matching line counts, including repeats within one source
//! - Output is sorted so that the rest of the pipeline is deterministic

pub mod sources;

use crate::domain::occurrences::{LayerId, Occurrence, OccurrenceSet};
use crate::patterns::DeclarationPattern;
use std::fs::File;
use std::io::{BufRead, BufReader};

pub use sources::{expand_layers, instantiate_layers, layers_from_paths, LayerSource};

/// Scans layer sources for variable declarations
#[derive(Debug, Clone, Default)]
pub struct OccurrenceCollector {
    pattern: DeclarationPattern,
}

impl OccurrenceCollector {
    pub fn new(pattern: DeclarationPattern) -> Self {
        Self { pattern }
    }

    /// Collect occurrences from every source; absent sources are skipped
    pub fn collect(&self, sources: &[LayerSource]) -> OccurrenceSet {
        let mut occurrences = Vec::new();

        for source in sources {
            match File::open(&source.path) {
                Ok(file) => {
                    let found = self.scan(&source.layer, BufReader::new(file));
                    tracing::debug!(
                        "{} declarations in {} (layer {})",
                        found.len(),
                        source.path.display(),
                        source.layer
                    );
                    occurrences.extend(found);
                }
                Err(e) => {
                    tracing::debug!("Layer source {} not read: {}", source.path.display(), e);
                }
            }
        }

        let set = OccurrenceSet::from_occurrences(occurrences);
        tracing::info!(
            "Collected {} occurrences of {} variables from {} sources",
            set.len(),
            set.distinct_names(),
            sources.len()
        );
        set
    }

    /// Collect occurrences from an in-memory or streamed source
    pub fn collect_reader<R: BufRead>(&self, layer: LayerId, reader: R) -> OccurrenceSet {
        OccurrenceSet::from_occurrences(self.scan(&layer, reader))
    }

    fn scan<R: BufRead>(&self, layer: &LayerId, reader: R) -> Vec<Occurrence> {
        let mut found = Vec::new();

        for line in reader.lines() {
            // a read failure mid-stream ends the source, keeping what was read
            let Ok(line) = line else { break };
            if let Some(name) = self.pattern.declared_name(&line) {
                found.push(Occurrence::new(name, layer.clone()));
            }
        }

        found
    }
}
