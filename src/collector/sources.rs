//! Layer source expansion using glob patterns
//!
//! Architectural Principle: Service Layer - LayerSources turns configured layers into ordered files
//! - Each configured layer keeps its precedence position; `{group}` layers repeat per group
//! - Glob patterns, literal files and directories are expanded in a stable order
//! - Absent files are kept so the collector can treat them as empty layers

use crate::config::{InventoryTarget, LayerConfig};
use crate::domain::findings::{GuardianError, GuardianResult};
use crate::domain::occurrences::LayerId;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Placeholder for the audited host in a layer path
pub const HOST_PLACEHOLDER: &str = "{host}";
/// Placeholder for each of the host's groups in a layer path
pub const GROUP_PLACEHOLDER: &str = "{group}";

/// File extensions recognised inside a layer directory
const LAYER_EXTENSIONS: &[&str] = &["yml", "yaml", "json"];

/// One readable source belonging to a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSource {
    pub layer: LayerId,
    pub path: PathBuf,
}

impl LayerSource {
    pub fn new(layer: LayerId, path: impl Into<PathBuf>) -> Self {
        Self {
            layer,
            path: path.into(),
        }
    }
}

/// Substitute the target into layer paths
///
/// A layer whose paths mention `{group}` becomes one layer per group, in the
/// target's order. Paths mentioning `{host}` are dropped without a host, and
/// a layer left without paths is dropped.
pub fn instantiate_layers(layers: &[LayerConfig], target: &InventoryTarget) -> Vec<LayerConfig> {
    let mut concrete = Vec::new();

    for layer in layers {
        if layer.paths.iter().any(|p| p.contains(GROUP_PLACEHOLDER)) {
            for group in &target.groups {
                let paths = layer
                    .paths
                    .iter()
                    .map(|p| p.replace(GROUP_PLACEHOLDER, group))
                    .collect();
                push_layer(&mut concrete, format!("{}:{}", layer.id, group), paths, target);
            }
        } else {
            push_layer(&mut concrete, layer.id.clone(), layer.paths.clone(), target);
        }
    }

    concrete
}

fn push_layer(concrete: &mut Vec<LayerConfig>, id: String, paths: Vec<String>, target: &InventoryTarget) {
    let paths: Vec<String> = paths
        .into_iter()
        .filter_map(|p| {
            if !p.contains(HOST_PLACEHOLDER) {
                return Some(p);
            }
            target.host.as_ref().map(|host| p.replace(HOST_PLACEHOLDER, host))
        })
        .collect();

    if paths.is_empty() {
        tracing::debug!("Layer '{}' has no paths without a host", id);
        return;
    }
    concrete.push(LayerConfig { id, paths });
}

/// Expand configured layers for `target` into sources relative to `base_dir`
pub fn expand_layers(
    layers: &[LayerConfig],
    target: &InventoryTarget,
    base_dir: &Path,
) -> GuardianResult<Vec<LayerSource>> {
    let layers = instantiate_layers(layers, target);
    let mut sources = Vec::new();

    for (precedence, layer) in layers.iter().enumerate() {
        let id = LayerId::new(precedence, layer.id.clone());
        for pattern in &layer.paths {
            for path in expand_pattern(base_dir, pattern)? {
                sources.push(LayerSource::new(id.clone(), path));
            }
        }
    }

    tracing::debug!("Expanded {} layers into {} sources", layers.len(), sources.len());
    Ok(sources)
}

/// One layer per path, in the order given (e.g. CLI positional arguments)
pub fn layers_from_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<LayerSource> {
    let mut sources = Vec::new();

    for (precedence, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let id = LayerId::new(precedence, path.display().to_string());
        if path.is_dir() {
            for file in files_in_directory(path) {
                sources.push(LayerSource::new(id.clone(), file));
            }
        } else {
            sources.push(LayerSource::new(id, path));
        }
    }

    sources
}

fn expand_pattern(base_dir: &Path, pattern: &str) -> GuardianResult<Vec<PathBuf>> {
    let joined = base_dir.join(pattern);
    let joined_str = joined.to_string_lossy();

    if !is_glob(pattern) {
        if joined.is_dir() {
            return Ok(files_in_directory(&joined));
        }
        // missing files stay in the list and contribute no occurrences
        return Ok(vec![joined]);
    }

    let entries = glob::glob(&joined_str).map_err(|e| {
        GuardianError::config(format!("Invalid layer pattern '{pattern}': {e}"))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_dir() => paths.extend(files_in_directory(&path)),
            Ok(path) => paths.push(path),
            Err(e) => tracing::debug!("Skipping unreadable glob entry: {}", e),
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Layer files inside a directory, sorted
fn files_in_directory(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_layer_extension(p))
        .collect();
    files.sort();
    files
}

fn has_layer_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LAYER_EXTENSIONS.contains(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layer(id: &str, paths: &[&str]) -> LayerConfig {
        LayerConfig {
            id: id.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_expand_keeps_precedence_and_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("group_vars/all")).unwrap();
        fs::write(root.join("group_vars/all/b.yml"), "b: 1\n").unwrap();
        fs::write(root.join("group_vars/all/a.yaml"), "a: 1\n").unwrap();
        fs::write(root.join("group_vars/all/notes.txt"), "x: 1\n").unwrap();

        let sources = expand_layers(
            &[
                layer("all", &["group_vars/all.yml", "group_vars/all"]),
                layer("web", &["group_vars/web.yml"]),
            ],
            &InventoryTarget::default(),
            root,
        )
        .unwrap();

        let names: Vec<_> = sources
            .iter()
            .map(|s| (s.layer.precedence, s.path.file_name().unwrap().to_string_lossy().to_string()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "all.yml".to_string()),
                (0, "a.yaml".to_string()),
                (0, "b.yml".to_string()),
                (1, "web.yml".to_string()),
            ]
        );
    }

    #[test]
    fn test_expand_glob() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("host_vars")).unwrap();
        fs::write(root.join("host_vars/db.yml"), "x: 1\n").unwrap();
        fs::write(root.join("host_vars/app.yml"), "x: 1\n").unwrap();

        let sources = expand_layers(
            &[layer("hosts", &["host_vars/*.yml"])],
            &InventoryTarget::default(),
            root,
        )
        .unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources[0].path.ends_with("app.yml"));
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = expand_layers(
            &[layer("bad", &["[unclosed"])],
            &InventoryTarget::default(),
            temp_dir.path(),
        );
        assert!(matches!(result, Err(GuardianError::Configuration { .. })));
    }

    #[test]
    fn test_target_builds_precedence_chain() {
        let layers = [
            layer("all", &["group_vars/all.yml"]),
            layer("group", &["group_vars/{group}.yml"]),
            layer("host", &["host_vars/{host}.yml"]),
        ];
        let target = InventoryTarget::new(
            Some("web1".to_string()),
            vec!["web".to_string(), "eu".to_string()],
        );

        let concrete = instantiate_layers(&layers, &target);
        let ids: Vec<_> = concrete.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["all", "group:web", "group:eu", "host"]);
        assert_eq!(concrete[3].paths, vec!["host_vars/web1.yml"]);

        let sources = expand_layers(&layers, &target, Path::new("/inv")).unwrap();
        assert_eq!(sources[2].layer, LayerId::new(2, "group:eu"));
        assert_eq!(sources[2].path, PathBuf::from("/inv/group_vars/eu.yml"));
    }

    #[test]
    fn test_placeholder_layers_dropped_without_target() {
        let layers = [
            layer("all", &["group_vars/all.yml"]),
            layer("group", &["group_vars/{group}.yml"]),
            layer("host", &["host_vars/{host}.yml"]),
        ];

        let concrete = instantiate_layers(&layers, &InventoryTarget::default());
        assert_eq!(concrete.len(), 1);
        assert_eq!(concrete[0].id, "all");
    }

    #[test]
    fn test_layers_from_paths() {
        let sources = layers_from_paths(&["one.yml", "two.yml"]);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].layer.precedence, 1);
        assert_eq!(sources[1].layer.name, "two.yml");
    }
}
