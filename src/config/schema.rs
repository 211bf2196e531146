//! Configuration schema definitions for themeweave.
//!
//! These structs map to the YAML in `.themeweave/config.yml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::host::HostConfig;
use crate::loader::DEFAULT_TEMPLATE_EXTENSIONS;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaveConfig {
    /// Active theme, used for `theme::name` fallbacks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Roots searched for plain template names, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,

    /// Roots searched for `@namespace/name` template names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<String, Vec<PathBuf>>,

    /// Directories scanned into the discovery index
    pub discovery: DiscoveryConfig,

    /// Explicit index entries, applied after discovery scans
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub templates: BTreeMap<String, PathBuf>,

    /// Variables visible to every template
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub globals: BTreeMap<String, serde_json::Value>,

    /// Escape output of HTML and XML templates
    #[serde(default, skip_serializing_if = "is_false")]
    pub autoescape: bool,

    /// Values answered by the configured host
    pub host: HostConfig,
}

/// Discovery index settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directories scanned recursively, later roots override earlier ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<PathBuf>,

    /// File extensions treated as templates
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_TEMPLATE_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl WeaveConfig {
    /// Make every relative path absolute against `root`.
    ///
    /// Index entries stay relative when they do not exist below `root`, so
    /// they can still be probed relative to the working directory.
    pub fn resolve_paths(&mut self, root: &Path) {
        let absolute = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        };

        self.search_paths.iter_mut().for_each(absolute);
        for roots in self.namespaces.values_mut() {
            roots.iter_mut().for_each(absolute);
        }
        self.discovery.roots.iter_mut().for_each(absolute);
        for path in self.templates.values_mut() {
            if path.is_relative() && root.join(&*path).exists() {
                *path = root.join(&*path);
            }
        }
    }
}
