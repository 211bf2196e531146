//! Discovery index of templates provided by themes and modules.

use crate::config::DiscoveryConfig;
use crate::error::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions indexed by [`DiscoveredTemplates::scan`] unless configured otherwise.
pub const DEFAULT_TEMPLATE_EXTENSIONS: &[&str] = &["html", "twig", "tera"];

/// Read-only mapping from logical name to candidate path.
pub trait TemplateIndex {
    /// Candidate path for `name`, if the index knows it.
    fn lookup(&self, name: &str) -> Option<PathBuf>;
}

impl TemplateIndex for HashMap<String, PathBuf> {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        self.get(name).cloned()
    }
}

/// Index assembled from explicit entries and directory scans.
#[derive(Debug, Clone)]
pub struct DiscoveredTemplates {
    templates: HashMap<String, PathBuf>,
    extensions: Vec<String>,
}

impl Default for DiscoveredTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveredTemplates {
    /// Create an empty index using the default template extensions.
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_TEMPLATE_EXTENSIONS.iter().copied())
    }

    /// Create an empty index that scans files with the given extensions.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: HashMap::new(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the index from configuration: scan every discovery root in
    /// order, then apply the explicit `templates` entries on top.
    pub fn from_config(
        discovery: &DiscoveryConfig,
        templates: &BTreeMap<String, PathBuf>,
    ) -> Result<Self> {
        let mut index = Self::with_extensions(discovery.extensions.iter().cloned());
        for root in &discovery.roots {
            index.scan(root)?;
        }
        for (name, path) in templates {
            index.insert(name.clone(), path.clone());
        }
        Ok(index)
    }

    /// Register `name -> path`, returning the entry it replaced.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.templates.insert(name.into(), path.into())
    }

    /// Remove the entry for `name`.
    pub fn remove(&mut self, name: &str) -> Option<PathBuf> {
        self.templates.remove(name)
    }

    /// Index every template file below `root`.
    ///
    /// Files are keyed by their root-relative path with `/` separators.
    /// Entries from later scans override earlier ones. A missing root is
    /// skipped. Returns the number of files indexed.
    pub fn scan(&mut self, root: &Path) -> Result<usize> {
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "Skipping missing discovery root");
            return Ok(0);
        }

        let mut found = Vec::new();
        let mut visited = HashSet::new();
        self.scan_recursive(root, &mut visited, &mut found)?;

        let count = found.len();
        for path in found {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            self.templates.insert(name, path);
        }

        tracing::debug!(root = %root.display(), count, "Discovered templates");
        Ok(count)
    }

    /// Symlinked directories are followed, but each real directory is
    /// entered once.
    fn scan_recursive(
        &self,
        dir: &Path,
        visited: &mut HashSet<PathBuf>,
        found: &mut Vec<PathBuf>,
    ) -> Result<()> {
        if !visited.insert(fs::canonicalize(dir)?) {
            tracing::trace!(dir = %dir.display(), "Skipping already scanned directory");
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.scan_recursive(&path, visited, found)?;
            } else if self.is_template(&path) {
                found.push(path);
            }
        }

        Ok(())
    }

    fn is_template(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// Get a candidate path by name.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.templates.get(name).map(PathBuf::as_path)
    }

    /// All indexed names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of indexed templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateIndex for DiscoveredTemplates {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        self.templates.get(name).cloned()
    }
}
