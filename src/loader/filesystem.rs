//! Multi-root filesystem loader.
//!
//! Looks a relative template name up in an ordered list of root directories
//! and returns the first file that exists. Roots are grouped by namespace:
//! plain names search the main namespace, `@name/rest` searches `name`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Namespace used for names without an `@namespace/` prefix.
pub const MAIN_NAMESPACE: &str = "__main__";

/// Errors reported by a [`TemplateLocator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// No root contained the template.
    #[error("Unable to find template \"{name}\" (looked into: {roots})", roots = join_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },

    /// The namespace has no registered roots.
    #[error("There are no registered paths for namespace \"{namespace}\"")]
    UnknownNamespace { namespace: String, name: String },

    /// The name is malformed.
    #[error("Invalid template name \"{name}\": {reason}")]
    InvalidName { name: String, reason: String },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Something that finds template files by relative name.
///
/// Implementations may cache hits; [`cached`](TemplateLocator::cached)
/// exposes that cache without probing.
pub trait TemplateLocator {
    /// Find the file for `name`.
    fn find(&mut self, name: &str) -> Result<PathBuf, LoaderError>;

    /// A previously found path for `name`, if any.
    fn cached(&self, name: &str) -> Option<PathBuf>;
}

/// Check that `name` cannot reach outside the configured roots.
///
/// Rejects NUL bytes and relative segments that climb above the root.
/// Leading separators are ignored, so absolute paths pass.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.contains('\0') {
        return Err("template names cannot contain NUL bytes".to_string());
    }

    let mut level: i32 = 0;
    for part in name.trim_start_matches('/').split(['/', '\\']) {
        match part {
            ".." => level -= 1,
            "." => {}
            _ => level += 1,
        }

        if level < 0 {
            return Err("looks like a template outside the configured directories".to_string());
        }
    }

    Ok(())
}

/// Ordered multi-root loader with its own hit cache.
#[derive(Debug, Clone, Default)]
pub struct FilesystemLoader {
    paths: BTreeMap<String, Vec<PathBuf>>,
    cache: HashMap<String, PathBuf>,
}

impl FilesystemLoader {
    /// Create a loader with no roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader searching `roots` (in order) for plain names.
    pub fn with_paths<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut loader = Self::new();
        for root in roots {
            loader.add_path(root);
        }
        loader
    }

    /// Append a root to the main namespace.
    pub fn add_path(&mut self, root: impl Into<PathBuf>) {
        self.add_namespaced_path(MAIN_NAMESPACE, root);
    }

    /// Append a root to `namespace`.
    pub fn add_namespaced_path(&mut self, namespace: &str, root: impl Into<PathBuf>) {
        // Roots change what a name resolves to
        self.cache.clear();
        let root = root.into();
        tracing::trace!(namespace, root = %root.display(), "Adding template root");
        self.paths
            .entry(namespace.to_string())
            .or_default()
            .push(root);
    }

    /// Put a root in front of the main namespace's roots.
    pub fn prepend_path(&mut self, root: impl Into<PathBuf>) {
        self.prepend_namespaced_path(MAIN_NAMESPACE, root);
    }

    /// Put a root in front of `namespace`'s roots.
    pub fn prepend_namespaced_path(&mut self, namespace: &str, root: impl Into<PathBuf>) {
        self.cache.clear();
        self.paths
            .entry(namespace.to_string())
            .or_default()
            .insert(0, root.into());
    }

    /// Roots registered for `namespace`, in search order.
    pub fn paths(&self, namespace: &str) -> &[PathBuf] {
        self.paths.get(namespace).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Namespaces that have at least one root.
    pub fn namespaces(&self) -> Vec<&str> {
        self.paths.keys().map(String::as_str).collect()
    }

    fn parse_name(name: &str) -> Result<(&str, &str), LoaderError> {
        match name.strip_prefix('@') {
            Some(rest) => match rest.split_once('/') {
                Some((namespace, short)) if !namespace.is_empty() => Ok((namespace, short)),
                _ => Err(LoaderError::InvalidName {
                    name: name.to_string(),
                    reason: "malformed namespaced template name".to_string(),
                }),
            },
            None => Ok((MAIN_NAMESPACE, name)),
        }
    }
}

impl TemplateLocator for FilesystemLoader {
    fn find(&mut self, name: &str) -> Result<PathBuf, LoaderError> {
        if let Some(path) = self.cache.get(name) {
            return Ok(path.clone());
        }

        validate_name(name).map_err(|reason| LoaderError::InvalidName {
            name: name.to_string(),
            reason,
        })?;

        let (namespace, short) = Self::parse_name(name)?;
        let roots = self
            .paths
            .get(namespace)
            .ok_or_else(|| LoaderError::UnknownNamespace {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        // Joining an absolute path would discard the root
        if !Path::new(short).has_root() {
            for root in roots {
                let candidate = root.join(short);
                tracing::trace!(candidate = %candidate.display(), "Probing template root");
                if candidate.is_file() {
                    self.cache.insert(name.to_string(), candidate.clone());
                    return Ok(candidate);
                }
            }
        }

        Err(LoaderError::NotFound {
            name: name.to_string(),
            searched: roots.clone(),
        })
    }

    fn cached(&self, name: &str) -> Option<PathBuf> {
        self.cache.get(name).cloned()
    }
}
