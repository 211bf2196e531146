//! Template name resolution with fallbacks and a resolution cache.
//!
//! Resolution order (first match wins):
//! 1. Filesystem loader roots (never cached here, the loader caches itself)
//! 2. Resolution cache
//! 3. The name itself as a readable path
//! 4. Discovery index
//! 5. Discovery index under the name with the active theme prefix removed

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, WeaveError};
use crate::loader::discovery::{DiscoveredTemplates, TemplateIndex};
use crate::loader::filesystem::{validate_name, FilesystemLoader, TemplateLocator};
use crate::loader::fs::{FileSystem, OsFileSystem};
use crate::loader::theme::ActiveTheme;

/// Which strategy produced a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Found below a filesystem loader root.
    Roots,
    /// Served from the resolution cache.
    Cache,
    /// The name was itself a readable path.
    Direct,
    /// Found in the discovery index.
    Index,
    /// Found in the discovery index after removing the theme prefix.
    ThemeIndex,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResolutionSource::Roots => "roots",
            ResolutionSource::Cache => "cache",
            ResolutionSource::Direct => "direct",
            ResolutionSource::Index => "index",
            ResolutionSource::ThemeIndex => "theme index",
        })
    }
}

/// Resolves logical template names to readable files.
///
/// The cache is owned by this instance and is never invalidated: a path
/// accepted once stays accepted even if the file or its index entry later
/// disappears. Resolution mutates the cache, so each thread needs its own
/// resolver.
pub struct TemplateNameResolver {
    delegate: Box<dyn TemplateLocator>,
    index: Box<dyn TemplateIndex>,
    fs: Box<dyn FileSystem>,
    theme: Option<ActiveTheme>,
    cache: HashMap<String, PathBuf>,
}

impl fmt::Debug for TemplateNameResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateNameResolver")
            .field("theme", &self.theme)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl TemplateNameResolver {
    /// Create a resolver over a filesystem loader and discovery index.
    pub fn new(
        loader: FilesystemLoader,
        index: DiscoveredTemplates,
        theme: Option<ActiveTheme>,
    ) -> Self {
        Self::from_parts(Box::new(loader), Box::new(index), Box::new(OsFileSystem), theme)
    }

    /// Create a resolver from arbitrary collaborators.
    pub fn from_parts(
        delegate: Box<dyn TemplateLocator>,
        index: Box<dyn TemplateIndex>,
        fs: Box<dyn FileSystem>,
        theme: Option<ActiveTheme>,
    ) -> Self {
        Self {
            delegate,
            index,
            fs,
            theme,
            cache: HashMap::new(),
        }
    }

    /// The active theme, if one was configured.
    pub fn theme(&self) -> Option<&ActiveTheme> {
        self.theme.as_ref()
    }

    /// Resolve a template name to a readable path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTemplateName` for names that escape their root, and
    /// `TemplateNotFound` (with the filesystem loader's error as source)
    /// when no strategy yields a readable file.
    pub fn resolve(&mut self, name: &str) -> Result<PathBuf> {
        self.resolve_with_source(name).map(|(path, _)| path)
    }

    /// Resolve a template name, also reporting which strategy matched.
    pub fn resolve_with_source(&mut self, name: &str) -> Result<(PathBuf, ResolutionSource)> {
        validate_name(name).map_err(|reason| WeaveError::InvalidTemplateName {
            name: name.to_string(),
            reason,
        })?;

        let delegate_error = match self.delegate.find(name) {
            Ok(path) => {
                tracing::debug!(name, path = %path.display(), "Resolved template from roots");
                return Ok((path, ResolutionSource::Roots));
            }
            Err(e) => e,
        };

        if let Some(path) = self.cache.get(name) {
            tracing::trace!(name, "Resolution cache hit");
            return Ok((path.clone(), ResolutionSource::Cache));
        }

        if self.fs.is_readable(Path::new(name)) {
            let path = PathBuf::from(name);
            self.cache.insert(name.to_string(), path.clone());
            tracing::debug!(name, "Resolved template as a direct path");
            return Ok((path, ResolutionSource::Direct));
        }

        if let Some(candidate) = self.index.lookup(name) {
            if let Some(path) = self.accept(name, candidate) {
                return Ok((path, ResolutionSource::Index));
            }
        } else if let Some(stripped) = self.theme.as_ref().and_then(|t| t.strip_prefix(name)) {
            if let Some(path) = self.cache.get(stripped) {
                tracing::trace!(name, stripped, "Resolution cache hit for unqualified name");
                return Ok((path.clone(), ResolutionSource::Cache));
            }
            if let Some(candidate) = self.index.lookup(stripped) {
                if let Some(path) = self.accept(stripped, candidate) {
                    return Ok((path, ResolutionSource::ThemeIndex));
                }
            }
        }

        tracing::debug!(name, error = %delegate_error, "Template not found");
        Err(WeaveError::TemplateNotFound {
            name: name.to_string(),
            source: delegate_error,
        })
    }

    /// Cache `key -> candidate` when the candidate is readable.
    fn accept(&mut self, key: &str, candidate: PathBuf) -> Option<PathBuf> {
        if !self.fs.is_readable(&candidate) {
            tracing::trace!(key, candidate = %candidate.display(), "Indexed template is not readable");
            return None;
        }

        tracing::debug!(key, path = %candidate.display(), "Resolved template from discovery index");
        self.cache.insert(key.to_string(), candidate.clone());
        Some(candidate)
    }

    /// Whether `name` resolves to a readable template.
    pub fn exists(&mut self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// The path `name` was previously resolved to, without probing.
    ///
    /// Checks the resolution cache under `name`, then under its
    /// theme-stripped form, then the filesystem loader's own cache.
    pub fn cached_path(&self, name: &str) -> Option<PathBuf> {
        if let Some(path) = self.cache.get(name) {
            return Some(path.clone());
        }

        let stripped = self.theme.as_ref().and_then(|t| t.strip_prefix(name));
        if let Some(path) = stripped.and_then(|s| self.cache.get(s)) {
            return Some(path.clone());
        }

        self.delegate.cached(name)
    }

    /// Read the source of an already resolved template.
    ///
    /// `name` must have been passed to [`resolve`](Self::resolve) first.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedTemplate` when `name` was never resolved and `Io`
    /// when the file cannot be read.
    pub fn read_source(&self, name: &str) -> Result<String> {
        let path = self
            .cached_path(name)
            .ok_or_else(|| WeaveError::UnresolvedTemplate {
                name: name.to_string(),
            })?;

        Ok(self.fs.read_all(&path)?)
    }

    /// Resolve `name` and read its source.
    pub fn source(&mut self, name: &str) -> Result<String> {
        let path = self.resolve(name)?;
        Ok(self.fs.read_all(&path)?)
    }

    /// Number of names held in the resolution cache.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
