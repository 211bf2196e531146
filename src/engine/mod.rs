//! Template rendering.
//!
//! [`TemplateEngine`] ties Tera to the name resolver and the extension
//! registry. A template is loaded on first use: its name is resolved, its
//! source rewritten into plain Tera syntax and every template it extends,
//! includes or imports is loaded the same way before the whole set is
//! handed to Tera in one batch.

pub mod syntax;

pub use syntax::{Dependency, Rewritten, SyntaxError, SyntaxRewriter};

use std::collections::{BTreeMap, HashSet};
use std::error::Error as _;

use tera::{Context, Tera, Value};

use crate::error::{Result, WeaveError};
use crate::extension::{ExtensionContributor, ExtensionRegistry};
use crate::loader::TemplateNameResolver;

/// Name used in errors for templates rendered from a string.
pub const INLINE_TEMPLATE: &str = "<inline>";

/// Suffixes autoescaped when autoescaping is enabled.
pub const AUTOESCAPE_SUFFIXES: &[&str] = &[".html", ".htm", ".xml", ".twig"];

/// Renders templates found through a [`TemplateNameResolver`].
pub struct TemplateEngine {
    tera: Tera,
    resolver: TemplateNameResolver,
    registry: ExtensionRegistry,
    globals: BTreeMap<String, Value>,
    loaded: HashSet<String>,
}

impl TemplateEngine {
    /// Create an engine with autoescaping off.
    pub fn new(resolver: TemplateNameResolver, registry: ExtensionRegistry) -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        registry.install(&mut tera);

        Self {
            tera,
            resolver,
            registry,
            globals: BTreeMap::new(),
            loaded: HashSet::new(),
        }
    }

    /// Escape output of `.html`, `.htm`, `.xml` and `.twig` templates.
    pub fn set_autoescape(&mut self, enabled: bool) {
        let suffixes = if enabled {
            AUTOESCAPE_SUFFIXES.to_vec()
        } else {
            vec![]
        };
        self.tera.autoescape_on(suffixes);
    }

    /// Add a variable visible to every render. Caller context wins.
    pub fn add_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Registry globals overlaid with globals added to the engine.
    pub fn globals(&self) -> BTreeMap<String, Value> {
        let mut globals = self.registry.globals().clone();
        globals.extend(self.globals.iter().map(|(k, v)| (k.clone(), v.clone())));
        globals
    }

    pub fn resolver(&self) -> &TemplateNameResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut TemplateNameResolver {
        &mut self.resolver
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Apply a contributor and register its entries with Tera.
    pub fn contribute(&mut self, contributor: &dyn ExtensionContributor) {
        self.registry.contribute(contributor);
        self.registry.install(&mut self.tera);
    }

    /// Names of the templates loaded so far, sorted.
    pub fn loaded(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.loaded.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Load a template and its dependencies.
    ///
    /// Templates already loaded are not read again. A missing
    /// `include ... ignore missing` target is skipped.
    pub fn load(&mut self, name: &str) -> Result<()> {
        let mut pending = vec![(name.to_string(), false)];
        let mut seen = HashSet::new();
        let mut batch: Vec<(String, String)> = Vec::new();

        while let Some((name, optional)) = pending.pop() {
            if self.loaded.contains(&name) || !seen.insert(name.clone()) {
                continue;
            }

            let path = match self.resolver.resolve(&name) {
                Ok(path) => path,
                Err(err) if optional => {
                    tracing::debug!(template = %name, error = %err, "Skipping missing optional include");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let source = self.resolver.read_source(&name)?;

            let rewritten = SyntaxRewriter::new(&self.registry)
                .rewrite(&source)
                .map_err(|e| WeaveError::Syntax {
                    template: name.clone(),
                    message: e.to_string(),
                })?;

            tracing::trace!(template = %name, path = %path.display(), "Loaded template source");
            // Reverse so dependencies load in source order
            for dependency in rewritten.dependencies.into_iter().rev() {
                pending.push((dependency.name, dependency.optional));
            }
            batch.push((name, rewritten.source));
        }

        if batch.is_empty() {
            return Ok(());
        }

        tracing::debug!(template = %name, count = batch.len(), "Adding templates");
        self.tera
            .add_raw_templates(batch.iter().map(|(n, s)| (n.as_str(), s.as_str())))
            .map_err(|e| WeaveError::Syntax {
                template: name.to_string(),
                message: error_chain(&e),
            })?;
        self.loaded.extend(batch.into_iter().map(|(n, _)| n));

        Ok(())
    }

    /// Render a template by name.
    pub fn render(&mut self, name: &str, context: &Context) -> Result<String> {
        self.load(name)?;
        let context = self.with_globals(context);
        self.tera
            .render(name, &context)
            .map_err(|source| WeaveError::Render {
                template: name.to_string(),
                source,
            })
    }

    /// Render template source given inline.
    pub fn render_str(&mut self, source: &str, context: &Context) -> Result<String> {
        let rewritten = SyntaxRewriter::new(&self.registry)
            .rewrite(source)
            .map_err(|e| WeaveError::Syntax {
                template: INLINE_TEMPLATE.to_string(),
                message: e.to_string(),
            })?;

        for dependency in &rewritten.dependencies {
            match self.load(&dependency.name) {
                Ok(()) => {}
                Err(err) if dependency.optional => {
                    tracing::debug!(template = %dependency.name, error = %err, "Skipping missing optional include");
                }
                Err(err) => return Err(err),
            }
        }

        let context = self.with_globals(context);
        self.tera
            .render_str(&rewritten.source, &context)
            .map_err(|source| WeaveError::Render {
                template: INLINE_TEMPLATE.to_string(),
                source,
            })
    }

    fn with_globals(&self, context: &Context) -> Context {
        let mut merged = Context::new();
        for (name, value) in self.globals() {
            merged.insert(name, &value);
        }
        merged.extend(context.clone());
        merged
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("resolver", &self.resolver)
            .field("registry", &self.registry)
            .field("globals", &self.globals)
            .field("loaded", &self.loaded())
            .finish_non_exhaustive()
    }
}

/// A Tera error with all of its causes, outermost first.
pub fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
