//! themeweave - Theme-aware template loading and host extensions for Tera.
//!
//! themeweave finds template files from logical names (with theme
//! fallbacks and a resolution cache) and registers a host application's
//! filters, functions and tests with the Tera template engine.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, layering and assembly
//! - [`engine`] - Tera engine wired to the resolver and registry
//! - [`error`] - Error types and result aliases
//! - [`extension`] - Filters, functions, tests, operators, tags and globals
//! - [`host`] - Services the host application provides to templates
//! - [`loader`] - Template name resolution
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use std::fs;
//! use std::sync::Arc;
//! use tempfile::TempDir;
//! use themeweave::engine::TemplateEngine;
//! use themeweave::extension::ExtensionRegistry;
//! use themeweave::host::NullHost;
//! use themeweave::loader::{ActiveTheme, DiscoveredTemplates, FilesystemLoader, TemplateNameResolver};
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("hello.html"), "Hello {{ name | ucfirst }}!").unwrap();
//!
//! let resolver = TemplateNameResolver::new(
//!     FilesystemLoader::with_paths([temp.path()]),
//!     DiscoveredTemplates::new(),
//!     Some(ActiveTheme::new("mytheme")),
//! );
//! let registry = ExtensionRegistry::new(Arc::new(NullHost), Some("mytheme".to_string()));
//! let mut engine = TemplateEngine::new(resolver, registry);
//!
//! let mut context = tera::Context::new();
//! context.insert("name", "world");
//! assert_eq!(engine.render("hello.html", &context).unwrap(), "Hello World!");
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod extension;
pub mod host;
pub mod loader;
pub mod ui;

pub use error::{Result, WeaveError};
