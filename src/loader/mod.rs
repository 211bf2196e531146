//! Template name resolution for themeweave.
//!
//! This module turns the logical names written inside templates
//! (`"partials/header.html"`, `"mytheme::page.html"`, `"@admin/form.html"`)
//! into readable files on disk:
//! - [`FilesystemLoader`] searches ordered root directories (per namespace)
//! - [`DiscoveredTemplates`] is the index built by scanning themes and modules
//! - [`TemplateNameResolver`] layers fallbacks and a resolution cache on top
//!
//! # Resolution Order
//!
//! Names are resolved in this order (first match wins):
//! 1. Search roots of the filesystem loader
//! 2. Resolution cache
//! 3. The name itself as a readable path
//! 4. Discovery index
//! 5. Discovery index with the active theme prefix stripped
//!
//! # Example
//!
//! ```
//! use themeweave::loader::{ActiveTheme, DiscoveredTemplates, FilesystemLoader, TemplateNameResolver};
//!
//! let mut resolver = TemplateNameResolver::new(
//!     FilesystemLoader::new(),
//!     DiscoveredTemplates::new(),
//!     Some(ActiveTheme::new("mytheme")),
//! );
//!
//! // Nothing is registered, so every strategy comes up empty
//! assert!(resolver.resolve("mytheme::missing.html").is_err());
//! ```

pub mod discovery;
pub mod filesystem;
pub mod fs;
pub mod resolver;
pub mod theme;

// Re-exports
pub use discovery::{DiscoveredTemplates, TemplateIndex, DEFAULT_TEMPLATE_EXTENSIONS};
pub use filesystem::{
    validate_name, FilesystemLoader, LoaderError, TemplateLocator, MAIN_NAMESPACE,
};
pub use fs::{FileSystem, OsFileSystem};
pub use resolver::{ResolutionSource, TemplateNameResolver};
pub use theme::{ActiveTheme, THEME_SEPARATOR};
