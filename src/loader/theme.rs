//! Active theme and theme-qualified template names.
//!
//! A theme-qualified name is `<theme>::<name>`, e.g. `mytheme::page.html`.

use std::fmt;

/// Separator between a theme identifier and the template name.
pub const THEME_SEPARATOR: &str = "::";

/// The currently active presentation theme.
///
/// Injected into the resolver at construction rather than read from
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveTheme(String);

impl ActiveTheme {
    /// Create an active theme from its machine name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The theme's machine name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Qualify `name` with this theme.
    pub fn qualify(&self, name: &str) -> String {
        format!("{}{}{}", self.0, THEME_SEPARATOR, name)
    }

    /// Strip this theme's prefix from `name`.
    ///
    /// The theme part is compared ASCII case-insensitively; the remainder
    /// keeps its original case. Returns `None` when `name` is not qualified
    /// with this theme.
    pub fn strip_prefix<'a>(&self, name: &'a str) -> Option<&'a str> {
        let theme = name.get(..self.0.len())?;
        if !theme.eq_ignore_ascii_case(&self.0) {
            return None;
        }
        name[self.0.len()..].strip_prefix(THEME_SEPARATOR)
    }
}

impl fmt::Display for ActiveTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
