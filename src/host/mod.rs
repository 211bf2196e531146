//! Host application services called from templates.
//!
//! Filters and functions registered by the [`extension`](crate::extension)
//! module never reach into the host directly; they go through
//! [`HostServices`]. Most methods have defaults so a host only overrides
//! what it actually provides.
//!
//! - [`format`] - Formatting helpers used by the defaults
//! - [`StaticHost`] - A host configured entirely from YAML

pub mod format;
pub mod static_host;

pub use static_host::{BlockConfig, HostConfig, StaticHost};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options accepted by [`HostServices::url`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlOptions {
    /// Query string, either pre-encoded text or a key/value object.
    pub query: Option<Value>,
    /// Fragment without the leading `#`.
    pub fragment: Option<String>,
    /// Prefix with the base URL.
    pub absolute: bool,
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// Services the host application exposes to templates.
///
/// Implementations must be `Send + Sync` because the template engine stores
/// registered callables behind shared references.
pub trait HostServices: Send + Sync {
    /// Base path of the site, always ending in `/`.
    fn base_path(&self) -> String {
        "/".to_string()
    }

    /// Scheme and host of the site without trailing slash.
    fn base_url(&self) -> String {
        String::new()
    }

    /// Directory below the base URL that holds public files.
    fn files_path(&self) -> String {
        "sites/default/files".to_string()
    }

    /// Render a render array to markup.
    fn render(&self, element: &Value) -> String {
        format::render_element(element)
    }

    /// Build a URL for an internal path or pass an external URL through.
    fn url(&self, path: &str, options: &UrlOptions) -> String {
        let mut url = if path.contains("://") {
            path.to_string()
        } else {
            let path = match path.trim_start_matches('/') {
                "<front>" => "",
                p => p,
            };
            let prefix = if options.absolute {
                self.base_url()
            } else {
                String::new()
            };
            format!("{}{}{}", prefix, self.base_path(), path)
        };

        match &options.query {
            Some(Value::Object(pairs)) if !pairs.is_empty() => {
                let query = pairs
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}={}",
                            format::encode_component(k),
                            format::encode_component(&format::value_to_string(v))
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("&");
                url.push('?');
                url.push_str(&query);
            }
            Some(Value::String(query)) if !query.is_empty() => {
                url.push('?');
                url.push_str(query);
            }
            _ => {}
        }

        if let Some(fragment) = options.fragment.as_deref().filter(|f| !f.is_empty()) {
            url.push('#');
            url.push_str(fragment);
        }

        url
    }

    /// Translate a string and substitute its placeholders.
    fn translate(&self, text: &str, args: &Map<String, Value>) -> String {
        format::translate(text, args)
    }

    /// Human readable byte size.
    fn format_size(&self, bytes: u64) -> String {
        format::format_size(bytes)
    }

    /// Singular or plural form for `count`.
    fn format_plural(&self, count: i64, singular: &str, plural: &str) -> String {
        format::format_plural(count, singular, plural)
    }

    /// Human readable duration.
    fn format_interval(&self, seconds: u64, granularity: usize) -> String {
        format::format_interval(seconds, granularity)
    }

    /// Format a unix timestamp with a named or custom format.
    fn format_date(&self, timestamp: i64, kind: &str) -> String {
        format::format_date(timestamp, kind)
    }

    /// A theme setting, for `theme` or the active theme.
    fn theme_setting(&self, _name: &str, _theme: Option<&str>) -> Option<Value> {
        None
    }

    /// Whether a host module is enabled.
    fn module_exists(&self, _module: &str) -> bool {
        false
    }

    /// A persistent host variable.
    fn variable(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Path of the current request.
    fn current_path(&self) -> String {
        String::new()
    }

    /// Render array of a block by delta.
    ///
    /// With a module the block is looked up by `(module, delta)`, otherwise
    /// by `(theme, delta)`.
    fn block(&self, _delta: &str, _module: Option<&str>, _theme: Option<&str>) -> Option<Value> {
        None
    }

    /// URL of a file after applying an image style.
    fn image_style_url(&self, style: &str, path: &str) -> String {
        let (scheme, target) = path.split_once("://").unwrap_or(("public", path));
        self.file_create_url(&format!("public://styles/{}/{}/{}", style, scheme, target))
    }

    /// Dimensions of the image at `url`.
    fn image_info(&self, _url: &str) -> Option<ImageInfo> {
        None
    }

    /// Whether `uri` uses a known stream wrapper.
    fn is_valid_file_uri(&self, uri: &str) -> bool {
        match uri.split_once("://") {
            Some((scheme, target)) => {
                matches!(scheme, "public" | "private" | "temporary") && !target.is_empty()
            }
            None => false,
        }
    }

    /// Public URL for a file URI.
    fn file_create_url(&self, uri: &str) -> String {
        match uri.split_once("://") {
            Some(("public", target)) => {
                format!("{}/{}/{}", self.base_url(), self.files_path(), target)
            }
            Some(("private", target)) => format!("{}/system/files/{}", self.base_url(), target),
            Some(_) => uri.to_string(),
            None => format!("{}/{}", self.base_url(), uri.trim_start_matches('/')),
        }
    }

    /// Alias for a system path, or the path itself.
    fn path_alias(&self, path: &str) -> String {
        path.to_string()
    }

    /// Validation errors of the form being rendered, keyed by element.
    fn form_errors(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Path of `theme` (or the active theme) relative to the base path.
    fn theme_path(&self, _theme: Option<&str>) -> String {
        String::new()
    }
}

/// Host that only provides the default behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl HostServices for NullHost {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct SiteHost;

    impl HostServices for SiteHost {
        fn base_url(&self) -> String {
            "https://example.com".to_string()
        }
    }

    #[test]
    fn url_prefixes_base_path() {
        let url = NullHost.url("node/1", &UrlOptions::default());
        assert_eq!(url, "/node/1");
    }

    #[test]
    fn url_front_page_is_base_path() {
        assert_eq!(NullHost.url("<front>", &UrlOptions::default()), "/");
    }

    #[test]
    fn url_absolute_uses_base_url() {
        let options = UrlOptions {
            absolute: true,
            ..Default::default()
        };
        assert_eq!(
            SiteHost.url("about", &options),
            "https://example.com/about"
        );
    }

    #[test]
    fn url_appends_query_and_fragment() {
        let options = UrlOptions {
            query: Some(json!({"page": 2, "q": "a b"})),
            fragment: Some("top".to_string()),
            absolute: false,
        };
        assert_eq!(NullHost.url("search", &options), "/search?page=2&q=a%20b#top");
    }

    #[test]
    fn url_keeps_external_urls() {
        assert_eq!(
            NullHost.url("https://rust-lang.org", &UrlOptions::default()),
            "https://rust-lang.org"
        );
    }

    #[test]
    fn file_urls_follow_stream_wrappers() {
        assert_eq!(
            SiteHost.file_create_url("public://images/a.jpg"),
            "https://example.com/sites/default/files/images/a.jpg"
        );
        assert_eq!(
            SiteHost.file_create_url("private://doc.pdf"),
            "https://example.com/system/files/doc.pdf"
        );
        assert_eq!(
            SiteHost.file_create_url("http://cdn.example.com/x.png"),
            "http://cdn.example.com/x.png"
        );
    }

    #[test]
    fn image_style_url_builds_styles_path() {
        assert_eq!(
            SiteHost.image_style_url("thumbnail", "public://images/a.jpg"),
            "https://example.com/sites/default/files/styles/thumbnail/public/images/a.jpg"
        );
        assert_eq!(
            SiteHost.image_style_url("thumbnail", "images/a.jpg"),
            "https://example.com/sites/default/files/styles/thumbnail/public/images/a.jpg"
        );
    }

    #[test]
    fn valid_file_uri_requires_known_scheme() {
        assert!(NullHost.is_valid_file_uri("public://a.jpg"));
        assert!(!NullHost.is_valid_file_uri("public://"));
        assert!(!NullHost.is_valid_file_uri("ftp://a.jpg"));
        assert!(!NullHost.is_valid_file_uri("file/12"));
    }
}
