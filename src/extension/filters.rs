//! Built-in filters.
//!
//! Every filter receives the piped value and Tera's keyword arguments, e.g.
//! `{{ body | truncate(length=120, words=true) }}`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde_json::Map;
use tera::{Error, Result, Value};

use super::args::{bool_arg, is_truthy, opt_str, req_str, to_timestamp, usize_arg};
use super::ExtensionContext;
use crate::host::format::{self, value_to_string};
use crate::host::UrlOptions;

static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*)\b.+").expect("valid word boundary regex"));

/// `size`: byte count to a human readable size.
pub fn size(ctx: &ExtensionContext, value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let bytes = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|b| *b >= 0.0)
    .ok_or_else(|| Error::msg(format!("`size` expects a byte count, got {}", value)))?;

    Ok(Value::String(ctx.host.format_size(bytes as u64)))
}

/// `plural(singular, plural)`: pick a form for the piped count.
pub fn plural(ctx: &ExtensionContext, value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let count = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::msg(format!("`plural` expects a count, got {}", value)))?;

    let singular = req_str(args, "singular", "plural")?;
    let plural = req_str(args, "plural", "plural")?;
    Ok(Value::String(ctx.host.format_plural(count, &singular, &plural)))
}

/// `t`: translate, using keyword arguments as placeholders.
pub fn t(ctx: &ExtensionContext, value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let placeholders: Map<String, Value> = args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    Ok(Value::String(
        ctx.host.translate(&value_to_string(value), &placeholders),
    ))
}

/// `attributes`: object to ` key="value"` HTML attributes.
pub fn attributes(
    _ctx: &ExtensionContext,
    value: &Value,
    _args: &HashMap<String, Value>,
) -> Result<Value> {
    Ok(Value::String(match value {
        Value::Object(attrs) => format::attributes(attrs),
        _ => String::new(),
    }))
}

/// `check_plain`: escape HTML special characters.
pub fn check_plain(
    _ctx: &ExtensionContext,
    value: &Value,
    _args: &HashMap<String, Value>,
) -> Result<Value> {
    Ok(Value::String(format::check_plain(&value_to_string(value))))
}

/// `ucfirst`: uppercase the first character.
pub fn ucfirst(_ctx: &ExtensionContext, value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let text = value_to_string(value);
    let mut chars = text.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(out))
}

/// `url(options)`: link to a node id or path.
pub fn url(ctx: &ExtensionContext, value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(url_for(ctx, value, args.get("options"))?))
}

/// Build a URL the way both the `url` filter and function do.
///
/// Numbers map to `node/<n>`; query and fragment embedded in a path are
/// used unless `options` sets them explicitly. The result is HTML-escaped.
pub(crate) fn url_for(ctx: &ExtensionContext, item: &Value, options: Option<&Value>) -> Result<String> {
    let mut options: UrlOptions = match options {
        None | Some(Value::Null) => UrlOptions::default(),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| Error::msg(format!("Invalid url options: {}", e)))?,
    };

    let path = match item {
        Value::Number(n) => format!("node/{}", n),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            format!("node/{}", s)
        }
        other => {
            let raw = value_to_string(other);
            let (rest, fragment) = match raw.split_once('#') {
                Some((rest, fragment)) => (rest.to_string(), Some(fragment.to_string())),
                None => (raw.clone(), None),
            };
            let (path, query) = match rest.split_once('?') {
                Some((path, query)) => (path.to_string(), Some(query.to_string())),
                None => (rest, None),
            };
            if options.query.is_none() {
                options.query = query.map(Value::String);
            }
            if options.fragment.is_none() {
                options.fragment = fragment;
            }
            path
        }
    };

    Ok(format::check_plain(&ctx.host.url(&path, &options)))
}

/// `strreplace(search, replace)`: case-insensitive literal replacement.
pub fn strreplace(
    ctx: &ExtensionContext,
    value: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value> {
    let search = req_str(args, "search", "strreplace")?;
    let replace = opt_str(args, "replace").unwrap_or_default();
    let haystack = ctx.host.render(value);

    if search.is_empty() {
        return Ok(Value::String(haystack));
    }

    let pattern = Regex::new(&format!("(?i){}", regex::escape(&search)))
        .map_err(|e| Error::msg(format!("Invalid search string: {}", e)))?;
    Ok(Value::String(
        pattern.replace_all(&haystack, NoExpand(&replace)).into_owned(),
    ))
}

/// `defaults(default, ...)`: first truthy of the value and its arguments.
///
/// `default` is checked first, remaining arguments in name order.
pub fn defaults(
    _ctx: &ExtensionContext,
    value: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value> {
    if is_truthy(value) {
        return Ok(value.clone());
    }

    let mut names: Vec<&String> = args.keys().filter(|k| k.as_str() != "default").collect();
    names.sort();

    let candidates = args.get("default").into_iter().chain(names.into_iter().map(|k| &args[k]));
    for candidate in candidates {
        if is_truthy(candidate) {
            return Ok(candidate.clone());
        }
    }

    Ok(Value::Null)
}

/// `wrap(tag)`: wrap non-empty content in an HTML element.
pub fn wrap(ctx: &ExtensionContext, value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let tag = req_str(args, "tag", "wrap")?;
    let content = ctx.host.render(value);
    let trimmed = content.trim();

    Ok(Value::String(if trimmed.is_empty() {
        String::new()
    } else {
        format!("<{tag}>{trimmed}</{tag}>")
    }))
}

/// `interval(granularity=2, ago=true)`: time elapsed since a date.
pub fn interval(
    ctx: &ExtensionContext,
    value: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value> {
    let granularity = usize_arg(args, "granularity", 2, "interval")?;
    let display_ago = bool_arg(args, "ago", true);
    let then = to_timestamp(value)?;
    let elapsed = chrono::Utc::now().timestamp() - then;

    let text = ctx.host.format_interval(elapsed.unsigned_abs(), granularity);
    if elapsed > 0 && display_ago {
        let mut placeholders = Map::new();
        placeholders.insert("!time".to_string(), Value::String(text));
        return Ok(Value::String(ctx.host.translate("!time ago", &placeholders)));
    }

    Ok(Value::String(text))
}

/// `format_date(type="medium")`: format a timestamp or date string.
pub fn format_date(
    ctx: &ExtensionContext,
    value: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value> {
    let kind = opt_str(args, "type").unwrap_or_else(|| "medium".to_string());
    let timestamp = to_timestamp(value)?;
    Ok(Value::String(ctx.host.format_date(timestamp, &kind)))
}

/// `truncate(length=300, ellipsis=true, words=true)`.
pub fn truncate(
    ctx: &ExtensionContext,
    value: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value> {
    let length = usize_arg(args, "length", 300, "truncate")?;
    let ellipsis = bool_arg(args, "ellipsis", true);
    let words = bool_arg(args, "words", true);

    let text = ctx.host.render(value);
    if text.chars().count() <= length {
        return Ok(Value::String(text));
    }

    let mut cut: String = text.chars().take(length).collect();
    if words {
        if let Some(prefix) = WORD_BOUNDARY.captures(&cut).and_then(|c| c.get(1)) {
            cut = prefix.as_str().to_string();
        }
    }

    let mut cut = strip_markup_fragment(&cut).trim_end().to_string();
    if ellipsis {
        cut.push(' ');
        cut.push_str(&ctx.host.translate("...", &Map::new()));
    }

    Ok(Value::String(cut))
}

/// Drop a trailing, unterminated `<tag` or `&entity` left by truncation.
fn strip_markup_fragment(text: &str) -> &str {
    for (i, c) in text.char_indices() {
        let terminator = match c {
            '<' => '>',
            '&' => ';',
            _ => continue,
        };
        // At least one character has to sit between the opener and terminator
        let after = &text[i + c.len_utf8()..];
        let closed = after
            .char_indices()
            .any(|(j, t)| j > 0 && t == terminator);
        if !closed {
            return &text[..i];
        }
    }
    text
}

/// `striphashes`: remove `#property` keys from an object.
pub fn striphashes(
    _ctx: &ExtensionContext,
    value: &Value,
    _args: &HashMap<String, Value>,
) -> Result<Value> {
    Ok(match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !k.starts_with('#'))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    })
}

/// `without(keys)`: remove keys from an object.
pub fn without(
    _ctx: &ExtensionContext,
    value: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value> {
    let keys: Vec<String> = match args.get("keys") {
        Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![value_to_string(single)],
    };

    Ok(match value {
        Value::Object(map) => {
            let mut filtered = map.clone();
            for key in &keys {
                filtered.remove(key);
            }
            Value::Object(filtered)
        }
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostConfig, NullHost, StaticHost};
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> ExtensionContext {
        ExtensionContext::new(Arc::new(NullHost), Some("mytheme".to_string()))
    }

    fn args(value: Value) -> HashMap<String, Value> {
        value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn no_args() -> HashMap<String, Value> {
        HashMap::new()
    }

    #[test]
    fn size_formats_bytes() {
        assert_eq!(size(&ctx(), &json!(2048), &no_args()).unwrap(), json!("2 KB"));
        assert_eq!(size(&ctx(), &json!("1"), &no_args()).unwrap(), json!("1 byte"));
        assert!(size(&ctx(), &json!("big"), &no_args()).is_err());
    }

    #[test]
    fn plural_requires_forms() {
        let a = args(json!({"singular": "1 comment", "plural": "@count comments"}));
        assert_eq!(plural(&ctx(), &json!(4), &a).unwrap(), json!("4 comments"));
        assert_eq!(plural(&ctx(), &json!(1), &a).unwrap(), json!("1 comment"));
        assert!(plural(&ctx(), &json!(1), &no_args()).is_err());
    }

    #[test]
    fn t_substitutes_keyword_placeholders() {
        let a = args(json!({"name": "Ann"}));
        assert_eq!(t(&ctx(), &json!("Hi @name"), &a).unwrap(), json!("Hi Ann"));
    }

    #[test]
    fn attributes_renders_objects_only() {
        assert_eq!(
            attributes(&ctx(), &json!({"id": "main"}), &no_args()).unwrap(),
            json!(" id=\"main\"")
        );
        assert_eq!(attributes(&ctx(), &json!("x"), &no_args()).unwrap(), json!(""));
    }

    #[test]
    fn ucfirst_uppercases_first_char() {
        assert_eq!(ucfirst(&ctx(), &json!("élan vital"), &no_args()).unwrap(), json!("Élan vital"));
        assert_eq!(ucfirst(&ctx(), &json!(""), &no_args()).unwrap(), json!(""));
    }

    #[test]
    fn url_maps_numbers_to_nodes() {
        assert_eq!(url(&ctx(), &json!(12), &no_args()).unwrap(), json!("/node/12"));
        assert_eq!(url(&ctx(), &json!("12"), &no_args()).unwrap(), json!("/node/12"));
    }

    #[test]
    fn url_keeps_embedded_query_and_fragment() {
        assert_eq!(
            url(&ctx(), &json!("search?q=rust&page=2#results"), &no_args()).unwrap(),
            json!("/search?q=rust&amp;page=2#results")
        );
    }

    #[test]
    fn url_options_override_embedded_parts() {
        let host = StaticHost::new(
            HostConfig {
                base_url: "https://example.com".to_string(),
                ..Default::default()
            },
            None,
        );
        let ctx = ExtensionContext::new(Arc::new(host), None);
        let a = args(json!({"options": {"absolute": true, "fragment": "top"}}));
        assert_eq!(
            url(&ctx, &json!("about#bottom"), &a).unwrap(),
            json!("https://example.com/about#top")
        );
    }

    #[test]
    fn strreplace_is_case_insensitive_and_literal() {
        let a = args(json!({"search": "WORLD", "replace": "$1 there"}));
        assert_eq!(
            strreplace(&ctx(), &json!("hello world, World!"), &a).unwrap(),
            json!("hello $1 there, $1 there!")
        );
    }

    #[test]
    fn strreplace_renders_render_arrays() {
        let a = args(json!({"search": "a", "replace": "o"}));
        assert_eq!(
            strreplace(&ctx(), &json!({"#markup": "cat"}), &a).unwrap(),
            json!("cot")
        );
    }

    #[test]
    fn defaults_returns_first_truthy() {
        assert_eq!(
            defaults(&ctx(), &json!("set"), &args(json!({"default": "x"}))).unwrap(),
            json!("set")
        );
        assert_eq!(
            defaults(&ctx(), &json!(""), &args(json!({"default": "x"}))).unwrap(),
            json!("x")
        );
        assert_eq!(
            defaults(&ctx(), &json!(null), &args(json!({"default": "", "b": 0, "c": "c"}))).unwrap(),
            json!("c")
        );
        assert_eq!(defaults(&ctx(), &json!(0), &no_args()).unwrap(), Value::Null);
    }

    #[test]
    fn wrap_skips_empty_content() {
        let a = args(json!({"tag": "h2"}));
        assert_eq!(wrap(&ctx(), &json!("  Title "), &a).unwrap(), json!("<h2>Title</h2>"));
        assert_eq!(wrap(&ctx(), &json!("   "), &a).unwrap(), json!(""));
        assert_eq!(wrap(&ctx(), &json!(null), &a).unwrap(), json!(""));
    }

    #[test]
    fn interval_since_past_date() {
        let then = chrono::Utc::now().timestamp() - 3 * 86_400 - 60;
        let out = interval(&ctx(), &json!(then), &args(json!({"granularity": 1}))).unwrap();
        assert_eq!(out, json!("3 days ago"));

        let out = interval(&ctx(), &json!(then), &args(json!({"granularity": 1, "ago": false}))).unwrap();
        assert_eq!(out, json!("3 days"));
    }

    #[test]
    fn interval_for_future_date_has_no_ago() {
        let then = chrono::Utc::now().timestamp() + 2 * 3_600 + 1_800;
        let out = interval(&ctx(), &json!(then), &args(json!({"granularity": 1}))).unwrap();
        assert_eq!(out, json!("2 hours"));
    }

    #[test]
    fn format_date_defaults_to_medium() {
        assert_eq!(
            format_date(&ctx(), &json!("2009-02-13 23:31:30"), &no_args()).unwrap(),
            json!("Fri, 02/13/2009 - 23:31")
        );
        assert_eq!(
            format_date(&ctx(), &json!(1_234_567_890), &args(json!({"type": "short"}))).unwrap(),
            json!("02/13/2009 - 23:31")
        );
    }

    #[test]
    fn truncate_short_text_is_unchanged() {
        assert_eq!(
            truncate(&ctx(), &json!("short"), &args(json!({"length": 10}))).unwrap(),
            json!("short")
        );
    }

    #[test]
    fn truncate_backs_off_to_word_boundary() {
        let out = truncate(
            &ctx(),
            &json!("The quick brown fox jumps"),
            &args(json!({"length": 12})),
        )
        .unwrap();
        assert_eq!(out, json!("The quick ..."));
    }

    #[test]
    fn truncate_without_words_or_ellipsis() {
        let out = truncate(
            &ctx(),
            &json!("The quick brown fox"),
            &args(json!({"length": 12, "words": false, "ellipsis": false})),
        )
        .unwrap();
        assert_eq!(out, json!("The quick br"));
    }

    #[test]
    fn truncate_strips_broken_markup() {
        let out = truncate(
            &ctx(),
            &json!("Fish &amp; chips <strong>now</strong>"),
            &args(json!({"length": 20, "words": false, "ellipsis": false})),
        )
        .unwrap();
        assert_eq!(out, json!("Fish &amp; chips"));

        let out = truncate(
            &ctx(),
            &json!("Fish &amp; chips"),
            &args(json!({"length": 8, "words": false, "ellipsis": false})),
        )
        .unwrap();
        assert_eq!(out, json!("Fish"));
    }

    #[test]
    fn striphashes_and_without() {
        let element = json!({"#type": "link", "title": "x", "links": [], "language": "en"});
        assert_eq!(
            striphashes(&ctx(), &element, &no_args()).unwrap(),
            json!({"title": "x", "links": [], "language": "en"})
        );
        assert_eq!(
            without(&ctx(), &element, &args(json!({"keys": ["links", "language"]}))).unwrap(),
            json!({"#type": "link", "title": "x"})
        );
        assert_eq!(
            without(&ctx(), &element, &args(json!({"keys": "title"}))).unwrap(),
            json!({"#type": "link", "links": [], "language": "en"})
        );
        assert_eq!(without(&ctx(), &json!("s"), &no_args()).unwrap(), json!("s"));
    }
}
