//! Formatting helpers shared by host implementations.
//!
//! These follow the conventions templates written for Drupal 7 expect:
//! `@count` placeholders, "1 byte" / "@count bytes" sizes, interval units
//! down to seconds and HTML-escaped attribute output.

use chrono::DateTime;
use serde_json::{Map, Value};

const KILOBYTE: f64 = 1024.0;

const INTERVAL_UNITS: &[(&str, &str, u64)] = &[
    ("1 year", "@count years", 31_536_000),
    ("1 month", "@count months", 2_592_000),
    ("1 week", "@count weeks", 604_800),
    ("1 day", "@count days", 86_400),
    ("1 hour", "@count hours", 3_600),
    ("1 min", "@count min", 60),
    ("1 sec", "@count sec", 1),
];

/// Escape text for safe inclusion in HTML.
pub fn check_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Render a scalar value the way it prints in a template.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Round to two decimals and drop trailing zeros (`2.50` prints as `2.5`).
fn format_decimal(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Pick the singular or plural form and substitute `@count`.
pub fn format_plural(count: i64, singular: &str, plural: &str) -> String {
    let template = if count == 1 { singular } else { plural };
    template.replace("@count", &count.to_string())
}

/// Human readable byte size: `1 byte`, `512 bytes`, `1.5 KB`, `2 MB`.
pub fn format_size(bytes: u64) -> String {
    if (bytes as f64) < KILOBYTE {
        return format_plural(bytes as i64, "1 byte", "@count bytes");
    }

    let units = ["KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
    let mut size = bytes as f64 / KILOBYTE;
    let mut unit = units[0];
    for next in &units[1..] {
        if (size * 100.0).round() / 100.0 >= KILOBYTE {
            size /= KILOBYTE;
            unit = next;
        } else {
            break;
        }
    }

    format!("{} {}", format_decimal(size), unit)
}

/// Format a number of seconds using at most `granularity` units.
pub fn format_interval(seconds: u64, granularity: usize) -> String {
    let mut remaining = seconds;
    let mut granularity = granularity;
    let mut parts = Vec::new();

    for (singular, plural, unit) in INTERVAL_UNITS {
        if granularity == 0 {
            break;
        }
        if remaining >= *unit {
            parts.push(format_plural((remaining / unit) as i64, singular, plural));
            remaining %= unit;
            granularity -= 1;
        }
    }

    if parts.is_empty() {
        "0 sec".to_string()
    } else {
        parts.join(" ")
    }
}

/// Format a unix timestamp (UTC).
///
/// `kind` is `short`, `medium` or `long`; anything containing `%` is used as
/// a strftime pattern; other values fall back to `medium`.
pub fn format_date(timestamp: i64, kind: &str) -> String {
    let pattern = match kind {
        "short" => "%m/%d/%Y - %H:%M",
        "long" => "%A, %B %-d, %Y - %H:%M",
        custom if custom.contains('%') => custom,
        _ => "%a, %m/%d/%Y - %H:%M",
    };

    match DateTime::from_timestamp(timestamp, 0) {
        Some(date) => date.format(pattern).to_string(),
        None => String::new(),
    }
}

/// Substitute translation placeholders.
///
/// Keys may carry their own marker (`@name`, `%name`, `!name`). Bare keys
/// (as passed from template keyword arguments) substitute all three forms.
/// `@` escapes, `%` escapes and wraps in a placeholder `<em>`, `!` inserts
/// verbatim.
pub fn translate(text: &str, args: &Map<String, Value>) -> String {
    let mut replacements: Vec<(String, String)> = Vec::new();

    for (key, value) in args {
        let raw = value_to_string(value);
        let markers: &[char] = match key.chars().next() {
            Some(m @ ('@' | '%' | '!')) => {
                replacements.push((key.clone(), placeholder(m, &raw)));
                continue;
            }
            _ => &['@', '%', '!'],
        };
        for marker in markers {
            replacements.push((format!("{}{}", marker, key), placeholder(*marker, &raw)));
        }
    }

    // Longest keys first so `@count` does not clobber `@counter`
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = text.to_string();
    for (key, value) in replacements {
        out = out.replace(&key, &value);
    }
    out
}

fn placeholder(marker: char, raw: &str) -> String {
    match marker {
        '@' => check_plain(raw),
        '%' => format!("<em class=\"placeholder\">{}</em>", check_plain(raw)),
        _ => raw.to_string(),
    }
}

/// Render an attribute map as ` key="value"` pairs.
///
/// Array values are joined with spaces; everything is HTML-escaped.
pub fn attributes(attrs: &Map<String, Value>) -> String {
    attrs
        .iter()
        .map(|(name, value)| {
            let data = match value {
                Value::Array(items) => items
                    .iter()
                    .map(value_to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
                other => value_to_string(other),
            };
            format!(" {}=\"{}\"", name, check_plain(&data))
        })
        .collect()
}

/// Percent-encode a query component.
pub fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

/// Keys of a render array that are children (not `#properties`), ordered
/// by `#weight` with ties kept in insertion order.
pub fn element_children(element: &Map<String, Value>) -> Vec<&str> {
    let mut children: Vec<(usize, f64, &str)> = element
        .iter()
        .filter(|(key, _)| !key.starts_with('#'))
        .enumerate()
        .map(|(position, (key, value))| {
            let weight = value
                .get("#weight")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            (position, weight, key.as_str())
        })
        .collect();

    children.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    children.into_iter().map(|(_, _, key)| key).collect()
}

/// Render a render array to markup.
///
/// Scalars print as-is, `#markup` prints before children, elements with
/// `#access: false` or `#printed: true` render nothing.
pub fn render_element(element: &Value) -> String {
    match element {
        Value::Array(items) => items.iter().map(render_element).collect(),
        Value::Object(map) => {
            if map.get("#access") == Some(&Value::Bool(false))
                || map.get("#printed") == Some(&Value::Bool(true))
            {
                return String::new();
            }

            let mut out = map
                .get("#markup")
                .or_else(|| map.get("#children"))
                .map(value_to_string)
                .unwrap_or_default();
            for key in element_children(map) {
                out.push_str(&render_element(&map[key]));
            }
            out
        }
        scalar => value_to_string(scalar),
    }
}
