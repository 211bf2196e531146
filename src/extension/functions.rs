//! Built-in functions.
//!
//! Tera passes function arguments by keyword only:
//! `{{ viewblock(delta="main-menu", module="system") }}`.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde_json::{Map, Number};
use tera::{Error, Result, Value};

use super::args::{bool_arg, loose_eq, opt_str, req_str};
use super::filters::url_for;
use super::ExtensionContext;
use crate::host::format::{self, check_plain, element_children, value_to_string};
use crate::host::UrlOptions;

/// `theme_get_setting(name, theme=None)`
pub fn theme_get_setting(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let name = req_str(args, "name", "theme_get_setting")?;
    let theme = opt_str(args, "theme");
    Ok(ctx
        .host
        .theme_setting(&name, theme.as_deref())
        .unwrap_or(Value::Null))
}

/// `module_exists(module)`
pub fn module_exists(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let module = req_str(args, "module", "module_exists")?;
    Ok(Value::Bool(ctx.host.module_exists(&module)))
}

/// `classname(value)`: type name of a value.
pub fn classname(_ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let name = match args.get("value") {
        None | Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(n)) if n.is_f64() => "float",
        Some(Value::Number(_)) => "integer",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    };
    Ok(Value::String(name.to_string()))
}

/// `variable_get(name, default=None)`
pub fn variable_get(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let name = req_str(args, "name", "variable_get")?;
    Ok(ctx
        .host
        .variable(&name)
        .or_else(|| args.get("default").cloned())
        .unwrap_or(Value::Null))
}

/// `array_search(needle, haystack, strict=false)`: key of the first match
/// or `false`.
pub fn array_search(_ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let null = Value::Null;
    let needle = args.get("needle").unwrap_or(&null);
    let strict = bool_arg(args, "strict", false);
    let matches = |candidate: &Value| {
        if strict {
            candidate == needle
        } else {
            loose_eq(candidate, needle)
        }
    };

    let found = match args.get("haystack") {
        Some(Value::Array(items)) => items
            .iter()
            .position(|v| matches(v))
            .map(|i| Value::Number(Number::from(i))),
        Some(Value::Object(map)) => map
            .iter()
            .find(|(_, v)| matches(v))
            .map(|(k, _)| Value::String(k.clone())),
        Some(other) => {
            return Err(Error::msg(format!(
                "`array_search` expects `haystack` to be a collection, got {}",
                other
            )))
        }
        None => return Err(Error::msg("`array_search` requires a `haystack` argument")),
    };

    Ok(found.unwrap_or(Value::Bool(false)))
}

/// `current_path()`
pub fn current_path(ctx: &ExtensionContext, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(ctx.host.current_path()))
}

/// `dump(var, mode="print_r")`: debug output in a `<pre>` block.
///
/// Modes are `print_r` (alias `p`) and `var_dump` (alias `v`).
pub fn dump(_ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let null = Value::Null;
    let var = args.get("var").unwrap_or(&null);
    let mode = opt_str(args, "mode").unwrap_or_else(|| "print_r".to_string());

    let mut out = String::new();
    match mode.as_str() {
        "print_r" | "p" => print_r(&mut out, var, 0),
        "var_dump" | "v" => var_dump(&mut out, var, 0),
        other => return Err(Error::msg(format!("Invalid mode '{}' for dump()", other))),
    }

    Ok(Value::String(format!("<pre>{}</pre>", check_plain(&out))))
}

fn print_r(out: &mut String, value: &Value, depth: usize) {
    let entries: Vec<(String, &Value)> = match value {
        Value::Array(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        scalar => {
            out.push_str(&value_to_string(scalar));
            return;
        }
    };

    let pad = " ".repeat(depth * 8);
    let _ = writeln!(out, "Array\n{}(", pad);
    for (key, child) in entries {
        let _ = write!(out, "{}    [{}] => ", pad, key);
        print_r(out, child, depth + 1);
        out.push('\n');
    }
    let _ = writeln!(out, "{})", pad);
}

fn var_dump(out: &mut String, value: &Value, depth: usize) {
    let pad = "  ".repeat(depth);
    match value {
        Value::Null => {
            let _ = writeln!(out, "{}NULL", pad);
        }
        Value::Bool(b) => {
            let _ = writeln!(out, "{}bool({})", pad, b);
        }
        Value::Number(n) if n.is_f64() => {
            let _ = writeln!(out, "{}float({})", pad, n);
        }
        Value::Number(n) => {
            let _ = writeln!(out, "{}int({})", pad, n);
        }
        Value::String(s) => {
            let _ = writeln!(out, "{}string({}) \"{}\"", pad, s.len(), s);
        }
        Value::Array(items) => {
            let _ = writeln!(out, "{}array({}) {{", pad, items.len());
            for (i, item) in items.iter().enumerate() {
                let _ = writeln!(out, "{}  [{}]=>", pad, i);
                var_dump(out, item, depth + 1);
            }
            let _ = writeln!(out, "{}}}", pad);
        }
        Value::Object(map) => {
            let _ = writeln!(out, "{}array({}) {{", pad, map.len());
            for (key, item) in map {
                let _ = writeln!(out, "{}  [\"{}\"]=>", pad, key);
                var_dump(out, item, depth + 1);
            }
            let _ = writeln!(out, "{}}}", pad);
        }
    }
}

/// `render(var)`: render arrays to markup, scalars as-is.
pub fn render(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    Ok(match args.get("var") {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => scalar.clone(),
        Some(element) => Value::String(ctx.host.render(element)),
    })
}

/// `hide(var)`: kept for old templates, has no effect.
pub fn hide(_ctx: &ExtensionContext, _args: &HashMap<String, Value>) -> Result<Value> {
    tracing::warn!("hide() has no effect, use the `without` filter instead");
    Ok(Value::String(String::new()))
}

/// `url(path, options=None)`
pub fn url(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let path = args
        .get("path")
        .ok_or_else(|| Error::msg("`url` requires a `path` argument"))?;
    Ok(Value::String(url_for(ctx, path, args.get("options"))?))
}

/// Lowercase, everything outside `[a-z0-9]` to `_`, runs of `_` collapsed.
pub fn to_machine_name(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// `machine_name(string)`
pub fn machine_name(_ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let text = req_str(args, "string", "machine_name")?;
    Ok(Value::String(to_machine_name(&text)))
}

/// `viewblock(delta, module=None, render=true)`: a block's markup, its
/// render array, or `false` when there is no such block.
pub fn viewblock(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let delta = req_str(args, "delta", "viewblock")?;
    let module = opt_str(args, "module");
    let render = bool_arg(args, "render", true);

    let Some(block) = ctx
        .host
        .block(&delta, module.as_deref(), ctx.theme.as_deref())
    else {
        tracing::debug!(delta = %delta, "Block not found");
        return Ok(Value::Bool(false));
    };

    Ok(if render {
        Value::String(ctx.host.render(&block))
    } else {
        block
    })
}

/// A file path argument, either a string or an object with `filepath`.
fn file_path_arg(args: &HashMap<String, Value>, name: &str, callee: &str) -> Result<String> {
    match args.get(name) {
        Some(Value::Object(file)) => file
            .get("filepath")
            .map(value_to_string)
            .ok_or_else(|| Error::msg(format!("`{}` got a file without `filepath`", callee))),
        _ => req_str(args, name, callee),
    }
}

/// `image_url(path, preset=None)`
pub fn image_url(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let path = file_path_arg(args, "path", "image_url")?;
    Ok(Value::String(match opt_str(args, "preset") {
        Some(preset) if !preset.is_empty() => ctx.host.image_style_url(&preset, &path),
        _ => path,
    }))
}

/// `file_url(uri)`: stream wrapper URIs become file URLs, `file/<id>`
/// paths go through their alias, anything else passes through.
pub fn file_url(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let uri = match args.get("uri") {
        Some(Value::String(uri)) => uri.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Ok(other.clone()),
        None => return Err(Error::msg("`file_url` requires a `uri` argument")),
    };

    Ok(Value::String(if ctx.host.is_valid_file_uri(&uri) {
        ctx.host.file_create_url(&uri)
    } else if uri.contains("file/") {
        ctx.host
            .url(&ctx.host.path_alias(&uri), &UrlOptions::default())
    } else {
        uri
    }))
}

/// `image_size(path, preset, html=true)`: width and height of a styled
/// image as attributes or as an object.
pub fn image_size(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let path = file_path_arg(args, "path", "image_size")?;
    let preset = req_str(args, "preset", "image_size")?;
    let as_html = bool_arg(args, "html", true);

    let info = ctx.host.image_info(&ctx.host.image_style_url(&preset, &path));
    let (width, height) = info
        .map(|i| (i.width.to_string(), i.height.to_string()))
        .unwrap_or_default();

    let mut attrs = Map::new();
    attrs.insert("width".to_string(), Value::String(width));
    attrs.insert("height".to_string(), Value::String(height));

    Ok(if as_html {
        Value::String(format::attributes(&attrs))
    } else {
        Value::Object(attrs)
    })
}

/// `get_form_errors()`: errors keyed as form element names, so
/// `submitted][a][b` becomes `submitted[a][b]`.
pub fn get_form_errors(ctx: &ExtensionContext, _args: &HashMap<String, Value>) -> Result<Value> {
    let errors = ctx
        .host
        .form_errors()
        .into_iter()
        .map(|(key, error)| {
            let renamed = key.replace("submitted][", "submitted[");
            if renamed != key {
                (format!("{}]", renamed), error)
            } else {
                (key, error)
            }
        })
        .collect();
    Ok(Value::Object(errors))
}

/// `children(element)`: child elements ordered by `#weight`.
pub fn children(_ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::Array(match args.get("element") {
        Some(Value::Object(element)) => element_children(element)
            .into_iter()
            .map(|key| element[key].clone())
            .collect(),
        _ => Vec::new(),
    }))
}

/// `theme_path(theme=None, absolute=false)`: path of a theme with a
/// trailing slash.
pub fn theme_path(ctx: &ExtensionContext, args: &HashMap<String, Value>) -> Result<Value> {
    let theme = opt_str(args, "theme");
    let path = ctx.host.theme_path(theme.as_deref().or(ctx.theme.as_deref()));

    Ok(Value::String(if bool_arg(args, "absolute", false) {
        format!("{}/{}/", ctx.host.base_url(), path)
    } else {
        format!("{}/", path)
    }))
}
