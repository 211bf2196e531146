//! Source rewriting from the extended template syntax to plain Tera.
//!
//! Registered operator symbols become the Tera keyword of their node
//! (`a && !b` reads as `a and not b`) and registered tags are replaced by
//! the statement their handler returns. String literals, comments and
//! `raw` blocks are copied untouched. While scanning, the rewriter also
//! collects the templates named by `extends`, `include` and `import`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::extension::{ExtensionRegistry, OperatorDescriptor, TagScope};

/// Two-character Tera operators that start with a one-character symbol.
const COMPARISONS: &[&str] = &["!=", "==", "<=", ">="];

static END_RAW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%-?\s*endraw\s*-?%\}").expect("valid endraw regex"));

static STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]*)"|'([^']*)'|`([^`]*)`"#).expect("valid string literal regex")
});

/// A template another template needs loaded before it can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    /// `include ... ignore missing`
    pub optional: bool,
}

/// Output of [`SyntaxRewriter::rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub source: String,
    pub dependencies: Vec<Dependency>,
}

/// A rewrite failure with the 1-based line it happened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Rewrites template source using the operators and tags of a registry.
#[derive(Debug)]
pub struct SyntaxRewriter<'a> {
    registry: &'a ExtensionRegistry,
    operators: Vec<&'a OperatorDescriptor>,
}

impl<'a> SyntaxRewriter<'a> {
    pub fn new(registry: &'a ExtensionRegistry) -> Self {
        let mut operators: Vec<&OperatorDescriptor> = registry.operators().iter().collect();
        // Longest symbol first so `||` wins over a registered `|`
        operators.sort_by(|a, b| b.symbol.len().cmp(&a.symbol.len()));
        Self {
            registry,
            operators,
        }
    }

    pub fn rewrite(&self, source: &str) -> Result<Rewritten, SyntaxError> {
        let mut out = String::with_capacity(source.len());
        let mut dependencies = Vec::new();
        let mut scope = TagScope::new();
        let mut pos = 0;

        while let Some(offset) = source[pos..].find('{') {
            let start = pos + offset;
            let opener = source[start + 1..].chars().next();
            let (opener, closer) = match opener {
                Some('{') => ('{', "}}"),
                Some('%') => ('%', "%}"),
                Some('#') => ('#', "#}"),
                _ => {
                    out.push_str(&source[pos..start + 1]);
                    pos = start + 1;
                    continue;
                }
            };
            out.push_str(&source[pos..start]);

            let body_start = start + 2;
            let body_end = if opener == '#' {
                source[body_start..].find(closer).map(|i| body_start + i)
            } else {
                find_closer(source, body_start, closer)
            }
            .ok_or_else(|| error_at(source, start, format!("unclosed `{{{}`", opener)))?;
            let end = body_end + 2;
            let body = &source[body_start..body_end];

            match opener {
                '#' => out.push_str(&source[start..end]),
                '{' => {
                    out.push_str("{{");
                    out.push_str(&self.rewrite_operators(body));
                    out.push_str("}}");
                }
                _ => {
                    let (keyword, _) = split_keyword(body);
                    if keyword == "raw" {
                        let raw_end = END_RAW
                            .find(&source[end..])
                            .map(|m| end + m.end())
                            .ok_or_else(|| error_at(source, start, "unclosed `raw` block".to_string()))?;
                        out.push_str(&source[start..raw_end]);
                        pos = raw_end;
                        continue;
                    }
                    let statement = self
                        .rewrite_statement(body, &mut scope, &mut dependencies)
                        .map_err(|message| error_at(source, start, message))?;
                    out.push_str(&statement);
                }
            }
            pos = end;
        }
        out.push_str(&source[pos..]);

        if !scope.is_empty() {
            return Err(SyntaxError {
                line: source.lines().count().max(1),
                message: format!("unclosed `{}` block", scope.open_tags().join("`, `")),
            });
        }

        Ok(Rewritten {
            source: out,
            dependencies,
        })
    }

    /// Rewrite the inside of one `{% ... %}`, returning the whole tag.
    fn rewrite_statement(
        &self,
        body: &str,
        scope: &mut TagScope,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<String, String> {
        let (lead, inner, trail) = split_whitespace_control(body);
        let (keyword, args) = split_keyword(inner);
        let args = self.rewrite_operators(args);

        if matches!(keyword, "extends" | "include" | "import") {
            collect_dependencies(keyword, &args, dependencies);
        }

        let Some(handler) = self.registry.tag_for(keyword) else {
            return Ok(format!("{{%{}%}}", self.rewrite_operators(body)));
        };

        let statement = handler.rewrite(keyword, args.trim(), scope)?;
        if statement.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{{%{} {} {}%}}", lead, statement, trail))
    }

    /// Replace operator symbols outside string literals.
    pub fn rewrite_operators(&self, expr: &str) -> String {
        if self.operators.is_empty() {
            return expr.to_string();
        }

        let mut out = String::with_capacity(expr.len() + 8);
        let mut quote: Option<char> = None;
        let mut i = 0;

        while i < expr.len() {
            let rest = &expr[i..];
            let Some(c) = rest.chars().next() else { break };

            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                out.push(c);
                i += c.len_utf8();
                continue;
            }
            if matches!(c, '"' | '\'' | '`') {
                quote = Some(c);
                out.push(c);
                i += 1;
                continue;
            }

            if let Some(op) = self.operator_at(expr, i) {
                if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push_str(op.node.keyword());
                let next = expr[i + op.symbol.len()..].chars().next();
                if next.is_some_and(|n| !n.is_whitespace()) {
                    out.push(' ');
                }
                i += op.symbol.len();
                continue;
            }

            out.push(c);
            i += c.len_utf8();
        }

        out
    }

    fn operator_at(&self, expr: &str, i: usize) -> Option<&'a OperatorDescriptor> {
        let rest = &expr[i..];
        self.operators.iter().copied().find(|op| {
            if op.symbol.is_empty() || !rest.starts_with(op.symbol.as_str()) {
                return false;
            }
            let after = &rest[op.symbol.len()..];
            if let Some(next) = after.chars().next() {
                let mut combined = op.symbol.clone();
                combined.push(next);
                if COMPARISONS.contains(&combined.as_str()) {
                    return false;
                }
            }
            if op.symbol.starts_with(is_ident_char) {
                let before = expr[..i].chars().next_back();
                let next = after.chars().next();
                if before.is_some_and(is_ident_char) || next.is_some_and(is_ident_char) {
                    return false;
                }
            }
            true
        })
    }
}

/// Find `closer` after `from`, skipping string literals.
fn find_closer(source: &str, from: usize, closer: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, c) in source[from..].char_indices() {
        let at = from + offset;
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if matches!(c, '"' | '\'' | '`') => quote = Some(c),
            None if source[at..].starts_with(closer) => return Some(at),
            None => {}
        }
    }
    None
}

/// Split `- body -` into its whitespace control markers and body.
fn split_whitespace_control(body: &str) -> (&str, &str, &str) {
    let lead = if body.starts_with('-') { "-" } else { "" };
    let rest = &body[lead.len()..];
    let trail = if rest.ends_with('-') { "-" } else { "" };
    (lead, rest[..rest.len() - trail.len()].trim(), trail)
}

/// First word of a tag body and the rest.
fn split_keyword(body: &str) -> (&str, &str) {
    let body = body.trim_start_matches('-').trim_start();
    let end = body
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    (&body[..end], body[end..].trim_end_matches('-'))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn collect_dependencies(keyword: &str, args: &str, dependencies: &mut Vec<Dependency>) {
    let (names, optional) = match keyword {
        "import" => (args.split(" as ").next().unwrap_or(args), false),
        "include" => (args, args.contains("ignore missing")),
        _ => (args, false),
    };

    for captures in STRING_LITERAL.captures_iter(names) {
        let Some(name) = captures
            .get(1)
            .or_else(|| captures.get(2))
            .or_else(|| captures.get(3))
        else {
            continue;
        };
        let dependency = Dependency {
            name: name.as_str().to_string(),
            optional,
        };
        if !dependencies.contains(&dependency) {
            dependencies.push(dependency);
        }
    }
}

fn error_at(source: &str, at: usize, message: String) -> SyntaxError {
    SyntaxError {
        line: source[..at].matches('\n').count() + 1,
        message,
    }
}
