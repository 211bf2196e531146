//! Block tags Tera does not ship with.
//!
//! A [`TagHandler`] claims one or more keywords. When the syntax rewriter
//! meets `{% keyword args %}` it asks the handler for the Tera statement to
//! put in its place; an empty statement removes the tag. Handlers keep
//! nesting state in a [`TagScope`] that lives for one template.

use std::fmt;

/// One open block tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFrame {
    /// Name of the handler that opened the block.
    pub tag: String,
    /// Variable holding the block's subject, if any.
    pub variable: Option<String>,
    /// Branches emitted so far.
    pub branches: usize,
}

/// Open block tags of the template being rewritten.
#[derive(Debug, Default)]
pub struct TagScope {
    frames: Vec<TagFrame>,
    counter: usize,
}

impl TagScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A number unique within this template.
    pub fn next_id(&mut self) -> usize {
        self.counter += 1;
        self.counter
    }

    pub fn push(&mut self, frame: TagFrame) {
        self.frames.push(frame);
    }

    /// Close the innermost block, which must belong to `tag`.
    pub fn pop(&mut self, tag: &str) -> Result<TagFrame, String> {
        match self.frames.pop() {
            Some(frame) if frame.tag == tag => Ok(frame),
            Some(frame) => {
                let err = format!("unexpected end of `{}` while `{}` is open", tag, frame.tag);
                self.frames.push(frame);
                Err(err)
            }
            None => Err(format!("`end{}` without an open `{}`", tag, tag)),
        }
    }

    /// The innermost block, which must belong to `tag`.
    pub fn current_mut(&mut self, tag: &str) -> Result<&mut TagFrame, String> {
        match self.frames.last_mut() {
            Some(frame) if frame.tag == tag => Ok(frame),
            _ => Err(format!("used outside of a `{}` block", tag)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Tags still open, outermost first.
    pub fn open_tags(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.tag.as_str()).collect()
    }
}

/// A custom block tag.
pub trait TagHandler: Send + Sync + fmt::Debug {
    /// Name shown in listings, usually the opening keyword.
    fn name(&self) -> &str;

    /// Every keyword this handler claims, opening keyword first.
    fn keywords(&self) -> &[&'static str];

    /// Translate one occurrence of `keyword` with its raw arguments.
    fn rewrite(&self, keyword: &str, args: &str, scope: &mut TagScope) -> Result<String, String>;
}

/// `{% with expr as name %}...{% endwith %}`
///
/// Binds `name` with a Tera `set`. The binding stays visible after
/// `endwith` because Tera has no block scopes outside loops and macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct WithTag;

impl TagHandler for WithTag {
    fn name(&self) -> &str {
        "with"
    }

    fn keywords(&self) -> &[&'static str] {
        &["with", "endwith"]
    }

    fn rewrite(&self, keyword: &str, args: &str, scope: &mut TagScope) -> Result<String, String> {
        match keyword {
            "with" => {
                let (expr, name) = split_alias(args)
                    .ok_or_else(|| format!("expected `with <expression> as <name>`, got `{}`", args))?;
                scope.push(TagFrame {
                    tag: "with".to_string(),
                    variable: Some(name.to_string()),
                    branches: 0,
                });
                Ok(format!("set {} = {}", name, expr))
            }
            "endwith" => {
                scope.pop("with")?;
                Ok(String::new())
            }
            other => Err(format!("`with` does not handle `{}`", other)),
        }
    }
}

/// Split `expr as name` at the last top-level ` as `.
fn split_alias(args: &str) -> Option<(&str, &str)> {
    let idx = args.rfind(" as ")?;
    let expr = args[..idx].trim();
    let name = args[idx + 4..].trim();
    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    (valid_name && !expr.is_empty()).then_some((expr, name))
}

/// `{% switch expr %}{% case a, b %}...{% default %}...{% endswitch %}`
///
/// Becomes an `if`/`elif`/`else` chain over a `set` variable. A case with
/// several comma separated values matches any of them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwitchTag;

impl TagHandler for SwitchTag {
    fn name(&self) -> &str {
        "switch"
    }

    fn keywords(&self) -> &[&'static str] {
        &["switch", "case", "default", "endswitch"]
    }

    fn rewrite(&self, keyword: &str, args: &str, scope: &mut TagScope) -> Result<String, String> {
        match keyword {
            "switch" => {
                let subject = args.trim();
                if subject.is_empty() {
                    return Err("`switch` requires an expression".to_string());
                }
                let variable = format!("__switch_{}", scope.next_id());
                let statement = format!("set {} = {}", variable, subject);
                scope.push(TagFrame {
                    tag: "switch".to_string(),
                    variable: Some(variable),
                    branches: 0,
                });
                Ok(statement)
            }
            "case" => {
                let values = split_top_level(args);
                if values.is_empty() {
                    return Err("`case` requires at least one value".to_string());
                }
                let frame = scope.current_mut("switch").map_err(|e| format!("`case` {}", e))?;
                let variable = frame.variable.clone().unwrap_or_default();
                let condition = values
                    .iter()
                    .map(|v| format!("{} == {}", variable, v))
                    .collect::<Vec<_>>()
                    .join(" or ");
                let keyword = if frame.branches == 0 { "if" } else { "elif" };
                frame.branches += 1;
                Ok(format!("{} {}", keyword, condition))
            }
            "default" => {
                let frame = scope
                    .current_mut("switch")
                    .map_err(|e| format!("`default` {}", e))?;
                let statement = if frame.branches == 0 { "if true" } else { "else" };
                frame.branches += 1;
                Ok(statement.to_string())
            }
            "endswitch" => {
                let frame = scope.pop("switch")?;
                Ok(if frame.branches == 0 {
                    String::new()
                } else {
                    "endif".to_string()
                })
            }
            other => Err(format!("`switch` does not handle `{}`", other)),
        }
    }
}

/// Split on commas that are not inside quotes or brackets.
fn split_top_level(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in args.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'' | '`') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '(' | '[' | '{') => {
                depth += 1;
                current.push(c);
            }
            (None, ')' | ']' | '}') => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            (None, ',') if depth == 0 => parts.push(std::mem::take(&mut current)),
            (None, c) => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_binds_and_closes() {
        let mut scope = TagScope::new();
        let open = WithTag.rewrite("with", "user.profile as p", &mut scope).unwrap();
        assert_eq!(open, "set p = user.profile");
        assert_eq!(scope.open_tags(), vec!["with"]);

        let close = WithTag.rewrite("endwith", "", &mut scope).unwrap();
        assert_eq!(close, "");
        assert!(scope.is_empty());
    }

    #[test]
    fn with_requires_alias() {
        let mut scope = TagScope::new();
        assert!(WithTag.rewrite("with", "user", &mut scope).is_err());
        assert!(WithTag.rewrite("with", "user as 9x", &mut scope).is_err());
        assert!(WithTag.rewrite("endwith", "", &mut scope).is_err());
    }

    #[test]
    fn switch_builds_if_chain() {
        let mut scope = TagScope::new();
        let tag = SwitchTag;
        assert_eq!(
            tag.rewrite("switch", "node.type", &mut scope).unwrap(),
            "set __switch_1 = node.type"
        );
        assert_eq!(
            tag.rewrite("case", "\"page\"", &mut scope).unwrap(),
            "if __switch_1 == \"page\""
        );
        assert_eq!(
            tag.rewrite("case", "\"a,b\", 'c'", &mut scope).unwrap(),
            "elif __switch_1 == \"a,b\" or __switch_1 == 'c'"
        );
        assert_eq!(tag.rewrite("default", "", &mut scope).unwrap(), "else");
        assert_eq!(tag.rewrite("endswitch", "", &mut scope).unwrap(), "endif");
        assert!(scope.is_empty());
    }

    #[test]
    fn switch_with_only_default() {
        let mut scope = TagScope::new();
        SwitchTag.rewrite("switch", "x", &mut scope).unwrap();
        assert_eq!(SwitchTag.rewrite("default", "", &mut scope).unwrap(), "if true");
        assert_eq!(SwitchTag.rewrite("endswitch", "", &mut scope).unwrap(), "endif");
    }

    #[test]
    fn empty_switch_disappears() {
        let mut scope = TagScope::new();
        SwitchTag.rewrite("switch", "x", &mut scope).unwrap();
        assert_eq!(SwitchTag.rewrite("endswitch", "", &mut scope).unwrap(), "");
    }

    #[test]
    fn nested_switches_get_distinct_variables() {
        let mut scope = TagScope::new();
        SwitchTag.rewrite("switch", "a", &mut scope).unwrap();
        SwitchTag.rewrite("case", "1", &mut scope).unwrap();
        assert_eq!(
            SwitchTag.rewrite("switch", "b", &mut scope).unwrap(),
            "set __switch_2 = b"
        );
        assert_eq!(
            SwitchTag.rewrite("case", "2", &mut scope).unwrap(),
            "if __switch_2 == 2"
        );
        SwitchTag.rewrite("endswitch", "", &mut scope).unwrap();
        assert_eq!(
            SwitchTag.rewrite("case", "3", &mut scope).unwrap(),
            "elif __switch_1 == 3"
        );
    }

    #[test]
    fn case_outside_switch_fails() {
        let mut scope = TagScope::new();
        let err = SwitchTag.rewrite("case", "1", &mut scope).unwrap_err();
        assert!(err.contains("switch"));
    }

    #[test]
    fn mismatched_end_fails() {
        let mut scope = TagScope::new();
        WithTag.rewrite("with", "a as b", &mut scope).unwrap();
        assert!(SwitchTag.rewrite("endswitch", "", &mut scope).is_err());
    }

    #[test]
    fn split_respects_nesting() {
        assert_eq!(
            split_top_level("[1, 2], f(a, b), 'x,y'"),
            vec!["[1, 2]", "f(a, b)", "'x,y'"]
        );
        assert!(split_top_level("  ").is_empty());
    }
}
