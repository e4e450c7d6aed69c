//! Directive matcher shared by the passes.
//!
//! A directive is `@name`, optionally followed by whitespace and a
//! parenthesised argument list. Argument lists are scanned to their
//! balanced closing `)`, skipping parentheses inside quoted strings, so
//! they may contain nested calls and span several lines.
//!
//! Every match records the spaces and tabs directly before the `@`. Most
//! passes leave that indentation where it is; the layout pass carries it
//! along when it moves a directive.

use std::ops::Range;

use crate::error::CompileError;

/// One directive occurrence, as byte offsets into the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveMatch {
    /// Start of the indentation before `@`.
    pub start: usize,
    /// Offset of the `@`.
    pub at: usize,
    /// End of the directive: after `)` or after the bare name.
    pub end: usize,
    /// The argument text: whitespace after the name, then `(...)`.
    /// Empty for bare directives.
    pub args: Range<usize>,
}

impl DirectiveMatch {
    pub fn indent<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.at]
    }

    pub fn args<'t>(&self, text: &'t str) -> &'t str {
        &text[self.args.clone()]
    }

    /// Argument text without the surrounding whitespace and parentheses.
    pub fn inner_args<'t>(&self, text: &'t str) -> &'t str {
        let args = self.args(text).trim_start();
        args.strip_prefix('(')
            .and_then(|a| a.strip_suffix(')'))
            .unwrap_or(args)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    /// `@name(...)`; `@name` without arguments is left alone.
    WithArgs,
    /// `@name` not followed by an identifier character.
    Bare,
}

#[derive(Clone, Debug)]
pub struct DirectiveMatcher {
    name: &'static str,
    needle: String,
    shape: Shape,
}

impl DirectiveMatcher {
    /// Matcher for `@name(...)`.
    pub fn new(name: &'static str) -> Self {
        Self::with_shape(name, Shape::WithArgs)
    }

    /// Matcher for an argument-less `@name`.
    pub fn bare(name: &'static str) -> Self {
        Self::with_shape(name, Shape::Bare)
    }

    fn with_shape(name: &'static str, shape: Shape) -> Self {
        DirectiveMatcher {
            name,
            needle: format!("@{name}"),
            shape,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All non-overlapping occurrences, left to right.
    pub fn find_all(&self, text: &str) -> Result<Vec<DirectiveMatch>, CompileError> {
        let mut found = Vec::new();
        let mut from = 0;
        while let Some(rel) = text[from..].find(&self.needle) {
            let at = from + rel;
            let after_name = at + self.needle.len();
            match self.match_at(text, at, after_name)? {
                Some(m) => {
                    from = m.end;
                    found.push(m);
                }
                None => from = after_name,
            }
        }
        Ok(found)
    }

    fn match_at(
        &self,
        text: &str,
        at: usize,
        after_name: usize,
    ) -> Result<Option<DirectiveMatch>, CompileError> {
        let bytes = text.as_bytes();
        if bytes.get(after_name).copied().is_some_and(is_ident_byte) {
            return Ok(None);
        }
        let start = indent_start(bytes, at);

        match self.shape {
            Shape::Bare => Ok(Some(DirectiveMatch {
                start,
                at,
                end: after_name,
                args: after_name..after_name,
            })),
            Shape::WithArgs => {
                let open = after_name
                    + text[after_name..]
                        .bytes()
                        .take_while(u8::is_ascii_whitespace)
                        .count();
                if bytes.get(open) != Some(&b'(') {
                    return Ok(None);
                }
                let Some(close) = closing_paren(bytes, open) else {
                    return Err(CompileError::UnclosedDirective {
                        directive: self.name.to_string(),
                        line: line_of(text, at),
                    });
                };
                Ok(Some(DirectiveMatch {
                    start,
                    at,
                    end: close + 1,
                    args: after_name..close + 1,
                }))
            }
        }
    }

    /// Rewrite every occurrence into a fresh buffer. `replace` receives the
    /// match and the full text and returns what replaces `start..end`.
    ///
    /// Returns the new text and the number of rewrites.
    pub fn replace_all<F>(&self, text: &str, mut replace: F) -> Result<(String, usize), CompileError>
    where
        F: FnMut(&DirectiveMatch, &str) -> String,
    {
        let matches = self.find_all(text)?;
        if matches.is_empty() {
            return Ok((text.to_string(), 0));
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in &matches {
            out.push_str(&text[last..m.start]);
            out.push_str(&replace(m, text));
            last = m.end;
        }
        out.push_str(&text[last..]);
        Ok((out, matches.len()))
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Start of the run of spaces and tabs ending at `at`.
fn indent_start(bytes: &[u8], at: usize) -> usize {
    let mut start = at;
    while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    start
}

/// Offset of the `)` balancing the `(` at `open`.
fn closing_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// One-based line of `offset`.
pub fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests;
