//! `{{-- ... --}}` comments.
//!
//! A comment whose terminator is missing is a line comment: it runs to the
//! end of its line, and that line break goes with it. So does a comment
//! closed on its own line with nothing but blanks after the `--}}`. Any
//! other terminated comment is a block comment. Line comments are rewritten
//! first so a block pattern never has to decide where an unterminated
//! comment ends.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{literal_regex, Pass, PassContext, Rewrite};
use crate::error::CompileError;

const OPEN: &str = "{{--";
const CLOSE: &str = "--}}";

static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| literal_regex(r"(?s)\{\{--(.*?)--\}\}"));

pub struct CommentPass;

impl Pass for CommentPass {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, lines) = line_comments(text);
        let mut blocks = 0;
        let text = BLOCK_COMMENT.replace_all(&text, |caps: &Captures<'_>| {
            blocks += 1;
            format!("<% /* {} */ %>\n", sanitize(caps[1].trim()))
        });
        Ok(Rewrite::new(text.into_owned(), lines + blocks))
    }
}

fn line_comments(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut count = 0;
    let mut copied = 0;
    let mut from = 0;

    while let Some(rel) = text[from..].find(OPEN) {
        let open = from + rel;
        let body_start = open + OPEN.len();
        let rest = &text[body_start..];
        let close = rest.find(CLOSE).map(|i| body_start + i);
        let next_open = rest.find(OPEN).map(|i| body_start + i);

        match close {
            // terminated before the next opener: left for the block pattern
            // unless it ends its line
            Some(close) if next_open.map_or(true, |next| close < next) => {
                if let Some(line_end) = closes_line(text, body_start, close) {
                    out.push_str(&text[copied..open]);
                    push_line_comment(&mut out, &text[body_start..close]);
                    copied = line_end + 1;
                    count += 1;
                    from = copied;
                } else {
                    from = close + CLOSE.len();
                }
            }
            _ => {
                let line_end = rest.find('\n').map_or(text.len(), |i| body_start + i);
                out.push_str(&text[copied..open]);
                push_line_comment(&mut out, &text[body_start..line_end]);
                copied = (line_end + 1).min(text.len());
                from = copied;
                count += 1;
            }
        }
    }
    out.push_str(&text[copied..]);
    (out, count)
}

fn push_line_comment(out: &mut String, body: &str) {
    out.push_str("<% // ");
    out.push_str(&sanitize(body.trim_end_matches('\r').trim()));
    out.push_str(" %>");
}

/// Offset of the line break ending a single-line comment closed at `close`,
/// when only spaces or tabs sit between the `--}}` and that break.
fn closes_line(text: &str, body_start: usize, close: usize) -> Option<usize> {
    if text[body_start..close].contains('\n') {
        return None;
    }
    let after = close + CLOSE.len();
    let tail = &text[after..];
    let blanks = tail.len() - tail.trim_start_matches([' ', '\t']).len();
    let rest = &tail[blanks..];
    if rest.starts_with('\n') {
        Some(after + blanks)
    } else if rest.starts_with("\r\n") {
        Some(after + blanks + 1)
    } else {
        None
    }
}

/// Keep comment text from closing the host comment or code block early,
/// and from being matched by the passes that run after this one.
fn sanitize(body: &str) -> String {
    body.replace("*/", "* /")
        .replace("%>", "% >")
        .replace("{{", "{ {")
        .replace('@', "@ ")
}
