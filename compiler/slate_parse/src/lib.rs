//! Parser for Slate compiled text.
//!
//! Compiled text is literal output interleaved with `<% ... %>` code blocks.
//! Parsing runs in one forward sweep:
//!
//! 1. Find the next `<%`; everything before it is a text node.
//! 2. Lex the block up to its `%>` (see [`slate_lexer::lex_block`]).
//! 3. Parse the block's statements into flat open/close/leaf statements.
//! 4. Feed those to a tree builder that nests bodies and checks pairing.
//!
//! A single line break directly after `%>` is not part of the output.

mod cursor;
mod error;
mod expr;
mod stmt;
mod tree;

use slate_ir::{ExprArena, Program, Span};

pub use error::{ParseError, ParseErrorKind};

use crate::cursor::Cursor;
use crate::tree::TreeBuilder;

/// Opening delimiter of a code block.
pub const OPEN_TAG: &str = "<%";

/// Parse compiled text into a [`Program`].
#[tracing::instrument(level = "trace", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let mut arena = ExprArena::new();
    let mut tree = TreeBuilder::new(source);
    let mut pos = 0;

    while pos < source.len() {
        let Some(rel) = source[pos..].find(OPEN_TAG) else {
            tree.text(&source[pos..]);
            break;
        };
        let open = pos + rel;
        tree.text(&source[pos..open]);

        let tokens = slate_lexer::lex_block(source, open + OPEN_TAG.len());
        let Some(end) = tokens.end() else {
            return Err(ParseError::new(
                ParseErrorKind::UnterminatedBlock,
                Span::from_range(open..open + OPEN_TAG.len()),
                source,
            ));
        };

        let mut block = BlockParser::new(source, Cursor::new(&tokens), &mut arena);
        block.parse_statements(&mut tree)?;
        pos = skip_line_break(source, end);
    }

    let nodes = tree.finish()?;
    tracing::trace!(exprs = arena.len(), nodes = nodes.len(), "parsed compiled text");
    Ok(Program::new(arena, nodes))
}

/// Offset past one `\n` or `\r\n` at `pos`, if present.
fn skip_line_break(source: &str, pos: usize) -> usize {
    let rest = &source.as_bytes()[pos.min(source.len())..];
    if rest.starts_with(b"\r\n") {
        pos + 2
    } else if rest.starts_with(b"\n") {
        pos + 1
    } else {
        pos
    }
}

/// Parser state for a single code block.
pub(crate) struct BlockParser<'t, 'a> {
    source: &'a str,
    cursor: Cursor<'t>,
    arena: &'a mut ExprArena,
}

impl<'t, 'a> BlockParser<'t, 'a> {
    fn new(source: &'a str, cursor: Cursor<'t>, arena: &'a mut ExprArena) -> Self {
        BlockParser {
            source,
            cursor,
            arena,
        }
    }

    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError::new(kind, span, self.source)
    }

    /// Error for the current token not being `expected`.
    #[cold]
    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.cursor.current();
        let kind = match token.kind {
            slate_lexer::TokenKind::Error => ParseErrorKind::InvalidToken,
            ref found => ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: found.describe(),
            },
        };
        self.error(kind, token.span)
    }

    /// Consume a token of the given kind or fail, returning its span.
    fn expect(
        &mut self,
        kind: &slate_lexer::TokenKind,
        expected: &str,
    ) -> Result<Span, ParseError> {
        if self.cursor.check(kind) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.unexpected(expected))
        }
    }
}

#[cfg(test)]
mod tests;
