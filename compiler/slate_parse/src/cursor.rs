//! Token cursor for one code block.

use slate_ir::Span;
use slate_lexer::{Token, TokenKind, TokenList};

pub(crate) struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// Invariant: the token list always ends with `Eof`, so clamping to the
    /// last index is always in bounds.
    #[inline]
    pub fn current(&self) -> &'a Token {
        let last = self.tokens.tokens.len().saturating_sub(1);
        &self.tokens.tokens[self.pos.min(last)]
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    pub fn peek_kind(&self, offset: usize) -> &'a TokenKind {
        let last = self.tokens.tokens.len().saturating_sub(1);
        &self.tokens.tokens[(self.pos + offset).min(last)].kind
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Consume the current token and return it. `Eof` is never consumed.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    /// Discriminant-only comparison; payloads are ignored.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}
