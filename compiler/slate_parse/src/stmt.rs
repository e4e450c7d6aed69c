//! Statement parsing.
//!
//! Statements are parsed flat: block openers (`if (..):`), separators
//! (`else:`) and closers (`endif;`) are separate [`Stmt`]s because a single
//! construct routinely spans several code blocks with literal text between
//! them. [`TreeBuilder`] nests them afterwards.

use slate_ir::{ExprId, Span};
use slate_lexer::TokenKind;

use crate::tree::TreeBuilder;
use crate::{BlockParser, ParseError};

/// A flat statement.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Stmt {
    Echo(ExprId, Span),
    Eval(ExprId, Span),
    If(ExprId, Span),
    ElseIf(ExprId, Span),
    Else(Span),
    EndIf(Span),
    Foreach {
        iterable: ExprId,
        key: Option<String>,
        value: String,
        span: Span,
    },
    EndForeach(Span),
    For {
        init: Vec<ExprId>,
        condition: Vec<ExprId>,
        step: Vec<ExprId>,
        span: Span,
    },
    EndFor(Span),
    While(ExprId, Span),
    EndWhile(Span),
}

impl BlockParser<'_, '_> {
    /// Parse every statement in the block, feeding them to `tree`.
    pub(crate) fn parse_statements(&mut self, tree: &mut TreeBuilder<'_>) -> Result<(), ParseError> {
        while !self.cursor.at_end() {
            if self.cursor.eat(&TokenKind::Semicolon) {
                continue;
            }
            self.parse_statement(tree)?;
        }
        Ok(())
    }

    fn parse_statement(&mut self, tree: &mut TreeBuilder<'_>) -> Result<(), ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Echo => {
                self.cursor.advance();
                loop {
                    let expr = self.parse_expr()?;
                    tree.push(Stmt::Echo(expr, start.merge(self.arena.get(expr).span)))?;
                    if !self.cursor.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.end_statement()
            }
            TokenKind::If => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let end = self.expect(&TokenKind::Colon, "`:` after `if (...)`")?;
                tree.push(Stmt::If(cond, start.merge(end)))
            }
            TokenKind::ElseIf => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let end = self.expect(&TokenKind::Colon, "`:` after `elseif (...)`")?;
                tree.push(Stmt::ElseIf(cond, start.merge(end)))
            }
            TokenKind::Else => {
                self.cursor.advance();
                if self.cursor.eat(&TokenKind::If) {
                    let cond = self.parse_condition()?;
                    let end = self.expect(&TokenKind::Colon, "`:` after `else if (...)`")?;
                    return tree.push(Stmt::ElseIf(cond, start.merge(end)));
                }
                let end = self.expect(&TokenKind::Colon, "`:` after `else`")?;
                tree.push(Stmt::Else(start.merge(end)))
            }
            TokenKind::Foreach => {
                self.cursor.advance();
                self.parse_foreach(start, tree)
            }
            TokenKind::For => {
                self.cursor.advance();
                self.expect(&TokenKind::LParen, "`(` after `for`")?;
                let init = self.parse_expr_list(&TokenKind::Semicolon)?;
                self.expect(&TokenKind::Semicolon, "`;` after `for` initializer")?;
                let condition = self.parse_expr_list(&TokenKind::Semicolon)?;
                self.expect(&TokenKind::Semicolon, "`;` after `for` condition")?;
                let step = self.parse_expr_list(&TokenKind::RParen)?;
                self.expect(&TokenKind::RParen, "`)` after `for` clauses")?;
                let end = self.expect(&TokenKind::Colon, "`:` after `for (...)`")?;
                tree.push(Stmt::For {
                    init,
                    condition,
                    step,
                    span: start.merge(end),
                })
            }
            TokenKind::While => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let end = self.expect(&TokenKind::Colon, "`:` after `while (...)`")?;
                tree.push(Stmt::While(cond, start.merge(end)))
            }
            closer @ (TokenKind::EndIf
            | TokenKind::EndForeach
            | TokenKind::EndFor
            | TokenKind::EndWhile) => {
                let stmt = match closer {
                    TokenKind::EndIf => Stmt::EndIf(start),
                    TokenKind::EndForeach => Stmt::EndForeach(start),
                    TokenKind::EndFor => Stmt::EndFor(start),
                    _ => Stmt::EndWhile(start),
                };
                self.cursor.advance();
                self.end_statement()?;
                tree.push(stmt)
            }
            _ => {
                let expr = self.parse_expr()?;
                self.end_statement()?;
                tree.push(Stmt::Eval(expr, self.arena.get(expr).span))
            }
        }
    }

    /// `(as $v)` or `(as $k => $v)` tail of a `foreach`.
    fn parse_foreach(&mut self, start: Span, tree: &mut TreeBuilder<'_>) -> Result<(), ParseError> {
        self.expect(&TokenKind::LParen, "`(` after `foreach`")?;
        let iterable = self.parse_expr()?;
        self.expect(&TokenKind::As, "`as` in `foreach`")?;
        let first = self.parse_loop_variable()?;
        let (key, value) = if self.cursor.eat(&TokenKind::FatArrow) {
            (Some(first), self.parse_loop_variable()?)
        } else {
            (None, first)
        };
        self.expect(&TokenKind::RParen, "`)` after `foreach` variables")?;
        let end = self.expect(&TokenKind::Colon, "`:` after `foreach (...)`")?;
        tree.push(Stmt::Foreach {
            iterable,
            key,
            value,
            span: start.merge(end),
        })
    }

    fn parse_loop_variable(&mut self) -> Result<String, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Variable(name) => {
                self.cursor.advance();
                Ok(name.clone())
            }
            _ => Err(self.unexpected("loop variable")),
        }
    }

    /// A parenthesised condition.
    fn parse_condition(&mut self) -> Result<ExprId, ParseError> {
        self.expect(&TokenKind::LParen, "`(`")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "`)`")?;
        Ok(cond)
    }

    /// Comma-separated expressions, possibly empty, ending before `until`.
    fn parse_expr_list(&mut self, until: &TokenKind) -> Result<Vec<ExprId>, ParseError> {
        let mut exprs = Vec::new();
        if self.cursor.check(until) {
            return Ok(exprs);
        }
        loop {
            exprs.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                return Ok(exprs);
            }
        }
    }

    /// A statement ends at `;` or at the end of its block.
    fn end_statement(&mut self) -> Result<(), ParseError> {
        if self.cursor.eat(&TokenKind::Semicolon) || self.cursor.at_end() {
            Ok(())
        } else {
            Err(self.unexpected("`;`"))
        }
    }
}
