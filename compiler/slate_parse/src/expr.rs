//! Expression parsing.
//!
//! Precedence climbing over [`BinaryOp::precedence`]; assignment and the
//! ternary sit above the binary levels, unary and postfix operators below.

use slate_ir::{AssignOp, BinaryOp, Expr, ExprId, ExprKind, Intrinsic, Span, UnaryOp};
use slate_lexer::TokenKind;
use slate_stack::ensure_sufficient_stack;

use crate::{BlockParser, ParseError, ParseErrorKind};

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Dot => BinaryOp::Concat,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::EqEqEq => BinaryOp::Identical,
        TokenKind::NotEqEq => BinaryOp::NotIdentical,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::AmpAmp | TokenKind::And => BinaryOp::And,
        TokenKind::PipePipe | TokenKind::Or => BinaryOp::Or,
        TokenKind::DoubleQuestion => BinaryOp::Coalesce,
        _ => return None,
    })
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::DotEq => AssignOp::Concat,
        _ => return None,
    })
}

impl BlockParser<'_, '_> {
    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc(Expr::new(kind, span))
    }

    fn span_of(&self, id: ExprId) -> Span {
        self.arena.get(id).span
    }

    fn require_place(&self, id: ExprId, at: Span) -> Result<(), ParseError> {
        if self.arena.get(id).kind.is_place() {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::InvalidAssignTarget, at))
        }
    }

    /// Parse a full expression, including assignment.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> Result<ExprId, ParseError> {
        let target = self.parse_ternary()?;
        let Some(op) = assign_op(self.cursor.current_kind()) else {
            return Ok(target);
        };
        self.require_place(target, self.cursor.current_span())?;
        self.cursor.advance();
        let value = self.parse_expr()?;
        let span = self.span_of(target).merge(self.span_of(value));
        Ok(self.alloc(ExprKind::Assign { op, target, value }, span))
    }

    fn parse_ternary(&mut self) -> Result<ExprId, ParseError> {
        let cond = self.parse_binary(0)?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let then = if self.cursor.check(&TokenKind::Colon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Colon, "`:` in conditional expression")?;
        let otherwise = self.parse_expr()?;
        let span = self.span_of(cond).merge(self.span_of(otherwise));
        Ok(self.alloc(
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = binary_op(self.cursor.current_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            let next_min = if op.is_right_assoc() { prec } else { prec + 1 };
            let right = ensure_sufficient_stack(|| self.parse_binary(next_min))?;
            let span = self.span_of(left).merge(self.span_of(right));
            left = self.alloc(ExprKind::Binary { op, left, right }, span);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let op = match self.cursor.current_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = op {
            self.cursor.advance();
            let operand = ensure_sufficient_stack(|| self.parse_unary())?;
            let span = start.merge(self.span_of(operand));
            return Ok(self.alloc(ExprKind::Unary { op, operand }, span));
        }

        if let kind @ (TokenKind::PlusPlus | TokenKind::MinusMinus) = self.cursor.current_kind() {
            let increment = matches!(kind, TokenKind::PlusPlus);
            self.cursor.advance();
            let target = self.parse_postfix()?;
            self.require_place(target, start)?;
            let span = start.merge(self.span_of(target));
            return Ok(self.alloc(
                ExprKind::IncDec {
                    target,
                    increment,
                    prefix: true,
                },
                span,
            ));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.cursor.current_kind() {
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = if self.cursor.check(&TokenKind::RBracket) {
                        None
                    } else {
                        Some(self.parse_expr()?)
                    };
                    let end = self.expect(&TokenKind::RBracket, "`]`")?;
                    let span = self.span_of(expr).merge(end);
                    expr = self.alloc(ExprKind::Index { base: expr, index }, span);
                }
                TokenKind::Arrow => {
                    self.cursor.advance();
                    let TokenKind::Ident(name) = self.cursor.current_kind() else {
                        return Err(self.unexpected("property name after `->`"));
                    };
                    let end = self.cursor.advance().span;
                    let span = self.span_of(expr).merge(end);
                    expr = self.alloc(
                        ExprKind::Property {
                            base: expr,
                            name: name.clone(),
                        },
                        span,
                    );
                }
                kind @ (TokenKind::PlusPlus | TokenKind::MinusMinus) => {
                    let increment = matches!(kind, TokenKind::PlusPlus);
                    let op_span = self.cursor.current_span();
                    self.require_place(expr, op_span)?;
                    self.cursor.advance();
                    let span = self.span_of(expr).merge(op_span);
                    expr = self.alloc(
                        ExprKind::IncDec {
                            target: expr,
                            increment,
                            prefix: false,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let span = token.span;
        let kind = match &token.kind {
            TokenKind::Int(n) => ExprKind::Int(*n),
            TokenKind::Float(f) => ExprKind::Float(*f),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Variable(name) => ExprKind::Var(name.clone()),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                return self.parse_array(span, &TokenKind::RBracket, "`]`");
            }
            TokenKind::Ident(name) if matches!(self.cursor.peek_kind(1), TokenKind::LParen) => {
                self.cursor.advance();
                self.cursor.advance();
                if name.eq_ignore_ascii_case("array") {
                    return self.parse_array(span, &TokenKind::RParen, "`)`");
                }
                return self.parse_call(name, span);
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.cursor.advance();
        Ok(self.alloc(kind, span))
    }

    /// Array literal entries after the opening delimiter.
    fn parse_array(
        &mut self,
        start: Span,
        close: &TokenKind,
        close_desc: &str,
    ) -> Result<ExprId, ParseError> {
        let mut entries = Vec::new();
        while !self.cursor.check(close) {
            let first = self.parse_expr()?;
            let entry = if self.cursor.eat(&TokenKind::FatArrow) {
                (Some(first), self.parse_expr()?)
            } else {
                (None, first)
            };
            entries.push(entry);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(close, close_desc)?;
        Ok(self.alloc(ExprKind::Array(entries), start.merge(end)))
    }

    /// Call arguments after `name(`.
    fn parse_call(&mut self, name: &str, start: Span) -> Result<ExprId, ParseError> {
        let mut args = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RParen, "`)` after arguments")?;
        let span = start.merge(end);

        if let Some(intrinsic) = Intrinsic::from_name(name) {
            let (min, max) = intrinsic.arity();
            if args.len() < min || args.len() > max {
                return Err(self.error(
                    ParseErrorKind::IntrinsicArity {
                        name: intrinsic.name(),
                        min,
                        max,
                        found: args.len(),
                    },
                    span,
                ));
            }
            return Ok(self.alloc(ExprKind::Intrinsic { intrinsic, args }, span));
        }

        Ok(self.alloc(
            ExprKind::Call {
                name: name.to_string(),
                args,
            },
            span,
        ))
    }
}
