//! Nesting of flat statements into a [`Node`] tree.

use slate_ir::{Branch, ExprId, Node, Span};

use crate::stmt::Stmt;
use crate::{ParseError, ParseErrorKind};

/// An open block construct awaiting its closer.
enum Open {
    /// `pending` holds the condition of the branch being collected, or
    /// `None` once `else:` has been seen.
    If {
        branches: Vec<Branch>,
        pending: Option<ExprId>,
    },
    Foreach {
        iterable: ExprId,
        key: Option<String>,
        value: String,
        span: Span,
    },
    For {
        init: Vec<ExprId>,
        condition: Vec<ExprId>,
        step: Vec<ExprId>,
    },
    While {
        condition: ExprId,
    },
}

impl Open {
    fn construct(&self) -> &'static str {
        match self {
            Open::If { .. } => "if",
            Open::Foreach { .. } => "foreach",
            Open::For { .. } => "for",
            Open::While { .. } => "while",
        }
    }
}

struct Frame {
    open: Open,
    span: Span,
    body: Vec<Node>,
}

pub(crate) struct TreeBuilder<'src> {
    source: &'src str,
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl<'src> TreeBuilder<'src> {
    pub fn new(source: &'src str) -> Self {
        TreeBuilder {
            source,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn body(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.body,
            None => &mut self.root,
        }
    }

    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError::new(kind, span, self.source)
    }

    /// Append literal text, merging with a preceding text node.
    pub fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let body = self.body();
        if let Some(Node::Text(prev)) = body.last_mut() {
            prev.push_str(text);
        } else {
            body.push(Node::Text(text.to_string()));
        }
    }

    fn open(&mut self, open: Open, span: Span) {
        self.stack.push(Frame {
            open,
            span,
            body: Vec::new(),
        });
    }

    /// Pop the innermost frame if it is the construct `closer` ends.
    fn close(&mut self, opener: &'static str, closer: &'static str, at: Span) -> Result<Frame, ParseError> {
        match self.stack.pop() {
            Some(frame) if frame.open.construct() == opener => Ok(frame),
            // A different construct is innermost: it is the one left open.
            Some(frame) => Err(self.error(
                ParseErrorKind::UnclosedBlock {
                    construct: frame.open.construct(),
                },
                frame.span,
            )),
            None => Err(self.error(
                ParseErrorKind::UnmatchedClose {
                    found: closer,
                    opener,
                },
                at,
            )),
        }
    }

    pub fn push(&mut self, stmt: Stmt) -> Result<(), ParseError> {
        match stmt {
            Stmt::Echo(expr, span) => self.body().push(Node::Echo { expr, span }),
            Stmt::Eval(expr, span) => self.body().push(Node::Eval { expr, span }),
            Stmt::If(cond, span) => self.open(
                Open::If {
                    branches: Vec::new(),
                    pending: Some(cond),
                },
                span,
            ),
            Stmt::ElseIf(cond, span) => self.separate("elseif", Some(cond), span)?,
            Stmt::Else(span) => self.separate("else", None, span)?,
            Stmt::EndIf(span) => {
                let frame = self.close("if", "endif", span)?;
                let Open::If { mut branches, pending } = frame.open else {
                    return Ok(());
                };
                let otherwise = match pending {
                    Some(condition) => {
                        branches.push(Branch {
                            condition,
                            body: frame.body,
                        });
                        None
                    }
                    None => Some(frame.body),
                };
                self.body().push(Node::If { branches, otherwise });
            }
            Stmt::Foreach {
                iterable,
                key,
                value,
                span,
            } => self.open(
                Open::Foreach {
                    iterable,
                    key,
                    value,
                    span,
                },
                span,
            ),
            Stmt::EndForeach(span) => {
                let frame = self.close("foreach", "endforeach", span)?;
                if let Open::Foreach {
                    iterable,
                    key,
                    value,
                    span,
                } = frame.open
                {
                    self.body().push(Node::Foreach {
                        iterable,
                        key,
                        value,
                        body: frame.body,
                        span,
                    });
                }
            }
            Stmt::For {
                init,
                condition,
                step,
                span,
            } => self.open(
                Open::For {
                    init,
                    condition,
                    step,
                },
                span,
            ),
            Stmt::EndFor(span) => {
                let frame = self.close("for", "endfor", span)?;
                if let Open::For {
                    init,
                    condition,
                    step,
                } = frame.open
                {
                    self.body().push(Node::For {
                        init,
                        condition,
                        step,
                        body: frame.body,
                    });
                }
            }
            Stmt::While(condition, span) => self.open(Open::While { condition }, span),
            Stmt::EndWhile(span) => {
                let frame = self.close("while", "endwhile", span)?;
                if let Open::While { condition } = frame.open {
                    self.body().push(Node::While {
                        condition,
                        body: frame.body,
                    });
                }
            }
        }
        Ok(())
    }

    /// Handle `elseif` (with a condition) or `else` (without).
    fn separate(&mut self, found: &'static str, next: Option<ExprId>, at: Span) -> Result<(), ParseError> {
        let source = self.source;
        let Some(Frame {
            open: Open::If { branches, pending },
            body,
            ..
        }) = self.stack.last_mut()
        else {
            return Err(ParseError::new(
                ParseErrorKind::UnmatchedClose { found, opener: "if" },
                at,
                source,
            ));
        };
        let Some(condition) = pending.take() else {
            return Err(ParseError::new(ParseErrorKind::AfterElse { found }, at, source));
        };
        branches.push(Branch {
            condition,
            body: std::mem::take(body),
        });
        *pending = next;
        Ok(())
    }

    /// Finish building, failing if any block is still open.
    pub fn finish(mut self) -> Result<Vec<Node>, ParseError> {
        if let Some(frame) = self.stack.pop() {
            let construct = frame.open.construct();
            return Err(self.error(ParseErrorKind::UnclosedBlock { construct }, frame.span));
        }
        Ok(self.root)
    }
}
