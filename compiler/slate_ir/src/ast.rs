//! Host-script syntax tree.
//!
//! Expressions live in a flat [`ExprArena`] and are referenced by [`ExprId`].
//! Statements form a small tree of [`Node`]s; block constructs own their
//! bodies directly since nesting depth follows the template, not the data.

use std::fmt;

use crate::Span;

/// Handle to an expression in its [`ExprArena`]. Only meaningful for the
/// arena that handed it out.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// String concatenation: `.`
    Concat,
    /// Loose equality: `==`
    Eq,
    NotEq,
    /// Strict equality: `===`
    Identical,
    NotIdentical,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    /// Null coalescing: `??`
    Coalesce,
}

impl BinaryOp {
    /// Binding power, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 9,
            BinaryOp::Add | BinaryOp::Sub => 8,
            BinaryOp::Concat => 7,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 6,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Identical | BinaryOp::NotIdentical => 5,
            BinaryOp::And => 4,
            BinaryOp::Or => 3,
            BinaryOp::Coalesce => 2,
        }
    }

    /// `??` is right-associative; everything else groups to the left.
    pub fn is_right_assoc(self) -> bool {
        matches!(self, BinaryOp::Coalesce)
    }

    /// Check if operator short-circuits.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => ".",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Identical => "===",
            BinaryOp::NotIdentical => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Coalesce => "??",
        }
    }
}

impl fmt::Debug for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum UnaryOp {
    /// Logical not: `!x`
    Not,
    /// Numeric negation: `-x`
    Neg,
    /// Numeric identity: `+x`
    Plus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }
}

impl fmt::Debug for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Assignment operators. Compound forms desugar to a [`BinaryOp`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
            AssignOp::Concat => Some(BinaryOp::Concat),
        }
    }
}

/// Calls into the composition runtime or the section stack.
///
/// These are the only names in compiled text with a double-underscore
/// prefix; the parser resolves them once so the interpreter never
/// dispatches on strings for them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Intrinsic {
    /// `__include(name[, data])`
    Include,
    /// `__yield(name)`
    Yield,
    /// `__section_start(name)`
    SectionStart,
    /// `__section_end()`
    SectionEnd,
}

impl Intrinsic {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "__include" => Some(Intrinsic::Include),
            "__yield" => Some(Intrinsic::Yield),
            "__section_start" => Some(Intrinsic::SectionStart),
            "__section_end" => Some(Intrinsic::SectionEnd),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Include => "__include",
            Intrinsic::Yield => "__yield",
            Intrinsic::SectionStart => "__section_start",
            Intrinsic::SectionEnd => "__section_end",
        }
    }

    /// Accepted argument counts, inclusive.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Intrinsic::Include => (1, 2),
            Intrinsic::Yield | Intrinsic::SectionStart => (1, 1),
            Intrinsic::SectionEnd => (0, 0),
        }
    }
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    /// `$name`, stored without the sigil.
    Var(String),
    /// `[a, b]` or `['k' => v]`; entries without a key are appended.
    Array(Vec<(Option<ExprId>, ExprId)>),
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// `cond ? then : otherwise`; `then` is `None` for the short `?:` form.
    Ternary {
        cond: ExprId,
        then: Option<ExprId>,
        otherwise: ExprId,
    },
    Assign {
        op: AssignOp,
        target: ExprId,
        value: ExprId,
    },
    /// `++$x`, `$x++`, `--$x`, `$x--`
    IncDec {
        target: ExprId,
        increment: bool,
        prefix: bool,
    },
    /// `base[index]`; `index` is `None` for the append form `$a[] = v`.
    Index {
        base: ExprId,
        index: Option<ExprId>,
    },
    /// `base->name`
    Property {
        base: ExprId,
        name: String,
    },
    Call {
        name: String,
        args: Vec<ExprId>,
    },
    Intrinsic {
        intrinsic: Intrinsic,
        args: Vec<ExprId>,
    },
}

impl ExprKind {
    /// Whether the expression denotes a storage location.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            ExprKind::Var(_) | ExprKind::Index { .. } | ExprKind::Property { .. }
        )
    }
}

/// Contiguous storage for expressions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    /// Allocate an expression, returning its ID.
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let index = u32::try_from(self.exprs.len()).unwrap_or(u32::MAX - 1);
        self.exprs.push(expr);
        ExprId::new(index)
    }

    /// Get an expression by ID.
    ///
    /// IDs are only ever produced by [`ExprArena::alloc`] on the same arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// One `if`/`elseif` arm.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub condition: ExprId,
    pub body: Vec<Node>,
}

/// Statement tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Literal template text, written verbatim.
    Text(String),
    /// `echo EXPR;`
    Echo { expr: ExprId, span: Span },
    /// `EXPR;`, evaluated for its side effects.
    Eval { expr: ExprId, span: Span },
    If {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Node>>,
    },
    Foreach {
        iterable: ExprId,
        key: Option<String>,
        value: String,
        body: Vec<Node>,
        span: Span,
    },
    For {
        init: Vec<ExprId>,
        condition: Vec<ExprId>,
        step: Vec<ExprId>,
        body: Vec<Node>,
    },
    While {
        condition: ExprId,
        body: Vec<Node>,
    },
}

/// A parsed compiled template.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub arena: ExprArena,
    pub nodes: Vec<Node>,
}

impl Program {
    pub fn new(arena: ExprArena, nodes: Vec<Node>) -> Self {
        Program { arena, nodes }
    }

    /// Number of nodes in the tree, counting nested bodies.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|node| {
                    1 + match node {
                        Node::Text(_) | Node::Echo { .. } | Node::Eval { .. } => 0,
                        Node::If {
                            branches,
                            otherwise,
                        } => {
                            branches.iter().map(|b| count(&b.body)).sum::<usize>()
                                + otherwise.as_deref().map_or(0, count)
                        }
                        Node::Foreach { body, .. }
                        | Node::For { body, .. }
                        | Node::While { body, .. } => count(body),
                    }
                })
                .sum()
        }
        count(&self.nodes)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::ExprId;
    crate::static_assert_size!(ExprId, 4);
}

#[cfg(test)]
mod tests;
