//! Token types for code blocks.

use std::fmt;

use slate_ir::Span;

/// A token with its span in the compiled text.
#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    Int(i64),
    Float(f64),
    /// String literal, escapes already processed.
    Str(String),

    // === Names ===
    /// `$name`, without the sigil.
    Variable(String),
    Ident(String),

    // === Keywords ===
    Echo,
    If,
    ElseIf,
    Else,
    EndIf,
    Foreach,
    EndForeach,
    As,
    For,
    EndFor,
    While,
    EndWhile,
    True,
    False,
    Null,
    /// Word form of `&&`
    And,
    /// Word form of `||`
    Or,

    // === Delimiters ===
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Question,
    DoubleQuestion,
    FatArrow,
    Arrow,

    // === Operators ===
    Dot,
    DotEq,
    Eq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    PlusEq,
    PlusPlus,
    Minus,
    MinusEq,
    MinusMinus,
    Star,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Bang,
    AmpAmp,
    PipePipe,

    /// `%>`, ends the code block.
    CloseTag,
    /// Unrecognised input.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Float(f) => format!("float `{f}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Variable(name) => format!("variable `${name}`"),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::CloseTag => "`%>`".to_string(),
            TokenKind::Error => "invalid input".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Echo => "echo",
            TokenKind::If => "if",
            TokenKind::ElseIf => "elseif",
            TokenKind::Else => "else",
            TokenKind::EndIf => "endif",
            TokenKind::Foreach => "foreach",
            TokenKind::EndForeach => "endforeach",
            TokenKind::As => "as",
            TokenKind::For => "for",
            TokenKind::EndFor => "endfor",
            TokenKind::While => "while",
            TokenKind::EndWhile => "endwhile",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::DoubleQuestion => "??",
            TokenKind::FatArrow => "=>",
            TokenKind::Arrow => "->",
            TokenKind::Dot => ".",
            TokenKind::DotEq => ".=",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::EqEqEq => "===",
            TokenKind::NotEq => "!=",
            TokenKind::NotEqEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::PlusEq => "+=",
            TokenKind::PlusPlus => "++",
            TokenKind::Minus => "-",
            TokenKind::MinusEq => "-=",
            TokenKind::MinusMinus => "--",
            TokenKind::Star => "*",
            TokenKind::StarEq => "*=",
            TokenKind::Slash => "/",
            TokenKind::SlashEq => "/=",
            TokenKind::Percent => "%",
            TokenKind::PercentEq => "%=",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::CloseTag => "%>",
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Variable(_)
            | TokenKind::Ident(_)
            | TokenKind::Error
            | TokenKind::Eof => "",
        }
    }
}

/// Tokens of one code block.
#[derive(Clone, Debug, Default)]
pub struct TokenList {
    /// Tokens, always terminated by a single [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    /// Span of the closing `%>`, `None` if the text ended first.
    pub close: Option<Span>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Byte offset just past the block, or `None` if it is unterminated.
    pub fn end(&self) -> Option<usize> {
        self.close.map(|span| span.end as usize)
    }
}
