//! Lexer for Slate code blocks using logos.
//!
//! Compiled templates interleave literal text with `<% ... %>` code blocks.
//! [`lex_block`] tokenizes one block starting just after its `<%` and stops
//! at the matching `%>`. A `%>` inside a string literal or a block comment
//! does not close the block; inside a `//` comment it does.

mod escape;
mod token;

use logos::Logos;
use slate_ir::Span;

pub use token::{Token, TokenKind, TokenList};

/// Raw token from logos.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[token("//", line_comment)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("%>")]
    CloseTag,

    // === Keywords ===
    #[token("echo")]
    Echo,
    #[token("if")]
    If,
    #[token("elseif")]
    ElseIf,
    #[token("else")]
    Else,
    #[token("endif")]
    EndIf,
    #[token("foreach")]
    Foreach,
    #[token("endforeach")]
    EndForeach,
    #[token("as")]
    As,
    #[token("for")]
    For,
    #[token("endfor")]
    EndFor,
    #[token("while")]
    While,
    #[token("endwhile")]
    EndWhile,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("and")]
    And,
    #[token("or")]
    Or,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("??")]
    DoubleQuestion,
    #[token("=>")]
    FatArrow,
    #[token("->")]
    Arrow,

    // === Operators ===
    #[token(".")]
    Dot,
    #[token(".=")]
    DotEq,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("===")]
    EqEqEq,
    #[token("!=")]
    #[token("<>")]
    NotEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("+=")]
    PlusEq,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("-=")]
    MinusEq,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Star,
    #[token("*=")]
    StarEq,
    #[token("/")]
    Slash,
    #[token("/=")]
    SlashEq,
    #[token("%")]
    Percent,
    #[token("%=")]
    PercentEq,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    // === Literals ===
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleString,

    #[regex(r"'([^'\\]|\\.)*'")]
    SingleString,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    Variable,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Consume a `//` comment up to the end of the line or the closing tag,
/// whichever comes first.
fn line_comment(lex: &mut logos::Lexer<RawToken>) {
    let rest = lex.remainder();
    let newline = rest.find('\n').unwrap_or(rest.len());
    let close = rest.find("%>").unwrap_or(rest.len());
    lex.bump(newline.min(close));
}

/// Consume a `/* ... */` comment. Unterminated comments are an error.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(rest.len());
            false
        }
    }
}

/// Tokenize the code block whose body starts at byte `start` of `source`.
///
/// Spans are absolute offsets into `source`. The returned list always ends
/// with an `Eof` token; [`TokenList::close`] records where the block's `%>`
/// was found.
pub fn lex_block(source: &str, start: usize) -> TokenList {
    let mut list = TokenList::new();
    let body = source.get(start..).unwrap_or("");
    let base = u32::try_from(start).unwrap_or(u32::MAX);
    let mut raw_tokens = RawToken::lexer(body);

    while let Some(next) = raw_tokens.next() {
        let span = Span::from_range(raw_tokens.span()).offset_by(base);
        let kind = match next {
            Ok(RawToken::LineComment | RawToken::BlockComment) => continue,
            Ok(RawToken::CloseTag) => {
                list.close = Some(span);
                break;
            }
            Ok(raw) => convert_token(raw, raw_tokens.slice()),
            Err(()) => TokenKind::Error,
        };
        list.tokens.push(Token::new(kind, span));
    }

    let eof_at = list
        .close
        .map_or_else(|| u32::try_from(source.len()).unwrap_or(u32::MAX), |close| close.start);
    list.tokens.push(Token::new(TokenKind::Eof, Span::point(eof_at)));
    list
}

/// Tokenize a whole string as the body of a single code block.
pub fn lex(source: &str) -> TokenList {
    lex_block(source, 0)
}

fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f),
        RawToken::DoubleString => TokenKind::Str(escape::unescape_double(strip_quotes(slice))),
        RawToken::SingleString => TokenKind::Str(escape::unescape_single(strip_quotes(slice))),
        RawToken::Variable => TokenKind::Variable(slice[1..].to_string()),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::Echo => TokenKind::Echo,
        RawToken::If => TokenKind::If,
        RawToken::ElseIf => TokenKind::ElseIf,
        RawToken::Else => TokenKind::Else,
        RawToken::EndIf => TokenKind::EndIf,
        RawToken::Foreach => TokenKind::Foreach,
        RawToken::EndForeach => TokenKind::EndForeach,
        RawToken::As => TokenKind::As,
        RawToken::For => TokenKind::For,
        RawToken::EndFor => TokenKind::EndFor,
        RawToken::While => TokenKind::While,
        RawToken::EndWhile => TokenKind::EndWhile,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::DoubleQuestion => TokenKind::DoubleQuestion,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Arrow => TokenKind::Arrow,

        RawToken::Dot => TokenKind::Dot,
        RawToken::DotEq => TokenKind::DotEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::NotEqEq => TokenKind::NotEqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::Star => TokenKind::Star,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::Slash => TokenKind::Slash,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::Percent => TokenKind::Percent,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,

        // Trivia and the close tag are consumed by the lexing loop.
        RawToken::LineComment | RawToken::BlockComment | RawToken::CloseTag => TokenKind::Error,
    }
}

fn strip_quotes(slice: &str) -> &str {
    slice.get(1..slice.len().saturating_sub(1)).unwrap_or("")
}
