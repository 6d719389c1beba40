//! Lexical analysis.
//!
//! Tokens are recognized by [`logos`]. Where several rules could match at the same position, logos
//! takes the longest match and then prefers literal `#[token]`s over `#[regex]`es of equal length.
//! This gives the rule order the language relies on: keywords are only recognized as whole words
//! (`letter` is an identifier), floats win over integers (`1.5`), and two character operators win
//! over their one character prefixes (`==` over `=`).

use std::fmt;
use std::ops::Range;

use logos::Logos;
use nyr_source::{Position, Source};

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok().filter(|val| val.is_finite()))]
    Float(f64),
    #[regex(r"[0-9]+", |lex| lex.slice().parse())]
    Integer(i64),
    #[regex(r#""[^"]*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    String(String),

    // identifiers
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // keywords
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("def")]
    Def,
    #[token("return")]
    Return,
    #[token("class")]
    Class,
    #[token("this")]
    This,
    #[token("super")]
    Super,

    // punctuation
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,

    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - assignment
    #[token("=")]
    Equals,
    #[token("+=")]
    PlusEquals,
    #[token("-=")]
    MinusEquals,
    #[token("*=")]
    AsteriskEquals,
    #[token("/=")]
    SlashEquals,
    #[token("%=")]
    PercentEquals,
    // - arithmetics
    #[token("+")]
    Plus, // NOTE: can also be unary
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    // - logical
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    // - bitwise
    #[token("&")]
    Ampersand,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    // - ordering
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,

    // misc
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)] // block comments
    #[error]
    Error,

    /// Only generated once the source is exhausted.
    Eof,
}

/// The kind of a [`Token`], without its literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Float,
    Integer,
    String,
    Identifier,
    Let,
    If,
    Else,
    True,
    False,
    Null,
    While,
    Do,
    For,
    Def,
    Return,
    Class,
    This,
    Super,
    Semi,
    Comma,
    Colon,
    Dot,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    EqualsEquals,
    NotEquals,
    Equals,
    PlusEquals,
    MinusEquals,
    AsteriskEquals,
    SlashEquals,
    PercentEquals,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    AndAnd,
    OrOr,
    Bang,
    Ampersand,
    Caret,
    Pipe,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    Error,
    Eof,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Float(_) => TokenKind::Float,
            Token::Integer(_) => TokenKind::Integer,
            Token::String(_) => TokenKind::String,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::Let => TokenKind::Let,
            Token::If => TokenKind::If,
            Token::Else => TokenKind::Else,
            Token::True => TokenKind::True,
            Token::False => TokenKind::False,
            Token::Null => TokenKind::Null,
            Token::While => TokenKind::While,
            Token::Do => TokenKind::Do,
            Token::For => TokenKind::For,
            Token::Def => TokenKind::Def,
            Token::Return => TokenKind::Return,
            Token::Class => TokenKind::Class,
            Token::This => TokenKind::This,
            Token::Super => TokenKind::Super,
            Token::Semi => TokenKind::Semi,
            Token::Comma => TokenKind::Comma,
            Token::Colon => TokenKind::Colon,
            Token::Dot => TokenKind::Dot,
            Token::OpenBrace => TokenKind::OpenBrace,
            Token::CloseBrace => TokenKind::CloseBrace,
            Token::OpenParen => TokenKind::OpenParen,
            Token::CloseParen => TokenKind::CloseParen,
            Token::OpenBracket => TokenKind::OpenBracket,
            Token::CloseBracket => TokenKind::CloseBracket,
            Token::EqualsEquals => TokenKind::EqualsEquals,
            Token::NotEquals => TokenKind::NotEquals,
            Token::Equals => TokenKind::Equals,
            Token::PlusEquals => TokenKind::PlusEquals,
            Token::MinusEquals => TokenKind::MinusEquals,
            Token::AsteriskEquals => TokenKind::AsteriskEquals,
            Token::SlashEquals => TokenKind::SlashEquals,
            Token::PercentEquals => TokenKind::PercentEquals,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Asterisk => TokenKind::Asterisk,
            Token::Slash => TokenKind::Slash,
            Token::Percent => TokenKind::Percent,
            Token::AndAnd => TokenKind::AndAnd,
            Token::OrOr => TokenKind::OrOr,
            Token::Bang => TokenKind::Bang,
            Token::Ampersand => TokenKind::Ampersand,
            Token::Caret => TokenKind::Caret,
            Token::Pipe => TokenKind::Pipe,
            Token::GreaterThan => TokenKind::GreaterThan,
            Token::GreaterThanEquals => TokenKind::GreaterThanEquals,
            Token::LessThan => TokenKind::LessThan,
            Token::LessThanEquals => TokenKind::LessThanEquals,
            Token::Error => TokenKind::Error,
            Token::Eof => TokenKind::Eof,
        }
    }
}

impl TokenKind {
    /// Returns how the kind is spelled in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Float => "FLOAT",
            TokenKind::Integer => "INTEGER",
            TokenKind::String => "STRING",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Let => "let",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::For => "for",
            TokenKind::Def => "def",
            TokenKind::Return => "return",
            TokenKind::Class => "class",
            TokenKind::This => "this",
            TokenKind::Super => "super",
            TokenKind::Semi => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::EqualsEquals => "==",
            TokenKind::NotEquals => "!=",
            TokenKind::Equals => "=",
            TokenKind::PlusEquals => "+=",
            TokenKind::MinusEquals => "-=",
            TokenKind::AsteriskEquals => "*=",
            TokenKind::SlashEquals => "/=",
            TokenKind::PercentEquals => "%=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Ampersand => "&",
            TokenKind::Caret => "^",
            TokenKind::Pipe => "|",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEquals => ">=",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEquals => "<=",
            TokenKind::Error => "ERROR",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Float(val) => write!(f, "{:?}", val),
            Token::Integer(val) => write!(f, "{}", val),
            Token::String(val) => write!(f, "\"{}\"", val),
            Token::Identifier(ident) => write!(f, "{}", ident),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

/// A [`Token`] together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    /// Byte range of the token in the source.
    pub span: Range<usize>,
    pub position: Position,
}

impl SpannedToken {
    pub fn kind(&self) -> TokenKind {
        self.token.kind()
    }
}

/// Represents a lexical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No rule matches at `position`.
    UnrecognizedInput { position: Position, snippet: String },
    /// A `"` without a closing `"`.
    UnterminatedString { position: Position, snippet: String },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnrecognizedInput { position, .. }
            | LexError::UnterminatedString { position, .. } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnrecognizedInput { position, snippet } => write!(
                f,
                "could not parse input ({}), starting here: {}",
                position, snippet
            ),
            LexError::UnterminatedString { position, snippet } => {
                write!(f, "unterminated string ({}): {}", position, snippet)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Turns `content` into tokens. The last token is always [`Token::Eof`].
pub fn tokenize(content: &str) -> Result<Vec<SpannedToken>, LexError> {
    let source = Source::new(content);
    let mut lexer = Token::lexer(content);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let position = source.position(span.start);

        if token == Token::Error {
            let snippet = source.rest_of_line(span.start).to_string();
            return Err(if content[span.start..].starts_with('"') {
                LexError::UnterminatedString { position, snippet }
            } else {
                LexError::UnrecognizedInput { position, snippet }
            });
        }

        tokens.push(SpannedToken {
            token,
            span,
            position,
        });
    }

    let end = content.len();
    tokens.push(SpannedToken {
        token: Token::Eof,
        span: end..end,
        position: source.position(end),
    });
    Ok(tokens)
}
