//! Token definitions for the Idzey lexer.

/// Kinds of tokens produced by the lexer. Literal payloads (identifier
/// names, number values, string contents) ride inside the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Number(f64),
    Str(String),
    // keywords
    Func,
    Print,
    Println,
    Loop,
    If,
    Else,
    Return,
    Var,
    True,
    False,
    Null,
    Break,
    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    // operators
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Percent,   // %
    Assign,    // =
    EqEq,      // ==
    NotEq,     // !=
    Less,      // <
    LessEq,    // <=
    Greater,   // >
    GreaterEq, // >=
    Bang,      // !
    AndAnd,    // &&
    OrOr,      // ||
    Eof,
    /// A lexical error; the message doubles as the token's lexeme.
    Error(String),
}

impl TokenKind {
    /// Diagnostic name used in parse-error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "IDENTIFIER",
            TokenKind::Number(_) => "NUMBER",
            TokenKind::Str(_) => "STRING",
            TokenKind::Func => "FUNC",
            TokenKind::Print => "PRINT",
            TokenKind::Println => "PRINTLN",
            TokenKind::Loop => "LOOP",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::Var => "VAR",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Null => "NULL",
            TokenKind::Break => "BREAK",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Dot => "DOT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "MULTIPLY",
            TokenKind::Slash => "DIVIDE",
            TokenKind::Percent => "MODULO",
            TokenKind::Assign => "ASSIGN",
            TokenKind::EqEq => "EQUALS",
            TokenKind::NotEq => "NOT_EQUALS",
            TokenKind::Less => "LESS",
            TokenKind::LessEq => "LESS_EQ",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEq => "GREATER_EQ",
            TokenKind::Bang => "BANG",
            TokenKind::AndAnd => "AND",
            TokenKind::OrOr => "OR",
            TokenKind::Eof => "EOF",
            TokenKind::Error(_) => "ERROR",
        }
    }
}

/// A token with its exact source text and the 1-based line and column of
/// its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            col,
        }
    }
}
