use std::fmt;

/// 1-based line/column position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub line: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(line: usize, col: usize) -> Self {
        Coord { line, col }
    }
}

/// Half-open source range; `end` is just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    pub start: Coord,
    pub end: Coord,
}

impl Span {
    pub fn new(start: Coord, end: Coord) -> Self {
        Span { start, end }
    }

    pub fn point(at: Coord) -> Self {
        Span { start: at, end: at }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            value: value.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Identifier and literal
    Id,
    Int,
    Eof,

    // Double character tokens
    ExclEqual,   // '!='
    LAngleEqual, // '<='
    RAngleEqual, // '>='
    EqualEqual,  // '=='

    // Single character tokens
    Colon,     // ':'
    Comma,     // ','
    Semicolon, // ';'
    Ampasand,  // '&'
    Star,      // '*'
    Slash,     // '/'
    Percent,   // '%'
    LAngle,    // '<'
    RAngle,    // '>'
    Pipe,      // '|'
    Equal,     // '='
    Plus,      // '+'
    Minus,     // '-'
    LBracket,  // '['
    RBracket,  // ']'
    LCurly,    // '{'
    RCurly,    // '}'
    LParen,    // '('
    RParen,    // ')'

    // Keywords
    KwAnd,
    KwBool,
    KwCall,
    KwElse,
    KwFalse,
    KwFunc,
    KwIf,
    KwInt,
    KwLength,
    KwNot,
    KwOr,
    KwPrint,
    KwReturn,
    KwTrue,
    KwVar,
    KwVoid,
    KwWhile,
}

impl TokenKind {
    pub fn text(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Id => "identifier",
            Int => "integer literal",
            Eof => "end of input",
            ExclEqual => "!=",
            LAngleEqual => "<=",
            RAngleEqual => ">=",
            EqualEqual => "==",
            Colon => ":",
            Comma => ",",
            Semicolon => ";",
            Ampasand => "&",
            Star => "*",
            Slash => "/",
            Percent => "%",
            LAngle => "<",
            RAngle => ">",
            Pipe => "|",
            Equal => "=",
            Plus => "+",
            Minus => "-",
            LBracket => "[",
            RBracket => "]",
            LCurly => "{",
            RCurly => "}",
            LParen => "(",
            RParen => ")",
            KwAnd => "and",
            KwBool => "bool",
            KwCall => "call",
            KwElse => "else",
            KwFalse => "false",
            KwFunc => "func",
            KwIf => "if",
            KwInt => "int",
            KwLength => "length",
            KwNot => "not",
            KwOr => "or",
            KwPrint => "print",
            KwReturn => "return",
            KwTrue => "true",
            KwVar => "var",
            KwVoid => "void",
            KwWhile => "while",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
