use super::token::{Coord, Span, Token, TokenKind};
use crate::error::Error;
use std::iter::{Enumerate, Peekable};
use std::str::Chars;

pub struct Lexer<'a> {
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self { code }
    }

    /// Scan the whole source. The result always ends with one `Eof` token.
    pub fn tokenize(self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        let mut end = Coord::new(1, 1);
        for (idx, line) in self.code.lines().enumerate() {
            let lexer = LineLexer::new(line, idx + 1);
            tokens.extend(lexer.parse()?);
            end = Coord::new(idx + 1, line.chars().count() + 1);
        }
        tokens.push(Token::new(TokenKind::Eof, "", Span::point(end)));
        tracing::trace!("scanned {} tokens", tokens.len());
        Ok(tokens)
    }
}

struct LineLexer<'a> {
    iter: Peekable<Enumerate<Chars<'a>>>,
    line: usize,
}

impl<'a> LineLexer<'a> {
    fn new(line: &'a str, lineno: usize) -> Self {
        Self {
            iter: line.chars().enumerate().peekable(),
            line: lineno,
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    fn peek_nth(&self, n: usize) -> Option<(usize, char)> {
        self.iter.clone().nth(n)
    }

    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }

    fn coord(&self, idx: usize) -> Coord {
        Coord::new(self.line, idx + 1)
    }

    fn span(&self, idx: usize, len: usize) -> Span {
        Span::new(self.coord(idx), self.coord(idx + len))
    }
}

// ----------------------------------------------------------------------------
// Scanner
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    fn parse(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some((idx, ch0)) = self.peek_nth(0) {
            // 0. Skip whitespaces
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            // 1. Double character token
            if let Some((_, ch1)) = self.peek_nth(1) {
                // Comment runs to the end of the line
                if ch0 == '/' && ch1 == '/' {
                    break;
                }

                if let Some(kind) = double_char_token(ch0, ch1) {
                    self.consume();
                    self.consume();
                    let text: String = [ch0, ch1].iter().collect();
                    tokens.push(Token::new(kind, text, self.span(idx, 2)));
                    continue;
                }
            }

            // 2. Single character token
            if let Some(kind) = single_char_token(ch0) {
                self.consume();
                tokens.push(Token::new(kind, ch0.to_string(), self.span(idx, 1)));
                continue;
            }

            // 3. Integer literal
            if ch0.is_ascii_digit() {
                tokens.push(self.parse_number(idx)?);
                continue;
            }

            // 4. Identifier or keyword
            if ch0.is_ascii_alphabetic() || ch0 == '_' {
                tokens.push(self.parse_word(idx));
                continue;
            }

            return Err(Error::scan(
                format!("unexpected character '{}'", ch0),
                self.span(idx, 1),
            ));
        }
        Ok(tokens)
    }

    fn parse_word(&mut self, idx: usize) -> Token {
        let mut lexeme = String::new();
        while let Some((_, ch)) = self
            .iter
            .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9' | 'a'..='z' | 'A'..='Z'))
        {
            lexeme.push(ch);
        }
        let span = self.span(idx, lexeme.chars().count());
        let kind = keyword(&lexeme).unwrap_or(TokenKind::Id);
        Token::new(kind, lexeme, span)
    }

    fn parse_number(&mut self, idx: usize) -> Result<Token, Error> {
        let mut lexeme = String::new();
        while let Some((_, ch)) = self.iter.next_if(|(_, ch)| ch.is_ascii_digit()) {
            lexeme.push(ch);
        }
        let span = self.span(idx, lexeme.len());
        match lexeme.parse::<i64>() {
            Ok(_) => Ok(Token::new(TokenKind::Int, lexeme, span)),
            Err(_) => Err(Error::scan(
                format!("integer literal {} is out of range", lexeme),
                span,
            )),
        }
    }
}

fn double_char_token(ch0: char, ch1: char) -> Option<TokenKind> {
    match (ch0, ch1) {
        ('=', '=') => Some(TokenKind::EqualEqual),
        ('!', '=') => Some(TokenKind::ExclEqual),
        ('<', '=') => Some(TokenKind::LAngleEqual),
        ('>', '=') => Some(TokenKind::RAngleEqual),
        _ => None,
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        ':' => Some(TokenKind::Colon),
        ',' => Some(TokenKind::Comma),
        ';' => Some(TokenKind::Semicolon),
        '&' => Some(TokenKind::Ampasand),
        '*' => Some(TokenKind::Star),
        '/' => Some(TokenKind::Slash),
        '%' => Some(TokenKind::Percent),
        '<' => Some(TokenKind::LAngle),
        '>' => Some(TokenKind::RAngle),
        '|' => Some(TokenKind::Pipe),
        '=' => Some(TokenKind::Equal),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '{' => Some(TokenKind::LCurly),
        '}' => Some(TokenKind::RCurly),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        _ => None,
    }
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "and" => Some(TokenKind::KwAnd),
        "bool" => Some(TokenKind::KwBool),
        "call" => Some(TokenKind::KwCall),
        "else" => Some(TokenKind::KwElse),
        "false" => Some(TokenKind::KwFalse),
        "func" => Some(TokenKind::KwFunc),
        "if" => Some(TokenKind::KwIf),
        "int" => Some(TokenKind::KwInt),
        "length" => Some(TokenKind::KwLength),
        "not" => Some(TokenKind::KwNot),
        "or" => Some(TokenKind::KwOr),
        "print" => Some(TokenKind::KwPrint),
        "return" => Some(TokenKind::KwReturn),
        "true" => Some(TokenKind::KwTrue),
        "var" => Some(TokenKind::KwVar),
        "void" => Some(TokenKind::KwVoid),
        "while" => Some(TokenKind::KwWhile),
        _ => None,
    }
}
