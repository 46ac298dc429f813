use super::token::{Coord, Span, Token, TokenKind};
use crate::error::Error;
use std::iter::Peekable;

pub struct Parser<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    last: Coord,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
            last: Coord::new(1, 1),
        }
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    /// Peek : Watch next token without consuming it
    pub fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    /// Next : Consume next token and return it
    pub fn next(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.last = token.span.end;
        Some(token)
    }

    /// Start coordinate of the next token
    pub fn start(&mut self) -> Coord {
        match self.tokens.peek() {
            Some(token) => token.span.start,
            None => self.last,
        }
    }

    /// Span from `start` up to the end of the last consumed token
    pub fn span_from(&self, start: Coord) -> Span {
        Span::new(start, self.last.max(start))
    }

    /// Zero-width span just after the last consumed token
    pub fn here(&self) -> Span {
        Span::point(self.last)
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> bool {
        self.tokens.peek().is_some_and(|token| cond(token))
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Option<Token> {
        if self.check_if(cond) {
            self.next()
        } else {
            None
        }
    }

    /// Next token must be match with condition
    pub fn expect_tobe<F: Fn(&Token) -> bool>(
        &mut self,
        cond: F,
        what: &str,
    ) -> Result<Token, Error> {
        if let Some(token) = self.tokens.peek() {
            if !cond(token) {
                return Err(unexpected(token, what));
            }
        }
        match self.next() {
            Some(token) => Ok(token),
            None => Err(Error::parse(
                format!("expected {} but input ended", what),
                self.here(),
            )),
        }
    }

    /// Error for the next token, which does not fit `what`
    pub fn unexpected(&mut self, what: &str) -> Error {
        if let Some(token) = self.tokens.peek() {
            return unexpected(token, what);
        }
        Error::parse(format!("expected {} but input ended", what), self.here())
    }
}

fn unexpected(token: &Token, what: &str) -> Error {
    let found = match token.kind {
        TokenKind::Eof => token.kind.text().to_string(),
        _ => format!("'{}'", token.value),
    };
    Error::parse(format!("expected {} but found {}", what, found), token.span)
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:pat, $what:expr) => {
        $parser.expect_tobe(|token| matches!(&token.kind, $kind), $what)
    };
}

#[macro_export]
macro_rules! optional {
    ($parser:expr, $trigger:pat, $following:expr) => {
        if $crate::check!($parser, $trigger) {
            $parser.next();
            Some($following)
        } else {
            None
        }
    };
    ($parser:expr, $trigger:pat) => {
        $parser.consume_if(|token| matches!(&token.kind, $trigger))
    };
}

/// Parse repeated elements with optional delimiters
/// 3 args: { element } terminal (no delimiter)
/// 4 args: [ element { delimiter element } ] terminal (with delimiter)
#[macro_export]
macro_rules! repeat {
    // Without delimiter: { element } terminal
    ($parser:expr, $elem:expr, $terminal:pat) => {{
        let mut items = Vec::new();
        while !$crate::check!($parser, $terminal) {
            items.push($elem?);
        }
        items
    }};

    // With delimiter: [ element { delimiter element } ] terminal
    ($parser:expr, $elem:expr, $delimiter:pat, $terminal:pat) => {{
        let mut items = Vec::new();
        if !$crate::check!($parser, $terminal) {
            items.push($elem?);
            while $crate::check!($parser, $delimiter) {
                $parser.next();
                items.push($elem?);
            }
        }
        items
    }};
}
