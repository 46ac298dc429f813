use tauc::grammer::token::{TokenKind, TokenKind::*};
use tauc::{Error, Lexer};

fn assert(code: &str, expects: Vec<TokenKind>) {
    let tokens = Lexer::new(code).tokenize().unwrap();

    println!(" {code}");
    for (idx, token) in tokens.iter().enumerate() {
        println!("{:>2}: {:?} {:?} at {}", idx, token.kind, token.value, token.span);
    }

    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(kinds, expects);
}

macro_rules! case {
    ($name:ident, $code:expr, [$($kind:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            assert($code, vec![$($kind),*]);
        }
    };
}

case!(empty, "", [Eof]);
case!(comment_only, "// nothing here", [Eof]);
case!(double_char, "== != <= >=", [EqualEqual, ExclEqual, LAngleEqual, RAngleEqual, Eof]);
case!(
    single_char,
    ": , ; & * / % < > | = + - [ ] { } ( )",
    [
        Colon, Comma, Semicolon, Ampasand, Star, Slash, Percent, LAngle, RAngle, Pipe, Equal,
        Plus, Minus, LBracket, RBracket, LCurly, RCurly, LParen, RParen, Eof,
    ]
);
case!(
    keywords,
    "and bool call else false func if int length not or print return true var void while",
    [
        KwAnd, KwBool, KwCall, KwElse, KwFalse, KwFunc, KwIf, KwInt, KwLength, KwNot, KwOr,
        KwPrint, KwReturn, KwTrue, KwVar, KwVoid, KwWhile, Eof,
    ]
);
case!(identifiers, "x _tmp iffy var2", [Id, Id, Id, Id, Eof]);
case!(no_space, "a<=b", [Id, LAngleEqual, Id, Eof]);
case!(assign_not_equal, "x=1", [Id, Equal, Int, Eof]);
case!(
    func_header,
    "func main(a: int): bool { // trailing comment",
    [KwFunc, Id, LParen, Id, Colon, KwInt, RParen, Colon, KwBool, LCurly, Eof]
);
case!(
    multi_line,
    "var x: [3]int\nx[0] = 12",
    [KwVar, Id, Colon, LBracket, Int, RBracket, KwInt, Id, LBracket, Int, RBracket, Equal, Int, Eof]
);

#[test]
fn spans_are_one_based() {
    let tokens = Lexer::new("var x: int\n  print x").tokenize().unwrap();
    let spans: Vec<String> = tokens.iter().map(|token| token.span.to_string()).collect();
    assert_eq!(
        spans,
        vec!["1:1-1:4", "1:5-1:6", "1:6-1:7", "1:8-1:11", "2:3-2:8", "2:9-2:10", "2:10-2:10"]
    );
}

#[test]
fn token_text() {
    let tokens = Lexer::new("count 042").tokenize().unwrap();
    assert_eq!(tokens[0].value, "count");
    assert_eq!(tokens[1].value, "042");
}

#[test]
fn unknown_character() {
    let err = Lexer::new("x = 1 @ 2").tokenize().unwrap_err();
    assert!(matches!(err, Error::Scan { .. }), "{err}");
    assert_eq!(err.span().unwrap().to_string(), "1:7-1:8");
}

#[test]
fn lone_bang() {
    let err = Lexer::new("!x").tokenize().unwrap_err();
    assert!(matches!(err, Error::Scan { .. }), "{err}");
}

#[test]
fn integer_overflow() {
    let err = Lexer::new("print 99999999999999999999").tokenize().unwrap_err();
    assert!(matches!(err, Error::Scan { .. }), "{err}");
    assert_eq!(err.span().unwrap().to_string(), "1:7-1:27");
}
