//! Tokens for the BUILD file grammar.

use crate::ast::Expr;
use crate::error::ParseError;
use crate::format::quote_escape;
use logos::Logos;
use std::iter::Peekable;
use std::ops::Range;
use std::str::Chars;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"([ \t\r\f]+|\\\r?\n)")]
pub(crate) enum Token {
    #[regex(r"#[^\n]*", |lex| lex.slice().trim_end().to_string())]
    Comment(String),

    #[token("\n")]
    Newline,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Int(String),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    Float(String),

    #[regex(r#"[rR]?"([^"\\\n]|\\(.|\n))*""#, |lex| StrLit::lex(lex.slice()))]
    #[regex(r#"[rR]?'([^'\\\n]|\\(.|\n))*'"#, |lex| StrLit::lex(lex.slice()))]
    Str(StrLit),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Comment(_) => "comment".to_string(),
            Token::Newline => "newline".to_string(),
            Token::Ident(s) => format!("identifier {s:?}"),
            Token::Int(s) | Token::Float(s) => format!("number {s}"),
            Token::Str(_) => "string".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
        }
    }
}

/// A string literal's decoded value, plus its source text when re-quoting the value would not
/// reproduce what was written.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StrLit {
    pub(crate) value: String,
    pub(crate) verbatim: Option<String>,
}

impl StrLit {
    fn lex(slice: &str) -> Self {
        let (raw, quoted) = match slice.strip_prefix(['r', 'R']) {
            Some(rest) => (true, rest),
            None => (false, slice),
        };
        let inner = &quoted[1..quoted.len() - 1];
        let (value, exact) = if raw {
            (inner.to_string(), false)
        } else {
            unquote(inner)
        };
        Self {
            value,
            verbatim: (!exact).then(|| slice.to_string()),
        }
    }

    pub(crate) fn into_expr(self) -> Expr {
        match self.verbatim {
            Some(text) => Expr::Verbatim {
                value: self.value,
                text,
            },
            None => Expr::Str(self.value),
        }
    }
}

pub(crate) type Spanned = (Token, Range<usize>);

/// Lex the whole source. The first unrecognized character is a syntax error.
pub(crate) fn tokenize(file: &str, src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut lexer = Token::lexer(src);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => out.push((token, lexer.span())),
            Err(()) => {
                let span = lexer.span();
                let message = match src[span.clone()].chars().next() {
                    Some('"') | Some('\'') => "unterminated string literal".to_string(),
                    Some(c) => format!("unexpected character {c:?}"),
                    None => "unexpected end of file".to_string(),
                };
                return Err(ParseError::at_offset(file, src.as_bytes(), span.start, message));
            }
        }
    }
    Ok(out)
}

/// Resolve the escapes of a quoted string's body.
///
/// The flag is false when the formatter would write some escape differently, or when an
/// escape is unknown. Unknown escapes are kept verbatim.
fn unquote(inner: &str) -> (String, bool) {
    let mut out = String::with_capacity(inner.len());
    let mut exact = true;
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            exact = false;
            break;
        };
        match escape {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' | '"' | '\'' => out.push(escape),
            'a' | 'b' | 'f' | 'v' => {
                exact = false;
                out.push(match escape {
                    'a' => '\x07',
                    'b' => '\x08',
                    'f' => '\x0c',
                    _ => '\x0b',
                });
            }
            // Escaped newline: line continuation inside the literal.
            '\n' => exact = false,
            '0'..='7' => {
                let mut digits = String::from(escape);
                digits.push_str(&take_digits(&mut chars, 8, 2));
                exact = false;
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits = take_digits(&mut chars, 16, width);
                let decoded = u32::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|_| digits.len() == width)
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        let written = format!("\\{escape}{digits}");
                        exact &= quote_escape(ch).as_deref() == Some(written.as_str());
                        out.push(ch);
                    }
                    None => {
                        out.push('\\');
                        out.push(escape);
                        out.push_str(&digits);
                        exact = false;
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
                exact = false;
            }
        }
    }
    (out, exact)
}

/// Up to `max` digits of `radix` from the front of `chars`.
fn take_digits(chars: &mut Peekable<Chars<'_>>, radix: u32, max: usize) -> String {
    let mut digits = String::new();
    while digits.len() < max {
        match chars.next_if(|c| c.is_digit(radix)) {
            Some(c) => digits.push(c),
            None => break,
        }
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(value: &str) -> StrLit {
        StrLit {
            value: value.to_string(),
            verbatim: None,
        }
    }

    fn verbatim(value: &str, text: &str) -> StrLit {
        StrLit {
            value: value.to_string(),
            verbatim: Some(text.to_string()),
        }
    }

    fn kinds(src: &str) -> Vec<Token> {
        tokenize("BUILD", src)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn lexes_rule_call() {
        assert_eq!(
            kinds("go_library(name = \"x\")\n"),
            vec![
                Token::Ident("go_library".into()),
                Token::LParen,
                Token::Ident("name".into()),
                Token::Eq,
                Token::Str(exact("x")),
                Token::RParen,
                Token::Newline,
            ]
        );
    }

    #[test]
    fn strings_resolve_escapes_and_both_quotes() {
        assert_eq!(kinds(r#""a\"b\\c""#), vec![Token::Str(exact("a\"b\\c"))]);
        assert_eq!(kinds(r"'it\'s'"), vec![Token::Str(exact("it's"))]);
        assert_eq!(kinds(r#""\d""#), vec![Token::Str(verbatim("\\d", r#""\d""#))]);
    }

    #[test]
    fn decodes_every_starlark_escape() {
        let cases = [
            (r#""\x41\101""#, "AA"),
            (r#""\u00e9\U0001F600""#, "\u{e9}\u{1F600}"),
            (r#""\a\b\f\v""#, "\x07\x08\x0c\x0b"),
            ("\"one\\\ntwo\"", "onetwo"),
            (r#""\0""#, "\0"),
        ];
        for (src, value) in cases {
            assert_eq!(kinds(src), vec![Token::Str(verbatim(value, src))], "{src}");
        }
    }

    #[test]
    fn formatter_escapes_stay_exact() {
        assert_eq!(kinds(r#""\x07\n\t""#), vec![Token::Str(exact("\x07\n\t"))]);
        // Upper-case hex digits are not what the formatter writes.
        assert_eq!(kinds(r#""\x1B""#), vec![Token::Str(verbatim("\x1b", r#""\x1B""#))]);
    }

    #[test]
    fn raw_strings_keep_backslashes() {
        assert_eq!(
            kinds(r#"r"\d+\"" R'\n'"#),
            vec![
                Token::Str(verbatim(r#"\d+\""#, r#"r"\d+\"""#)),
                Token::Str(verbatim(r"\n", r"R'\n'")),
            ]
        );
    }

    #[test]
    fn numbers_and_comments() {
        assert_eq!(
            kinds("x = 1.5 + 2 # note  \n"),
            vec![
                Token::Ident("x".into()),
                Token::Eq,
                Token::Float("1.5".into()),
                Token::Plus,
                Token::Int("2".into()),
                Token::Comment("# note".into()),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn line_continuation_is_skipped() {
        assert_eq!(
            kinds("a \\\n+ b"),
            vec![Token::Ident("a".into()), Token::Plus, Token::Ident("b".into())]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("BUILD", "x = \"abc\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 5);
        assert!(err.message.contains("unterminated"), "{err}");
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = tokenize("BUILD", "x = 1\ny = $\n").unwrap_err();
        assert_eq!((err.line, err.column), (2, 5));
    }
}
