//! Go file header scanning: build constraints, package clause and imports.

use crate::error::PackageError;
use camino::Utf8Path;
use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f\u{feff}]+")]
enum Token {
    #[regex(r"//[^\n]*", |lex| lex.slice().trim_end().to_string())]
    LineComment(String),

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("package")]
    Package,

    #[token("import")]
    Import,

    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r"`[^`]*`", |lex| lex.slice().trim_matches('`').to_string())]
    Str(String),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
}

/// What gazel needs from the top of a Go file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub package: String,
    /// Import paths in declaration order.
    pub imports: Vec<String>,
    /// The file opts out of every build with an `ignore` constraint.
    pub ignored: bool,
}

/// Scan the package clause and import declarations of `src`.
///
/// Scanning stops at the first declaration that is not an import, so the rest of the file may
/// contain anything.
pub(crate) fn scan_header(file: &Utf8Path, src: &str) -> Result<Header, PackageError> {
    let mut tokens = Tokens {
        file,
        src,
        lexer: Token::lexer(src),
        comments: Vec::new(),
    };

    let package = match tokens.next()? {
        Some(Token::Package) => match tokens.next()? {
            Some(Token::Ident(name)) => name,
            _ => return Err(tokens.error("expected package name")),
        },
        _ => return Err(tokens.error("expected package clause")),
    };
    let ignored = tokens.comments.iter().any(|c| ignores_build(c));

    let mut imports = Vec::new();
    loop {
        match tokens.next_lenient() {
            Some(Token::Semicolon) => {}
            Some(Token::Import) => match tokens.next()? {
                Some(Token::LParen) => loop {
                    match tokens.next()? {
                        Some(Token::RParen) => break,
                        Some(Token::Semicolon) => {}
                        Some(first) => imports.push(tokens.import_spec(first)?),
                        None => return Err(tokens.error("unterminated import group")),
                    }
                },
                Some(first) => imports.push(tokens.import_spec(first)?),
                None => return Err(tokens.error("expected import path")),
            },
            _ => break,
        }
    }

    Ok(Header {
        package,
        imports,
        ignored,
    })
}

/// `//go:build ignore` or `// +build ignore`.
fn ignores_build(comment: &str) -> bool {
    comment
        .strip_prefix("//go:build")
        .or_else(|| comment.strip_prefix("// +build"))
        .is_some_and(|constraint| constraint.split_whitespace().eq(["ignore"]))
}

struct Tokens<'a> {
    file: &'a Utf8Path,
    src: &'a str,
    lexer: logos::Lexer<'a, Token>,
    /// Line comments seen so far.
    comments: Vec<String>,
}

impl Tokens<'_> {
    /// Next token that is not a comment.
    fn next(&mut self) -> Result<Option<Token>, PackageError> {
        loop {
            match self.lexer.next() {
                None => return Ok(None),
                Some(Ok(Token::LineComment(text))) => self.comments.push(text),
                Some(Ok(Token::BlockComment)) => {}
                Some(Ok(token)) => return Ok(Some(token)),
                Some(Err(())) => {
                    let c = self.lexer.slice().chars().next().unwrap_or(' ');
                    return Err(self.error(format!("unexpected character {c:?}")));
                }
            }
        }
    }

    /// Like [`Tokens::next`], but anything unreadable ends the header.
    fn next_lenient(&mut self) -> Option<Token> {
        self.next().ok().flatten()
    }

    /// `[name | .] "path"`, given its first token.
    fn import_spec(&mut self, first: Token) -> Result<String, PackageError> {
        let path = match first {
            Token::Ident(_) | Token::Dot => self.next()?,
            other => Some(other),
        };
        match path {
            Some(Token::Str(path)) => Ok(path),
            _ => Err(self.error("expected import path")),
        }
    }

    fn error(&self, message: impl Into<String>) -> PackageError {
        let offset = self.lexer.span().start.min(self.src.len());
        PackageError::Syntax {
            file: self.file.to_path_buf(),
            line: self.src[..offset].matches('\n').count() + 1,
            message: message.into(),
        }
    }
}

fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}
