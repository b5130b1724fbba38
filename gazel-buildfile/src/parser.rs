use crate::ast::{Arg, BuildFile, Call, Expr, Stmt};
use crate::error::ParseError;
use crate::lexer::{Spanned, Token, tokenize};
use std::mem;
use tracing::trace;

pub(crate) fn parse_file(file: &str, src: &str) -> Result<BuildFile, ParseError> {
    let tokens = tokenize(file, src)?;
    let mut parser = Parser {
        file,
        src,
        tokens,
        pos: 0,
        depth: 0,
        inner_comments: Vec::new(),
    };
    let stmts = parser.parse_stmts()?;
    trace!(file, statements = stmts.len(), "parsed build file");
    Ok(BuildFile {
        path: file.to_string(),
        stmts,
    })
}

struct Parser<'a> {
    file: &'a str,
    src: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Bracket nesting. Inside brackets newlines are insignificant and comments are collected.
    depth: usize,
    inner_comments: Vec<String>,
}

impl Parser<'_> {
    fn parse_stmts(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut newlines = 0usize;

        while let Some((token, _)) = self.tokens.get(self.pos) {
            match token {
                Token::Newline => {
                    self.pos += 1;
                    newlines += 1;
                    if newlines >= 2 && !pending.is_empty() {
                        stmts.push(Stmt::Comment(mem::take(&mut pending)));
                    }
                }
                Token::Comment(text) => {
                    pending.push(text.clone());
                    self.pos += 1;
                    newlines = 0;
                }
                _ => {
                    let expr = self.parse_statement()?;
                    let suffix = self.same_line_comment();
                    match self.tokens.get(self.pos) {
                        None => {}
                        Some((Token::Newline, _)) => self.pos += 1,
                        Some((other, _)) => {
                            let message =
                                format!("expected end of statement, found {}", other.describe());
                            return Err(self.error(message));
                        }
                    }
                    stmts.push(Stmt::Expr {
                        comments: mem::take(&mut pending),
                        expr,
                        suffix,
                    });
                    newlines = 1;
                }
            }
        }

        if !pending.is_empty() {
            stmts.push(Stmt::Comment(pending));
        }
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_expr()?;
        if self.eat(&Token::Eq) {
            let rhs = self.parse_expr()?;
            return Ok(Expr::Binary {
                lhs: Box::new(lhs),
                op: "=",
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => "+",
                Some(Token::Minus) => "-",
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => "*",
                Some(Token::Slash) => "/",
                Some(Token::Percent) => "%",
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Minus) {
            let x = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: "-",
                x: Box::new(x),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut x = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::LParen) => x = Expr::Call(self.parse_call(x)?),
                Some(Token::Dot) => {
                    self.pos += 1;
                    let name = self.expect_ident()?;
                    x = Expr::Dot {
                        x: Box::new(x),
                        name,
                    };
                }
                Some(Token::LBracket) => {
                    let index = self.without_inner_comments(|p| {
                        p.open();
                        let index = p.parse_expr()?;
                        p.close(&Token::RBracket)?;
                        Ok(index)
                    })?;
                    x = Expr::Index {
                        x: Box::new(x),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(x),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("unexpected end of file"));
        };
        match token {
            Token::Ident(name) => {
                self.pos += 1;
                Ok(Expr::Ident(name))
            }
            Token::Str(lit) => {
                self.pos += 1;
                Ok(lit.into_expr())
            }
            Token::Int(s) => {
                self.pos += 1;
                Ok(Expr::Int(s))
            }
            Token::Float(s) => {
                self.pos += 1;
                Ok(Expr::Float(s))
            }
            Token::LBracket => self.without_inner_comments(|p| {
                let items = p.parse_sequence(&Token::RBracket)?.0;
                Ok(Expr::List(items))
            }),
            Token::LParen => self.without_inner_comments(|p| {
                let (items, trailing_comma) = p.parse_sequence(&Token::RParen)?;
                if items.len() == 1 && !trailing_comma {
                    let mut items = items;
                    return Ok(Expr::Paren(Box::new(items.remove(0))));
                }
                Ok(Expr::Tuple(items))
            }),
            Token::LBrace => self.without_inner_comments(|p| p.parse_dict()),
            other => Err(self.error(format!("unexpected {}", other.describe()))),
        }
    }

    /// `open` already peeked; parses `elem, elem, ...` up to `close`.
    fn parse_sequence(&mut self, close: &Token) -> Result<(Vec<Expr>, bool), ParseError> {
        self.open();
        let mut items = Vec::new();
        let mut trailing_comma = false;
        while self.peek() != Some(close) {
            items.push(self.parse_expr()?);
            trailing_comma = self.eat(&Token::Comma);
            if !trailing_comma {
                break;
            }
        }
        self.close(close)?;
        Ok((items, trailing_comma))
    }

    fn parse_dict(&mut self) -> Result<Expr, ParseError> {
        self.open();
        let mut entries = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            let key = self.parse_expr()?;
            self.expect(&Token::Colon)?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.close(&Token::RBrace)?;
        Ok(Expr::Dict(entries))
    }

    fn parse_call(&mut self, func: Expr) -> Result<Call, ParseError> {
        let saved = mem::take(&mut self.inner_comments);
        self.open();
        let mut args = Vec::new();
        while self.peek() != Some(&Token::RParen) {
            let comments = mem::take(&mut self.inner_comments);
            let keyword = match self.peek() {
                Some(Token::Ident(name)) => Some(name.clone()),
                _ => None,
            }
            .filter(|_| matches!(self.tokens.get(self.pos + 1), Some((Token::Eq, _))));
            if keyword.is_some() {
                self.pos += 2;
            }
            let value = self.parse_expr()?;
            let more = self.eat(&Token::Comma);
            args.push(Arg {
                comments,
                name: keyword,
                value,
                suffix: more.then(|| self.same_line_comment()).flatten(),
            });
            if !more {
                break;
            }
        }
        // Collect comments sitting right before `)`.
        self.peek();
        let end_comments = mem::replace(&mut self.inner_comments, saved);
        self.close(&Token::RParen)?;
        Ok(Call {
            func: Box::new(func),
            args,
            end_comments,
        })
    }

    /// Comments inside list, tuple and dict literals are not preserved.
    fn without_inner_comments<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let keep = self.inner_comments.len();
        let out = f(self)?;
        self.inner_comments.truncate(keep);
        Ok(out)
    }

    /// A comment directly after the previous token, before any newline.
    fn same_line_comment(&mut self) -> Option<String> {
        match self.tokens.get(self.pos) {
            Some((Token::Comment(text), _)) => {
                let text = text.clone();
                self.pos += 1;
                Some(text)
            }
            _ => None,
        }
    }

    fn open(&mut self) {
        self.pos += 1;
        self.depth += 1;
    }

    fn close(&mut self, close: &Token) -> Result<(), ParseError> {
        self.expect(close)?;
        self.depth -= 1;
        Ok(())
    }

    /// Next significant token. Inside brackets this skips newlines and collects comments.
    fn peek(&mut self) -> Option<&Token> {
        if self.depth > 0 {
            while let Some((token, _)) = self.tokens.get(self.pos) {
                match token {
                    Token::Newline => self.pos += 1,
                    Token::Comment(text) => {
                        self.inner_comments.push(text.clone());
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
        }
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        match self.peek().cloned() {
            Some(t) if &t == token => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(self.error(format!(
                "expected {}, found {}",
                token.describe(),
                t.describe()
            ))),
            None => Err(self.error(format!(
                "expected {}, found end of file",
                token.describe()
            ))),
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            Some(t) => Err(self.error(format!("expected identifier, found {}", t.describe()))),
            None => Err(self.error("expected identifier, found end of file")),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.src.len());
        ParseError::at_offset(self.file, self.src.as_bytes(), offset, message)
    }
}
