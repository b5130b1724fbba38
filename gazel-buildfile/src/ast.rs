use gazel_types::{AttrValue, Rule};

/// A parsed BUILD file: an ordered sequence of top-level statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildFile {
    /// Name used in diagnostics.
    pub path: String,
    pub stmts: Vec<Stmt>,
}

impl BuildFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stmts: Vec::new(),
        }
    }

    /// Delete every call statement whose callee is one of `kinds`, regardless of its name.
    ///
    /// Returns the number of statements removed.
    pub fn delete_rules(&mut self, kinds: &[&str]) -> usize {
        let before = self.stmts.len();
        self.stmts
            .retain(|stmt| !stmt.rule_kind().is_some_and(|k| kinds.contains(&k)));
        before - self.stmts.len()
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    /// Call statements with the given callee, in file order.
    pub fn rules<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Call> + 'a {
        self.stmts
            .iter()
            .filter_map(Stmt::as_call)
            .filter(move |call| call.kind() == Some(kind))
    }
}

/// One top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A comment block not attached to any statement.
    Comment(Vec<String>),
    Expr {
        /// Comment lines directly above the statement.
        comments: Vec<String>,
        expr: Expr,
        /// Comment at the end of the statement's last line.
        suffix: Option<String>,
    },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr {
            comments: Vec::new(),
            expr,
            suffix: None,
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Stmt::Expr {
                expr: Expr::Call(call),
                ..
            } => Some(call),
            _ => None,
        }
    }

    /// Callee name when the statement is a plain function call such as `go_library(...)`.
    pub fn rule_kind(&self) -> Option<&str> {
        self.as_call().and_then(Call::kind)
    }
}

impl From<&Rule> for Stmt {
    fn from(rule: &Rule) -> Self {
        let mut args = vec![Arg::keyword("name", Expr::Str(rule.name.clone()))];
        for (key, value) in rule.attrs() {
            args.push(Arg::keyword(key.clone(), Expr::from(value)));
        }
        Stmt::expr(Expr::Call(Call::new(rule.kind.function_name(), args)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Str(String),
    /// String literal rendered exactly as written: raw strings, and escapes other than the
    /// ones the formatter emits. `value` is the decoded content.
    Verbatim {
        value: String,
        text: String,
    },
    /// Literal text, kept as written.
    Int(String),
    /// Literal text, kept as written.
    Float(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Paren(Box<Expr>),
    Call(Call),
    Dot {
        x: Box<Expr>,
        name: String,
    },
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: &'static str,
        x: Box<Expr>,
    },
    /// Binary operation; assignment is `op == "="`.
    Binary {
        lhs: Box<Expr>,
        op: &'static str,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) | Expr::Verbatim { value: s, .. } => Some(s),
            _ => None,
        }
    }

    /// String elements of a list literal, if every element is a string.
    pub fn as_string_list(&self) -> Option<Vec<&str>> {
        match self {
            Expr::List(items) => items.iter().map(Expr::as_str).collect(),
            _ => None,
        }
    }
}

impl From<&AttrValue> for Expr {
    fn from(value: &AttrValue) -> Self {
        match value {
            AttrValue::String(s) => Expr::Str(s.clone()),
            AttrValue::Int(i) => Expr::Int(i.to_string()),
            AttrValue::Float(f) => Expr::Float(format!("{f:?}")),
            AttrValue::StringList(items) => {
                Expr::List(items.iter().cloned().map(Expr::Str).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub func: Box<Expr>,
    pub args: Vec<Arg>,
    /// Comment lines after the last argument, before `)`.
    pub end_comments: Vec<String>,
}

impl Call {
    pub fn new(func: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            func: Box::new(Expr::Ident(func.into())),
            args,
            end_comments: Vec::new(),
        }
    }

    pub fn kind(&self) -> Option<&str> {
        match self.func.as_ref() {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Value of the keyword argument `key`.
    pub fn keyword(&self, key: &str) -> Option<&Expr> {
        self.args
            .iter()
            .find(|a| a.name.as_deref() == Some(key))
            .map(|a| &a.value)
    }

    /// The `name` attribute, when it is a string literal.
    pub fn name(&self) -> Option<&str> {
        self.keyword("name").and_then(Expr::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    /// Comment lines directly above the argument.
    pub comments: Vec<String>,
    /// `Some` for keyword arguments.
    pub name: Option<String>,
    pub value: Expr,
    /// Comment after the argument's comma, on the same line.
    pub suffix: Option<String>,
}

impl Arg {
    pub fn positional(value: Expr) -> Self {
        Self {
            comments: Vec::new(),
            name: None,
            value,
            suffix: None,
        }
    }

    pub fn keyword(name: impl Into<String>, value: Expr) -> Self {
        Self {
            comments: Vec::new(),
            name: Some(name.into()),
            value,
            suffix: None,
        }
    }
}
