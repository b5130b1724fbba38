use crate::ast::{BuildFile, Call, Expr, Stmt};

const INDENT: usize = 4;

/// Render `file` in canonical form.
///
/// Top-level statements are separated by one blank line. Calls print one argument per line
/// as soon as they carry a keyword argument or a comment; lists and dicts stay on one line
/// unless an element spans lines.
pub fn format(file: &BuildFile) -> String {
    let mut out = String::new();
    for stmt in &file.stmts {
        if matches!(stmt, Stmt::Comment(lines) if lines.is_empty()) {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        match stmt {
            Stmt::Comment(lines) => {
                for line in lines {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Stmt::Expr {
                comments,
                expr,
                suffix,
            } => {
                for line in comments {
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str(&expr_text(expr, 0));
                if let Some(suffix) = suffix {
                    out.push_str("  ");
                    out.push_str(suffix);
                }
                out.push('\n');
            }
        }
    }
    out
}

fn expr_text(expr: &Expr, indent: usize) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Str(s) => quote(s),
        Expr::Verbatim { text, .. } => text.clone(),
        Expr::Int(text) | Expr::Float(text) => text.clone(),
        Expr::List(items) => {
            let items: Vec<_> = items.iter().map(|x| expr_text(x, indent + INDENT)).collect();
            sequence("[", "]", &items, indent, false)
        }
        Expr::Tuple(items) => {
            let items: Vec<_> = items.iter().map(|x| expr_text(x, indent + INDENT)).collect();
            sequence("(", ")", &items, indent, items.len() == 1)
        }
        Expr::Dict(entries) => {
            let items: Vec<_> = entries
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}: {}",
                        expr_text(k, indent + INDENT),
                        expr_text(v, indent + INDENT)
                    )
                })
                .collect();
            sequence("{", "}", &items, indent, false)
        }
        Expr::Paren(x) => format!("({})", expr_text(x, indent)),
        Expr::Call(call) => call_text(call, indent),
        Expr::Dot { x, name } => format!("{}.{name}", expr_text(x, indent)),
        Expr::Index { x, index } => {
            format!("{}[{}]", expr_text(x, indent), expr_text(index, indent))
        }
        Expr::Unary { op, x } => format!("{op}{}", expr_text(x, indent)),
        Expr::Binary { lhs, op, rhs } => {
            format!("{} {op} {}", expr_text(lhs, indent), expr_text(rhs, indent))
        }
    }
}

fn call_text(call: &Call, indent: usize) -> String {
    let func = expr_text(&call.func, indent);
    let inner = indent + INDENT;
    let args: Vec<String> = call
        .args
        .iter()
        .map(|arg| {
            let value = expr_text(&arg.value, inner);
            match &arg.name {
                Some(name) => format!("{name} = {value}"),
                None => value,
            }
        })
        .collect();

    let multiline = !call.end_comments.is_empty()
        || call
            .args
            .iter()
            .any(|a| a.name.is_some() || !a.comments.is_empty() || a.suffix.is_some())
        || args.iter().any(|a| a.contains('\n'));
    if !multiline {
        return format!("{func}({})", args.join(", "));
    }

    let pad = " ".repeat(inner);
    let mut out = format!("{func}(\n");
    for (arg, text) in call.args.iter().zip(&args) {
        for line in &arg.comments {
            out.push_str(&pad);
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&pad);
        out.push_str(text);
        out.push(',');
        if let Some(suffix) = &arg.suffix {
            out.push_str("  ");
            out.push_str(suffix);
        }
        out.push('\n');
    }
    for line in &call.end_comments {
        out.push_str(&pad);
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&" ".repeat(indent));
    out.push(')');
    out
}

fn sequence(open: &str, close: &str, items: &[String], indent: usize, trailing: bool) -> String {
    if !items.iter().any(|item| item.contains('\n')) {
        let comma = if trailing { "," } else { "" };
        return format!("{open}{}{comma}{close}", items.join(", "));
    }
    let pad = " ".repeat(indent + INDENT);
    let mut out = format!("{open}\n");
    for item in items {
        out.push_str(&pad);
        out.push_str(item);
        out.push_str(",\n");
    }
    out.push_str(&" ".repeat(indent));
    out.push_str(close);
    out
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match quote_escape(c) {
            Some(escaped) => out.push_str(&escaped),
            None => out.push(c),
        }
    }
    out.push('"');
    out
}

/// How `c` is written inside a double-quoted string, when it is not written as itself.
pub(crate) fn quote_escape(c: char) -> Option<String> {
    match c {
        '\\' => Some("\\\\".to_string()),
        '"' => Some("\\\"".to_string()),
        '\n' => Some("\\n".to_string()),
        '\t' => Some("\\t".to_string()),
        '\r' => Some("\\r".to_string()),
        c if c.is_ascii_control() => Some(format!("\\x{:02x}", c as u32)),
        _ => None,
    }
}
