//! Sandboxed boolean expressions gating sequences and their items.
//!
//! Expressions see exactly two names — `db` (the live store) and `dbp`
//! (the previous-tick snapshot) — and support literals, `db['key']`
//! lookups, comparisons, `and`/`or`/`not`, and parentheses. There are
//! no function calls and no attribute access: a page file can select
//! *data*, never run code. Any parse or evaluation failure makes the
//! expression false.
//!
//! ```text
//! db['state'] == 'play' and dbp['state'] != 'play'
//! db['weight'] < 100 or db['alert']
//! not (db['volume'] >= 11)
//! ```

use tracing::debug;

use crate::error::{MarqueeError, Result};
use crate::vars::{Value, VarStore};

/// A parsed, reusable conditional expression.
#[derive(Clone, Debug)]
pub struct Conditional {
    source: String,
    ast: Expr,
}

impl Conditional {
    /// Parse an expression. The empty string parses as constant true
    /// (an absent conditional never gates anything).
    pub fn parse(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Ok(Self::always());
        }
        let tokens = lex(trimmed)
            .map_err(|e| MarqueeError::Conditional(format!("{e} in `{trimmed}`")))?;
        let mut parser = Parser { tokens, pos: 0 };
        let ast = parser
            .expression()
            .map_err(|e| MarqueeError::Conditional(format!("{e} in `{trimmed}`")))?;
        if parser.pos != parser.tokens.len() {
            return Err(MarqueeError::Conditional(format!(
                "trailing input in `{trimmed}`"
            )));
        }
        Ok(Self {
            source: trimmed.to_string(),
            ast,
        })
    }

    /// The constant-true conditional.
    pub fn always() -> Self {
        Self {
            source: "True".to_string(),
            ast: Expr::Literal(Value::Bool(true)),
        }
    }

    /// The constant-false conditional. Stands in for expressions that
    /// failed to parse at page load.
    pub fn never() -> Self {
        Self {
            source: "False".to_string(),
            ast: Expr::Literal(Value::Bool(false)),
        }
    }

    /// The expression text this conditional was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the live and previous stores. Failures (missing
    /// variables, unordered comparisons) are logged and count as false.
    pub fn eval(&self, db: &VarStore, dbp: &VarStore) -> bool {
        match eval_expr(&self.ast, db, dbp) {
            Ok(v) => truthy(&v),
            Err(reason) => {
                debug!(conditional = %self.source, %reason, "conditional evaluated to false");
                false
            }
        }
    }
}

#[derive(Clone, Debug)]
enum Expr {
    Literal(Value),
    Lookup(Scope, String),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Copy, Debug)]
enum Scope {
    Db,
    Dbp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Num(f64),
    Int(i64),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Op(BinOp),
}

fn lex(src: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => s.push(ch),
                        None => return Err("unterminated string".into()),
                    }
                }
                tokens.push(Token::Str(s));
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err("single `=` is not an operator".into());
                }
                tokens.push(Token::Op(BinOp::Eq));
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err("expected `!=`".into());
                }
                tokens.push(Token::Op(BinOp::Ne));
            }
            '<' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinOp::Le));
                } else {
                    tokens.push(Token::Op(BinOp::Lt));
                }
            }
            '>' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinOp::Ge));
                } else {
                    tokens.push(Token::Op(BinOp::Gt));
                }
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut num = String::new();
                if c == '-' {
                    num.push(c);
                    chars.next();
                    if !chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                        return Err("`-` must start a number".into());
                    }
                }
                let mut is_float = false;
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        num.push(d);
                        chars.next();
                    } else if d == '.' && !is_float {
                        is_float = true;
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if is_float {
                    let f = num.parse().map_err(|_| format!("bad number `{num}`"))?;
                    tokens.push(Token::Num(f));
                } else {
                    let i = num.parse().map_err(|_| format!("bad number `{num}`"))?;
                    tokens.push(Token::Int(i));
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(id)) if id == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> std::result::Result<(), String> {
        match self.next() {
            Some(t) if t == *token => Ok(()),
            other => Err(format!("expected {token:?}, found {other:?}")),
        }
    }

    fn expression(&mut self) -> std::result::Result<Expr, String> {
        let mut left = self.and_expr()?;
        while self.eat_ident("or") {
            let right = self.and_expr()?;
            left = Expr::Binary(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> std::result::Result<Expr, String> {
        let mut left = self.not_expr()?;
        while self.eat_ident("and") {
            let right = self.not_expr()?;
            left = Expr::Binary(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> std::result::Result<Expr, String> {
        if self.eat_ident("not") {
            let inner = self.not_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> std::result::Result<Expr, String> {
        let left = self.term()?;
        if let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.term()?;
            return Ok(Expr::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn term(&mut self) -> std::result::Result<Expr, String> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Num(f)) => Ok(Expr::Literal(Value::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Text(s))),
            Some(Token::Ident(id)) => match id.as_str() {
                "True" | "true" => Ok(Expr::Literal(Value::Bool(true))),
                "False" | "false" => Ok(Expr::Literal(Value::Bool(false))),
                "db" | "dbp" => {
                    let scope = if id == "db" { Scope::Db } else { Scope::Dbp };
                    self.expect(&Token::LBracket)?;
                    let key = match self.next() {
                        Some(Token::Str(s)) => s,
                        other => return Err(format!("expected string key, found {other:?}")),
                    };
                    self.expect(&Token::RBracket)?;
                    Ok(Expr::Lookup(scope, key))
                }
                other => Err(format!("unknown name `{other}`")),
            },
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}

fn eval_expr(
    expr: &Expr,
    db: &VarStore,
    dbp: &VarStore,
) -> std::result::Result<Value, String> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Lookup(scope, key) => {
            let store = match scope {
                Scope::Db => db,
                Scope::Dbp => dbp,
            };
            store
                .get(key)
                .ok_or_else(|| format!("variable `{key}` not found"))
        }
        Expr::Not(inner) => {
            let v = eval_expr(inner, db, dbp)?;
            Ok(Value::Bool(!truthy(&v)))
        }
        Expr::Binary(op, left, right) => {
            match op {
                BinOp::And => {
                    let l = eval_expr(left, db, dbp)?;
                    if !truthy(&l) {
                        return Ok(Value::Bool(false));
                    }
                    let r = eval_expr(right, db, dbp)?;
                    return Ok(Value::Bool(truthy(&r)));
                }
                BinOp::Or => {
                    let l = eval_expr(left, db, dbp)?;
                    if truthy(&l) {
                        return Ok(Value::Bool(true));
                    }
                    let r = eval_expr(right, db, dbp)?;
                    return Ok(Value::Bool(truthy(&r)));
                }
                _ => {}
            }
            let l = eval_expr(left, db, dbp)?;
            let r = eval_expr(right, db, dbp)?;
            let result = match op {
                BinOp::Eq => l == r,
                BinOp::Ne => l != r,
                BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                    let ord = compare(&l, &r)?;
                    match op {
                        BinOp::Lt => ord.is_lt(),
                        BinOp::Le => ord.is_le(),
                        BinOp::Gt => ord.is_gt(),
                        _ => ord.is_ge(),
                    }
                }
                BinOp::And | BinOp::Or => unreachable!("handled above"),
            };
            Ok(Value::Bool(result))
        }
    }
}

fn compare(l: &Value, r: &Value) -> std::result::Result<std::cmp::Ordering, String> {
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        return a
            .partial_cmp(&b)
            .ok_or_else(|| "unordered comparison".into());
    }
    if let (Some(a), Some(b)) = (l.as_text(), r.as_text()) {
        return Ok(a.cmp(b));
    }
    Err(format!("cannot order {l:?} against {r:?}"))
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Text(s) => !s.is_empty(),
    }
}
