//! Guard and assignment expressions over integer and boolean variables.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := or
//! or      := and ("||" and)*
//! and     := cmp ("&&" cmp)*
//! cmp     := sum (("==" | "!=" | "<" | "<=" | ">" | ">=") sum)?
//! sum     := product (("+" | "-") product)*
//! product := unary (("*" | "/" | "%") unary)*
//! unary   := ("!" | "-") unary | atom
//! atom    := INT | "true" | "false" | IDENT | "(" expr ")"
//!
//! actions := "" | "skip" | "atomic" "{" assigns "}" | assigns
//! assigns := assign (";" assign)* ";"?
//! assign  := IDENT ":=" expr | "skip"
//! ```

use std::fmt::{Display, Formatter};

use log::trace;

use crate::error::{FvmError, Result};
use crate::types::{Valuation, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// Arithmetic negation: -e
    Neg,
    /// Logical negation: !e
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Integer literal
    Int(i64),
    /// Boolean literal
    Bool(bool),
    /// Variable reference
    Var(String),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn unary(op: UnOp, e: Self) -> Self {
        Expr::Unary(op, Box::new(e))
    }

    pub fn binary(op: BinOp, lhs: Self, rhs: Self) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Evaluates the expression in `valuation`.
    ///
    /// `&&` and `||` short-circuit. Integer arithmetic is checked: overflow and
    /// division by zero are evaluation errors.
    pub fn eval(&self, valuation: &Valuation) -> Result<Value> {
        match self {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Var(name) => valuation
                .get(name)
                .cloned()
                .ok_or_else(|| FvmError::Eval(format!("undefined variable `{}`", name))),
            Expr::Unary(UnOp::Neg, e) => {
                let n = int(e.eval(valuation)?)?;
                n.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| FvmError::Eval(format!("overflow in -{}", n)))
            }
            Expr::Unary(UnOp::Not, e) => Ok(Value::Bool(!boolean(e.eval(valuation)?)?)),
            Expr::Binary(BinOp::And, a, b) => {
                Ok(Value::Bool(boolean(a.eval(valuation)?)? && boolean(b.eval(valuation)?)?))
            }
            Expr::Binary(BinOp::Or, a, b) => {
                Ok(Value::Bool(boolean(a.eval(valuation)?)? || boolean(b.eval(valuation)?)?))
            }
            Expr::Binary(op @ (BinOp::Eq | BinOp::Ne), a, b) => {
                let (a, b) = (a.eval(valuation)?, b.eval(valuation)?);
                if std::mem::discriminant(&a) != std::mem::discriminant(&b) {
                    return Err(FvmError::Eval(format!("cannot compare {} and {}", a, b)));
                }
                Ok(Value::Bool((a == b) == (*op == BinOp::Eq)))
            }
            Expr::Binary(op, a, b) => {
                let (x, y) = (int(a.eval(valuation)?)?, int(b.eval(valuation)?)?);
                let result = match op {
                    BinOp::Lt => return Ok(Value::Bool(x < y)),
                    BinOp::Le => return Ok(Value::Bool(x <= y)),
                    BinOp::Gt => return Ok(Value::Bool(x > y)),
                    BinOp::Ge => return Ok(Value::Bool(x >= y)),
                    BinOp::Add => x.checked_add(y),
                    BinOp::Sub => x.checked_sub(y),
                    BinOp::Mul => x.checked_mul(y),
                    BinOp::Div => x.checked_div(y),
                    BinOp::Mod => x.checked_rem(y),
                    BinOp::And | BinOp::Or | BinOp::Eq | BinOp::Ne => unreachable!(),
                };
                result
                    .map(Value::Int)
                    .ok_or_else(|| FvmError::Eval(format!("arithmetic error in {} {} {}", x, op.symbol(), y)))
            }
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Unary(UnOp::Neg, e) => write!(f, "-({})", e),
            Expr::Unary(UnOp::Not, e) => write!(f, "!({})", e),
            Expr::Binary(op, a, b) => write!(f, "({} {} {})", a, op.symbol(), b),
        }
    }
}

fn int(v: Value) -> Result<i64> {
    v.as_int()
        .ok_or_else(|| FvmError::Eval(format!("expected an integer, got {}", v)))
}

fn boolean(v: Value) -> Result<bool> {
    v.as_bool()
        .ok_or_else(|| FvmError::Eval(format!("expected a boolean, got {}", v)))
}

/// `var := expr`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub var: String,
    pub expr: Expr,
}

/// Applies assignments left to right; each sees the effect of the previous ones.
pub fn apply_assignments(assignments: &[Assignment], valuation: &Valuation) -> Result<Valuation> {
    let mut result = valuation.clone();
    for a in assignments {
        let value = a.expr.eval(&result)?;
        trace!("{} := {}", a.var, value);
        result.insert(a.var.clone(), value);
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Lexer

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(i64),
    Bool(bool),
    Ident(String),
    Sym(&'static str),
}

/// Longest symbols first.
const SYMBOLS: &[&str] = &[
    "||", "&&", "==", "!=", "<=", ">=", ":=", "<", ">", "+", "-", "*", "/", "%", "!", "(", ")", "{", "}", ";",
];

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let Some(c) = rest.chars().next() else {
            break;
        };
        if c.is_whitespace() {
            i += c.len_utf8();
        } else if c.is_ascii_digit() {
            let len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            let n = rest[..len]
                .parse()
                .map_err(|e| FvmError::Parse(format!("bad integer `{}` in `{}`: {}", &rest[..len], text, e)))?;
            tokens.push(Token::Int(n));
            i += len;
        } else if c.is_alphabetic() || c == '_' {
            let len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            tokens.push(match &rest[..len] {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                ident => Token::Ident(ident.to_string()),
            });
            i += len;
        } else if let Some(sym) = SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            tokens.push(Token::Sym(*sym));
            i += sym.len();
        } else {
            return Err(FvmError::Parse(format!("unexpected character `{}` in `{}`", c, text)));
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Result<Self> {
        Ok(Self {
            text,
            tokens: tokenize(text)?,
            pos: 0,
        })
    }

    fn error(&self, what: &str) -> FvmError {
        match self.tokens.get(self.pos) {
            Some(tok) => FvmError::Parse(format!("{} at {:?} in `{}`", what, tok, self.text)),
            None => FvmError::Parse(format!("{} at end of `{}`", what, self.text)),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, sym: &str) -> bool {
        if matches!(self.peek(), Some(Token::Sym(s)) if *s == sym) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, sym: &str) -> Result<()> {
        if self.eat(sym) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{}`", sym)))
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr> {
        let mut lhs = self.and()?;
        while self.eat("||") {
            lhs = Expr::binary(BinOp::Or, lhs, self.and()?);
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut lhs = self.cmp()?;
        while self.eat("&&") {
            lhs = Expr::binary(BinOp::And, lhs, self.cmp()?);
        }
        Ok(lhs)
    }

    fn cmp(&mut self) -> Result<Expr> {
        let lhs = self.sum()?;
        let ops = [
            ("==", BinOp::Eq),
            ("!=", BinOp::Ne),
            ("<=", BinOp::Le),
            (">=", BinOp::Ge),
            ("<", BinOp::Lt),
            (">", BinOp::Gt),
        ];
        for (sym, op) in ops {
            if self.eat(sym) {
                return Ok(Expr::binary(op, lhs, self.sum()?));
            }
        }
        Ok(lhs)
    }

    fn sum(&mut self) -> Result<Expr> {
        let mut lhs = self.product()?;
        loop {
            if self.eat("+") {
                lhs = Expr::binary(BinOp::Add, lhs, self.product()?);
            } else if self.eat("-") {
                lhs = Expr::binary(BinOp::Sub, lhs, self.product()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn product(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat("*") {
                lhs = Expr::binary(BinOp::Mul, lhs, self.unary()?);
            } else if self.eat("/") {
                lhs = Expr::binary(BinOp::Div, lhs, self.unary()?);
            } else if self.eat("%") {
                lhs = Expr::binary(BinOp::Mod, lhs, self.unary()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.eat("!") {
            Ok(Expr::unary(UnOp::Not, self.unary()?))
        } else if self.eat("-") {
            Ok(Expr::unary(UnOp::Neg, self.unary()?))
        } else {
            self.atom()
        }
    }

    fn atom(&mut self) -> Result<Expr> {
        let expr = match self.peek() {
            Some(Token::Int(n)) => Expr::Int(*n),
            Some(Token::Bool(b)) => Expr::Bool(*b),
            Some(Token::Ident(name)) => Expr::var(name.as_str()),
            Some(Token::Sym("(")) => {
                self.pos += 1;
                let e = self.expr()?;
                self.expect(")")?;
                return Ok(e);
            }
            _ => return Err(self.error("expected an expression")),
        };
        self.pos += 1;
        Ok(expr)
    }

    fn assignment(&mut self) -> Result<Option<Assignment>> {
        match self.peek() {
            Some(Token::Ident(name)) if name == "skip" => {
                self.pos += 1;
                Ok(None)
            }
            Some(Token::Ident(name)) => {
                let var = name.clone();
                self.pos += 1;
                self.expect(":=")?;
                let expr = self.expr()?;
                Ok(Some(Assignment { var, expr }))
            }
            _ => Err(self.error("expected an assignment")),
        }
    }

    /// `assign (";" assign)* ";"?` up to the end of input or a closing brace.
    fn assignments(&mut self) -> Result<Vec<Assignment>> {
        let mut result = Vec::new();
        while !self.at_end() && self.peek() != Some(&Token::Sym("}")) {
            result.extend(self.assignment()?);
            if !self.eat(";") {
                break;
            }
        }
        Ok(result)
    }
}

/// Parses a complete expression.
pub fn parse_expr(text: &str) -> Result<Expr> {
    let mut p = Parser::new(text)?;
    let e = p.expr()?;
    p.finish()?;
    Ok(e)
}

/// Parses a guard; the empty guard is `true`.
pub fn parse_guard(text: &str) -> Result<Expr> {
    if text.trim().is_empty() {
        Ok(Expr::Bool(true))
    } else {
        parse_expr(text)
    }
}

/// Parses an action into the list of assignments it performs.
///
/// The empty action and `skip` perform none.
pub fn parse_action(text: &str) -> Result<Vec<Assignment>> {
    let mut p = Parser::new(text)?;
    let result = if matches!(p.peek(), Some(Token::Ident(name)) if name == "atomic") {
        p.pos += 1;
        p.expect("{")?;
        let body = p.assignments()?;
        p.expect("}")?;
        body
    } else {
        p.assignments()?
    };
    p.finish()?;
    Ok(result)
}

/// Whether `text` parses as an action.
pub fn is_action(text: &str) -> bool {
    parse_action(text).is_ok()
}

/// Evaluates a guard to a boolean.
pub fn evaluate_guard(text: &str, valuation: &Valuation) -> Result<bool> {
    boolean(parse_guard(text)?.eval(valuation)?)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn vals(pairs: &[(&str, Value)]) -> Valuation {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_precedence() {
        let e = parse_expr("1 + 2 * 3 == 7 && !false || x").unwrap();
        assert_eq!(e.to_string(), "((((1 + (2 * 3)) == 7) && !(false)) || x)");
    }

    #[test]
    fn test_eval_arithmetic() {
        let v = vals(&[("x", Value::Int(7)), ("y", Value::Int(-2))]);
        assert_eq!(parse_expr("x % 3 + y * (x - 1) / 2").unwrap().eval(&v), Ok(Value::Int(-5)));
        assert_eq!(parse_expr("-x").unwrap().eval(&v), Ok(Value::Int(-7)));
    }

    #[test]
    fn test_eval_guards() {
        let v = vals(&[("x", Value::Int(1)), ("b", Value::Bool(true))]);
        assert_eq!(evaluate_guard("", &v), Ok(true));
        assert_eq!(evaluate_guard("x > 0 && b", &v), Ok(true));
        assert_eq!(evaluate_guard("!(x > 0)", &v), Ok(false));
        assert_eq!(evaluate_guard("b == false || x != 1", &v), Ok(false));
        assert_eq!(evaluate_guard("x >= 1 && x <= 1", &v), Ok(true));
    }

    #[test]
    fn test_short_circuit() {
        let v = Valuation::new();
        assert_eq!(evaluate_guard("false && undefined > 0", &v), Ok(false));
        assert_eq!(evaluate_guard("true || undefined > 0", &v), Ok(true));
    }

    #[test]
    fn test_eval_errors() {
        let v = vals(&[("x", Value::Int(1))]);
        assert!(matches!(evaluate_guard("y > 0", &v), Err(FvmError::Eval(_))));
        assert!(matches!(evaluate_guard("x", &v), Err(FvmError::Eval(_))));
        assert!(matches!(evaluate_guard("x == true", &v), Err(FvmError::Eval(_))));
        assert!(matches!(parse_expr("x / 0").unwrap().eval(&v), Err(FvmError::Eval(_))));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_expr("1 +"), Err(FvmError::Parse(_))));
        assert!(matches!(parse_expr("(1"), Err(FvmError::Parse(_))));
        assert!(matches!(parse_expr("1 2"), Err(FvmError::Parse(_))));
        assert!(matches!(parse_expr("x # y"), Err(FvmError::Parse(_))));
    }

    #[test]
    fn test_actions() {
        assert_eq!(parse_action(""), Ok(vec![]));
        assert_eq!(parse_action("skip"), Ok(vec![]));
        let assigns = parse_action("x := x + 1; y := x").unwrap();
        assert_eq!(assigns.len(), 2);
        assert_eq!(assigns[1].var, "y");
        assert_eq!(parse_action("atomic{x := 1; y := 2;}").unwrap().len(), 2);
        assert!(parse_action("x + 1").is_err());
        assert!(parse_action("atomic{x := 1").is_err());
        assert!(!is_action("c?x"));
        assert!(is_action("x := 0"));
    }

    #[test]
    fn test_apply_sequential() {
        let v = vals(&[("x", Value::Int(1))]);
        let assigns = parse_action("atomic{x := x + 1; y := x * 10}").unwrap();
        let result = apply_assignments(&assigns, &v).unwrap();
        assert_eq!(result["x"], Value::Int(2));
        assert_eq!(result["y"], Value::Int(20));
    }
}
