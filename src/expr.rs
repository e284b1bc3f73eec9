//! Boolean expressions and their text syntax.
//!
//! [`Expr`] is the exchange format between front-ends (netlist readers,
//! scripting) and the manager: [`BddMgr::expr_to_bdd`](crate::BddMgr::expr_to_bdd)
//! turns one into a function.
//!
//! # Syntax
//!
//! ```text
//! expr  := xor ('|' xor)*
//! xor   := and ('^' and)*
//! and   := unary ('&' unary)*
//! unary := '~' unary | '!' unary | '(' expr ')' | '0' | '1' | 'x' NUM
//! ```
//!
//! The input is first split into a token tree along parentheses, then each
//! level of the tree is split at its lowest-precedence operator.

use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use crate::error::ParseError;
use crate::types::VarId;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Expr {
    Zero,
    One,
    /// A variable, positive when the flag is `true`.
    Literal(VarId, bool),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Xor(Vec<Expr>),
}

impl Expr {
    pub fn zero() -> Self {
        Expr::Zero
    }

    pub fn one() -> Self {
        Expr::One
    }

    pub fn literal(var: VarId, pol: bool) -> Self {
        Expr::Literal(var, pol)
    }

    pub fn posi_literal(var: VarId) -> Self {
        Expr::Literal(var, true)
    }

    pub fn nega_literal(var: VarId) -> Self {
        Expr::Literal(var, false)
    }

    /// Negation, pushed into constants and literals, double negation removed.
    pub fn not(value: Self) -> Self {
        match value {
            Expr::Zero => Expr::One,
            Expr::One => Expr::Zero,
            Expr::Literal(var, pol) => Expr::Literal(var, !pol),
            Expr::Not(inner) => *inner,
            _ => Expr::Not(Box::new(value)),
        }
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::and_all([lhs, rhs])
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::or_all([lhs, rhs])
    }

    pub fn xor(lhs: Self, rhs: Self) -> Self {
        Self::xor_all([lhs, rhs])
    }

    /// N-ary conjunction; nested conjunctions are flattened.
    pub fn and_all(items: impl IntoIterator<Item = Expr>) -> Self {
        let split = |e: Expr| match e {
            Expr::And(children) => Ok(children),
            e => Err(e),
        };
        Self::flatten(items, Expr::One, split, Expr::And)
    }

    pub fn or_all(items: impl IntoIterator<Item = Expr>) -> Self {
        let split = |e: Expr| match e {
            Expr::Or(children) => Ok(children),
            e => Err(e),
        };
        Self::flatten(items, Expr::Zero, split, Expr::Or)
    }

    pub fn xor_all(items: impl IntoIterator<Item = Expr>) -> Self {
        let split = |e: Expr| match e {
            Expr::Xor(children) => Ok(children),
            e => Err(e),
        };
        Self::flatten(items, Expr::Zero, split, Expr::Xor)
    }

    /// Collects operands, splicing in children of the same operator and
    /// dropping the neutral element. A single operand is not wrapped.
    fn flatten<F>(items: impl IntoIterator<Item = Expr>, neutral: Expr, split: F, wrap: fn(Vec<Expr>) -> Expr) -> Expr
    where
        F: Fn(Expr) -> Result<Vec<Expr>, Expr>,
    {
        let mut out = Vec::new();
        for item in items {
            match split(item) {
                Ok(children) => out.extend(children),
                Err(e) if e == neutral => {}
                Err(e) => out.push(e),
            }
        }
        match out.len() {
            0 => neutral,
            1 => out.remove(0),
            _ => wrap(out),
        }
    }

    /// Variables occurring in the expression, without duplicates, in order of appearance.
    pub fn vars(&self) -> Vec<VarId> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            match e {
                Expr::Zero | Expr::One => {}
                Expr::Literal(var, _) => {
                    if !out.contains(var) {
                        out.push(*var);
                    }
                }
                Expr::Not(inner) => stack.push(inner),
                Expr::And(children) | Expr::Or(children) | Expr::Xor(children) => {
                    stack.extend(children.iter().rev());
                }
            }
        }
        out
    }

    /// Evaluates the expression under an assignment.
    pub fn eval(&self, assignment: &impl Fn(VarId) -> bool) -> bool {
        match self {
            Expr::Zero => false,
            Expr::One => true,
            Expr::Literal(var, pol) => assignment(*var) == *pol,
            Expr::Not(inner) => !inner.eval(assignment),
            Expr::And(children) => children.iter().all(|c| c.eval(assignment)),
            Expr::Or(children) => children.iter().any(|c| c.eval(assignment)),
            Expr::Xor(children) => children.iter().filter(|c| c.eval(assignment)).count() % 2 == 1,
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn join(f: &mut Formatter<'_>, children: &[Expr], op: &str) -> std::fmt::Result {
            for (i, c) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op)?;
                }
                match c {
                    Expr::And(_) | Expr::Or(_) | Expr::Xor(_) => write!(f, "({})", c)?,
                    _ => write!(f, "{}", c)?,
                }
            }
            Ok(())
        }

        match self {
            Expr::Zero => write!(f, "0"),
            Expr::One => write!(f, "1"),
            Expr::Literal(var, true) => write!(f, "{}", var),
            Expr::Literal(var, false) => write!(f, "~{}", var),
            Expr::Not(inner) => write!(f, "~({})", inner),
            Expr::And(children) => join(f, children, "&"),
            Expr::Or(children) => join(f, children, "|"),
            Expr::Xor(children) => join(f, children, "^"),
        }
    }
}

/// **(internal)** Tokens of the expression syntax, grouped by parentheses.
#[derive(Debug, Eq, PartialEq)]
enum Token {
    Not,
    And,
    Or,
    Xor,
    Zero,
    One,
    Var(u32),
    Group(Vec<Token>),
}

/// Parses an expression in the syntax described in the [module docs](self).
///
/// ```
/// use bdd_mgr::expr::{parse_expr, Expr};
/// use bdd_mgr::VarId;
///
/// let e = parse_expr("x0 & ~(x1 | 0)").unwrap();
/// assert_eq!(
///     e,
///     Expr::and(Expr::posi_literal(VarId::new(0)), Expr::not(Expr::posi_literal(VarId::new(1))))
/// );
/// ```
pub fn parse_expr(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize_group(&mut text.char_indices().peekable(), true)?;
    or(&tokens)
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_expr(s)
    }
}

/// Reads tokens up to the matching `)` (or the end of input when `top_level`).
fn tokenize_group(data: &mut Peekable<CharIndices>, top_level: bool) -> Result<Vec<Token>, ParseError> {
    let mut output = Vec::new();
    while let Some((pos, c)) = data.next() {
        match c {
            c if c.is_whitespace() => {}
            '~' | '!' => output.push(Token::Not),
            '&' => output.push(Token::And),
            '|' => output.push(Token::Or),
            '^' => output.push(Token::Xor),
            '0' => output.push(Token::Zero),
            '1' => output.push(Token::One),
            '(' => output.push(Token::Group(tokenize_group(data, false)?)),
            ')' => {
                return if top_level {
                    Err(ParseError::at(pos, "unexpected ')'"))
                } else {
                    Ok(output)
                };
            }
            'x' => {
                let mut digits = String::new();
                while let Some(&(_, d)) = data.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    data.next();
                }
                let id = digits
                    .parse::<u32>()
                    .map_err(|_| ParseError::at(pos, "expected a variable number after 'x'"))?;
                output.push(Token::Var(id));
            }
            c => return Err(ParseError::at(pos, format!("unexpected character '{}'", c))),
        }
    }
    if top_level {
        Ok(output)
    } else {
        Err(ParseError::new("expected ')'"))
    }
}

fn or(data: &[Token]) -> Result<Expr, ParseError> {
    let parts = data
        .split(|t| *t == Token::Or)
        .map(xor)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::or_all(parts))
}

fn xor(data: &[Token]) -> Result<Expr, ParseError> {
    let parts = data
        .split(|t| *t == Token::Xor)
        .map(and)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::xor_all(parts))
}

fn and(data: &[Token]) -> Result<Expr, ParseError> {
    let parts = data
        .split(|t| *t == Token::And)
        .map(unary)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::and_all(parts))
}

fn unary(data: &[Token]) -> Result<Expr, ParseError> {
    match data {
        [] => Err(ParseError::new("missing operand")),
        [Token::Not, rest @ ..] => Ok(Expr::not(unary(rest)?)),
        [Token::Zero] => Ok(Expr::Zero),
        [Token::One] => Ok(Expr::One),
        [Token::Var(id)] => Ok(Expr::posi_literal(VarId::new(*id))),
        [Token::Group(inner)] => or(inner),
        [_, next, ..] => Err(ParseError::new(format!("unexpected {:?}, expected an operator", next))),
        [t] => Err(ParseError::new(format!("unexpected {:?}", t))),
    }
}
