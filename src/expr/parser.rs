//! Recursive-descent parser and AST for placeholder arithmetic.
//!
//! Grammar, left-associative at both levels:
//!
//! ```text
//! expr   := term   (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := '(' expr ')' | number
//! ```

use std::fmt;

use serde::Deserialize;

use crate::error::TemplateError;

use super::cursor::Cursor;
use super::tree::ExpressionTree;

/// Deepest parenthesis nesting accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 128;
/// Largest tree (constants plus operators) the parser will build.
pub const MAX_EXPRESSION_NODES: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
/// Expression AST node.
pub enum Expr {
    /// Number literal.
    Constant(f64),
    /// Binary operation.
    Binary {
        /// Binary operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Reserved text node. Never produced by the parser and rejected by the
    /// evaluator.
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Binary operators in the expression language.
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Flat operator tag of a node.
pub enum OperatorKind {
    Text,
    Constant,
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How the parser treats input that does not match the grammar.
pub enum ParseMode {
    /// Malformed input fails with [`TemplateError::SyntaxError`].
    #[default]
    Strict,
    /// Best-effort: a missing operand reads as `0`, the character after a
    /// parenthesized expression is consumed whatever it is, and trailing input
    /// is ignored.
    Lenient,
}

impl Expr {
    pub fn kind(&self) -> OperatorKind {
        match self {
            Expr::Constant(_) => OperatorKind::Constant,
            Expr::Text(_) => OperatorKind::Text,
            Expr::Binary { op, .. } => match op {
                BinaryOp::Add => OperatorKind::Addition,
                BinaryOp::Sub => OperatorKind::Subtraction,
                BinaryOp::Mul => OperatorKind::Multiplication,
                BinaryOp::Div => OperatorKind::Division,
            },
        }
    }
}

impl fmt::Display for Expr {
    /// Renders the tree fully parenthesized, e.g. `((10 - 2) - 3)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{value}"),
            Expr::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            Expr::Text(raw) => write!(f, "{raw:?}"),
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// Parses expression text into an owned tree.
pub fn parse(input: &str, mode: ParseMode) -> Result<ExpressionTree, TemplateError> {
    let mut parser = Parser {
        cursor: Cursor::new(input),
        mode,
        depth: 0,
        nodes: 0,
    };
    let root = parser.parse_expr()?;

    parser.cursor.skip_whitespace();
    if mode == ParseMode::Strict {
        if let Some(ch) = parser.cursor.peek() {
            return Err(TemplateError::syntax(
                format!("unexpected '{ch}' after expression"),
                parser.cursor.pos(),
            ));
        }
    }

    Ok(ExpressionTree::new(root, parser.nodes))
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    mode: ParseMode,
    depth: usize,
    nodes: usize,
}

impl<'a> Parser<'a> {
    fn parse_expr(&mut self) -> Result<Expr, TemplateError> {
        let mut expr = self.parse_term()?;
        loop {
            self.cursor.skip_whitespace();
            let op = match self.cursor.peek() {
                Some('+') => BinaryOp::Add,
                Some('-') => BinaryOp::Sub,
                _ => break,
            };
            self.cursor.bump();
            let right = self.parse_term()?;
            expr = self.binary(op, expr, right)?;
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, TemplateError> {
        let mut expr = self.parse_factor()?;
        loop {
            self.cursor.skip_whitespace();
            let op = match self.cursor.peek() {
                Some('*') => BinaryOp::Mul,
                Some('/') => BinaryOp::Div,
                _ => break,
            };
            self.cursor.bump();
            let right = self.parse_factor()?;
            expr = self.binary(op, expr, right)?;
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr, TemplateError> {
        self.cursor.skip_whitespace();
        let start = self.cursor.pos();

        if self.cursor.eat('(') {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(TemplateError::syntax(
                    format!("expression nesting exceeds max depth of {MAX_NESTING_DEPTH}"),
                    start,
                ));
            }
            self.depth += 1;
            let expr = self.parse_expr()?;
            self.depth -= 1;

            match self.mode {
                ParseMode::Strict => {
                    if !self.cursor.eat(')') {
                        return Err(TemplateError::syntax(
                            format!("expected ')' to close '(' at {start}"),
                            self.cursor.pos(),
                        ));
                    }
                }
                ParseMode::Lenient => {
                    self.cursor.bump();
                }
            }
            return Ok(expr);
        }

        match self.cursor.number() {
            Some(value) => self.constant(value),
            None if self.mode == ParseMode::Lenient => self.constant(0.0),
            None => Err(match self.cursor.peek() {
                Some(ch) => TemplateError::syntax(
                    format!("expected number or '(' but found '{ch}'"),
                    start,
                ),
                None => TemplateError::syntax(
                    "expected number or '(' but reached end of expression",
                    start,
                ),
            }),
        }
    }

    fn constant(&mut self, value: f64) -> Result<Expr, TemplateError> {
        self.count_node()?;
        Ok(Expr::Constant(value))
    }

    fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, TemplateError> {
        self.count_node()?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn count_node(&mut self) -> Result<(), TemplateError> {
        self.nodes += 1;
        if self.nodes > MAX_EXPRESSION_NODES {
            return Err(TemplateError::syntax(
                format!("expression exceeds max node count of {MAX_EXPRESSION_NODES}"),
                self.cursor.pos(),
            ));
        }
        Ok(())
    }
}
