//! Runtime evaluator for expression AST values.

use crate::error::TemplateError;

use super::parser::{BinaryOp, Expr};

/// Reduces an expression AST node to a number.
///
/// Division by zero follows IEEE 754 and yields an infinity or NaN.
pub fn evaluate(expr: &Expr) -> Result<f64, TemplateError> {
    match expr {
        Expr::Constant(value) => Ok(*value),
        Expr::Binary { op, left, right } => {
            let l = evaluate(left)?;
            let r = evaluate(right)?;
            Ok(eval_binary(*op, l, r))
        }
        Expr::Text(raw) => Err(TemplateError::MalformedTree(format!(
            "text node {raw:?} has no numeric value"
        ))),
    }
}

fn eval_binary(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
    }
}
