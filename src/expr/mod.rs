//! Arithmetic expression language embedded in template placeholders.

/// Forward-only cursor over expression source text.
pub mod cursor;
/// Expression evaluator.
pub mod eval;
/// Parser and expression AST definitions.
pub mod parser;
/// Tree ownership and teardown.
pub mod tree;

use crate::error::TemplateError;

pub use parser::{BinaryOp, Expr, OperatorKind, ParseMode};
pub use tree::ExpressionTree;

/// Parses expression source into a tree, rejecting malformed input.
pub fn parse_expression(input: &str) -> Result<ExpressionTree, TemplateError> {
    parser::parse(input, ParseMode::Strict)
}

/// Parses expression source into a tree using the given [`ParseMode`].
pub fn parse_expression_with(
    input: &str,
    mode: ParseMode,
) -> Result<ExpressionTree, TemplateError> {
    parser::parse(input, mode)
}
