//! Arithmetic placeholder templating.
//!
//! Text such as `"Pi~{22/7:%.2f}"` is scanned for `{expr}` and
//! `{expr:format}` placeholders; each expression is parsed, evaluated to an
//! `f64`, optionally run through a printf-style format, and spliced back into
//! the surrounding text.

pub mod error;
pub mod expr;
pub mod format;
mod output;
pub mod template;
pub mod variables;

pub use error::TemplateError;
pub use expr::{
    parse_expression, parse_expression_with, BinaryOp, Expr, ExpressionTree, OperatorKind,
    ParseMode,
};
pub use format::{render_default, FormatSpec};
pub use template::{
    render_all, render_template, PlaceholderIssue, Rendered, TemplateOptions,
    DEFAULT_OUTPUT_CAPACITY,
};
pub use variables::{bindings_from_json_str, replace_variables};

/// Expands placeholders in strict mode and returns at most `output_capacity`
/// bytes of text. Skipped placeholders and truncation are only visible through
/// [`render_template`].
pub fn evaluate_template(input: &str, output_capacity: usize) -> String {
    render_template(input, &TemplateOptions::new(output_capacity)).text
}

pub fn evaluate_expression(tree: &ExpressionTree) -> Result<f64, TemplateError> {
    expr::eval::evaluate(tree.root())
}

/// Releases a parsed tree and returns the number of nodes released.
pub fn free_expression(tree: ExpressionTree) -> usize {
    expr::tree::teardown(tree)
}
