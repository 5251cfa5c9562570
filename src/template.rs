//! Placeholder expansion for template text.
//!
//! Supports:
//! - Evaluated placeholders: `{2+3*4}`
//! - Formatted placeholders: `{22/7:%.2f}`
//!
//! A placeholder ends at the first `}` after its `{`; braces do not nest.
//! Failures are isolated to the placeholder that caused them.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::Deserialize;

use crate::error::TemplateError;
use crate::expr::{eval, parse_expression_with, tree, ParseMode};
use crate::format::{render_default, FormatSpec};
use crate::output::BoundedOutput;

/// Output capacity used when none is configured.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Rendering options.
pub struct TemplateOptions {
    /// Maximum output size in bytes.
    pub capacity: usize,
    /// Parser behavior for malformed expressions and unterminated placeholders.
    pub mode: ParseMode,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_OUTPUT_CAPACITY,
            mode: ParseMode::Strict,
        }
    }
}

impl TemplateOptions {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reads options from a JSON object such as
    /// `{"capacity": 1024, "mode": "lenient"}`.
    pub fn from_json_str(input: &str) -> Result<Self, TemplateError> {
        serde_json::from_str(input)
            .map_err(|e| TemplateError::ConfigError(format!("invalid template options: {e}")))
    }

    pub fn from_path(path: &Path) -> Result<Self, TemplateError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug)]
/// A placeholder that could not be rendered.
pub struct PlaceholderIssue {
    /// Byte offset of the placeholder's `{` in the input.
    pub offset: usize,
    pub error: TemplateError,
}

#[derive(Debug)]
/// Result of rendering one template.
pub struct Rendered {
    /// Output text, never longer than the configured capacity.
    pub text: String,
    /// Whether output was cut to fit the capacity.
    pub truncated: bool,
    /// Placeholders skipped or cut short, in input order.
    pub issues: Vec<PlaceholderIssue>,
}

/// Expands every placeholder in `input`.
pub fn render_template(input: &str, options: &TemplateOptions) -> Rendered {
    let mut out = BoundedOutput::new(options.capacity);
    let mut issues = Vec::new();
    let mut cursor = 0usize;

    loop {
        let Some(rel_open) = input[cursor..].find('{') else {
            out.push_str(&input[cursor..]);
            break;
        };
        let open = cursor + rel_open;
        if !out.push_str(&input[cursor..open]) {
            break;
        }

        let body_start = open + 1;
        let Some(rel_close) = input[body_start..].find('}') else {
            log::warn!("unterminated placeholder at {open}");
            issues.push(PlaceholderIssue {
                offset: open,
                error: TemplateError::UnterminatedPlaceholder { pos: open },
            });
            if options.mode == ParseMode::Strict {
                out.push_str(&input[open..]);
            }
            break;
        };
        let close = body_start + rel_close;

        match render_placeholder(&input[body_start..close], options.mode) {
            Ok(text) => {
                if !out.push_str(&text) {
                    break;
                }
            }
            Err(error) => {
                log::warn!("skipping placeholder at {open}: {error}");
                issues.push(PlaceholderIssue {
                    offset: open,
                    error,
                });
            }
        }
        cursor = close + 1;
    }

    let truncated = out.is_truncated();
    if truncated {
        log::warn!("template output truncated at {} bytes", out.capacity());
        issues.push(PlaceholderIssue {
            offset: cursor,
            error: TemplateError::BufferTruncation {
                capacity: out.capacity(),
            },
        });
    }

    Rendered {
        text: out.into_string(),
        truncated,
        issues,
    }
}

/// Renders independent templates in parallel, preserving input order.
pub fn render_all<S>(inputs: &[S], options: &TemplateOptions) -> Vec<Rendered>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|input| render_template(input.as_ref(), options))
        .collect()
}

#[derive(Debug)]
struct Placeholder<'a> {
    expression: &'a str,
    format: Option<&'a str>,
}

fn parse_placeholder(body: &str) -> Placeholder<'_> {
    match body.split_once(':') {
        Some((expression, format)) => Placeholder {
            expression,
            format: Some(format),
        },
        None => Placeholder {
            expression: body,
            format: None,
        },
    }
}

fn render_placeholder(body: &str, mode: ParseMode) -> Result<String, TemplateError> {
    let placeholder = parse_placeholder(body);
    let tree = parse_expression_with(placeholder.expression, mode)?;
    let value = eval::evaluate(tree.root())?;
    log::debug!("{} = {value}", tree.root());
    tree::teardown(tree);

    match placeholder.format {
        Some(format) => Ok(FormatSpec::parse(format)?.render(value)),
        None => Ok(render_default(value)),
    }
}
