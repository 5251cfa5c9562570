//! Plain textual substitution of `_name_` variables.
//!
//! No arithmetic happens here; a bound name is replaced by the default
//! rendering of its value. Run this before [`crate::render_template`] to feed
//! variables into placeholder expressions.

use std::collections::BTreeMap;

use crate::error::TemplateError;
use crate::format::render_default;
use crate::output::BoundedOutput;

/// Replaces every bound `_name_` token in `input`.
///
/// Names are non-empty runs of ASCII letters and digits. When a name is bound
/// more than once, the first binding wins. Unbound or invalid tokens are
/// copied unchanged. Output is cut at `capacity` bytes.
pub fn replace_variables<S>(input: &str, capacity: usize, bindings: &[(S, f64)]) -> String
where
    S: AsRef<str>,
{
    let mut out = BoundedOutput::new(capacity);
    let mut cursor = 0usize;

    loop {
        let Some(rel_open) = input[cursor..].find('_') else {
            out.push_str(&input[cursor..]);
            break;
        };
        let open = cursor + rel_open;
        if !out.push_str(&input[cursor..open]) {
            break;
        }

        let name_start = open + 1;
        let bound = input[name_start..].find('_').and_then(|len| {
            let name = &input[name_start..name_start + len];
            lookup(name, bindings).map(|value| (len, value))
        });

        let written = match bound {
            Some((len, value)) => {
                cursor = name_start + len + 1;
                out.push_str(&render_default(value))
            }
            None => {
                cursor = name_start;
                out.push_str("_")
            }
        };
        if !written {
            break;
        }
    }

    if out.is_truncated() {
        log::warn!("variable output truncated at {} bytes", out.capacity());
    }
    out.into_string()
}

/// Reads bindings from a JSON object of numbers, e.g. `{"width": 3.5}`.
pub fn bindings_from_json_str(input: &str) -> Result<Vec<(String, f64)>, TemplateError> {
    let map: BTreeMap<String, f64> = serde_json::from_str(input)
        .map_err(|e| TemplateError::ConfigError(format!("invalid variable bindings: {e}")))?;

    for name in map.keys() {
        if !is_variable_name(name) {
            return Err(TemplateError::ConfigError(format!(
                "invalid variable name '{name}'; expected ASCII letters and digits"
            )));
        }
    }
    Ok(map.into_iter().collect())
}

fn lookup<S: AsRef<str>>(name: &str, bindings: &[(S, f64)]) -> Option<f64> {
    if !is_variable_name(name) {
        return None;
    }
    bindings
        .iter()
        .find(|(bound, _)| bound.as_ref() == name)
        .map(|(_, value)| *value)
}

pub(crate) fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}
