//! printf-style rendering of one `f64` per placeholder.
//!
//! A format specifier is literal text around exactly one float conversion:
//! `%[flags][width][.precision][l|L]conv` with flags from `-+ 0#` and `conv`
//! one of `f F e E g G`. `%%` renders a literal `%`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::TemplateError;

/// Largest width or precision accepted in a conversion.
pub const MAX_FORMAT_FIELD: usize = 512;

const DEFAULT_PRECISION: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A parsed format specifier.
pub struct FormatSpec {
    prefix: String,
    directive: Directive,
    suffix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Float conversion family.
pub enum Conversion {
    /// `%f` / `%F`
    Fixed,
    /// `%e` / `%E`
    Scientific,
    /// `%g` / `%G`
    General,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left_align: bool,
    plus: bool,
    space: bool,
    zero_pad: bool,
    alternate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Directive {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
    upper: bool,
}

impl FormatSpec {
    /// Parses a format specifier, failing unless it holds exactly one float
    /// conversion.
    pub fn parse(spec: &str) -> Result<Self, TemplateError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut directive: Option<Directive> = None;
        let mut idx = 0usize;

        while idx < spec.len() {
            let rest = &spec[idx..];
            let literal = if directive.is_some() {
                &mut suffix
            } else {
                &mut prefix
            };

            let Some(pct) = rest.find('%') else {
                literal.push_str(rest);
                break;
            };
            literal.push_str(&rest[..pct]);
            idx += pct;

            if spec[idx..].starts_with("%%") {
                literal.push('%');
                idx += 2;
                continue;
            }

            if directive.is_some() {
                return Err(TemplateError::syntax(
                    "format must contain exactly one conversion, found a second one",
                    idx,
                ));
            }

            let (parsed, len) = parse_directive(&spec[idx..], idx)?;
            directive = Some(parsed);
            idx += len;
        }

        let directive = directive
            .ok_or_else(|| TemplateError::syntax("format has no conversion directive", 0))?;

        Ok(Self {
            prefix,
            directive,
            suffix,
        })
    }

    pub fn conversion(&self) -> Conversion {
        self.directive.conversion
    }

    /// Renders `value` through the specifier.
    pub fn render(&self, value: f64) -> String {
        let body = self.directive.render(value);
        let mut out = String::with_capacity(self.prefix.len() + body.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(&body);
        out.push_str(&self.suffix);
        out
    }
}

/// Rendering used when a placeholder carries no format specifier.
pub fn render_default(value: f64) -> String {
    value.to_string()
}

fn parse_directive(text: &str, offset: usize) -> Result<(Directive, usize), TemplateError> {
    let captures = directive_regex()
        .captures(text)
        .ok_or_else(|| TemplateError::syntax("invalid conversion", offset))?;
    let len = captures.get(0).map_or(1, |m| m.end());

    let mut flags = Flags::default();
    if let Some(raw) = captures.get(1) {
        for ch in raw.as_str().chars() {
            match ch {
                '-' => flags.left_align = true,
                '+' => flags.plus = true,
                ' ' => flags.space = true,
                '0' => flags.zero_pad = true,
                '#' => flags.alternate = true,
                _ => {}
            }
        }
    }

    let width = captures
        .get(2)
        .map(|m| parse_field(m.as_str(), "width", offset + m.start()))
        .transpose()?;
    let precision = captures
        .get(3)
        .map(|m| {
            if m.as_str().is_empty() {
                Ok(0)
            } else {
                parse_field(m.as_str(), "precision", offset + m.start())
            }
        })
        .transpose()?;

    if let Some(length) = captures.get(4) {
        if !matches!(length.as_str(), "" | "l" | "L") {
            return Err(TemplateError::syntax(
                format!("unsupported length modifier '{}'", length.as_str()),
                offset + length.start(),
            ));
        }
    }

    let Some(conv) = captures.get(5) else {
        return Err(TemplateError::syntax(
            "incomplete conversion at end of format",
            offset + len,
        ));
    };
    let (conversion, upper) = match conv.as_str() {
        "f" => (Conversion::Fixed, false),
        "F" => (Conversion::Fixed, true),
        "e" => (Conversion::Scientific, false),
        "E" => (Conversion::Scientific, true),
        "g" => (Conversion::General, false),
        "G" => (Conversion::General, true),
        other => {
            return Err(TemplateError::syntax(
                format!("unsupported conversion '%{other}'; expected one of f, F, e, E, g, G"),
                offset + conv.start(),
            ))
        }
    };

    Ok((
        Directive {
            flags,
            width,
            precision,
            conversion,
            upper,
        },
        len,
    ))
}

fn parse_field(raw: &str, name: &str, pos: usize) -> Result<usize, TemplateError> {
    if raw == "*" {
        return Err(TemplateError::syntax(
            format!("'*' {name} is not supported"),
            pos,
        ));
    }
    let value: usize = raw
        .parse()
        .map_err(|e| TemplateError::syntax(format!("invalid {name} '{raw}': {e}"), pos))?;
    if value > MAX_FORMAT_FIELD {
        return Err(TemplateError::syntax(
            format!("{name} {value} exceeds max of {MAX_FORMAT_FIELD}"),
            pos,
        ));
    }
    Ok(value)
}

impl Directive {
    fn render(&self, value: f64) -> String {
        let precision = self.precision.unwrap_or(DEFAULT_PRECISION);
        let alternate = self.flags.alternate;
        let magnitude = value.abs();

        let body = if value.is_nan() {
            "nan".to_string()
        } else if value.is_infinite() {
            "inf".to_string()
        } else {
            match self.conversion {
                Conversion::Fixed => fixed(magnitude, precision, alternate),
                Conversion::Scientific => scientific(magnitude, precision, alternate),
                Conversion::General => general(magnitude, precision, alternate),
            }
        };
        let body = if self.upper {
            body.to_ascii_uppercase()
        } else {
            body
        };

        let sign = if value.is_sign_negative() && !value.is_nan() {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        };

        pad(
            sign,
            &body,
            self.width.unwrap_or(0),
            self.flags.left_align,
            self.flags.zero_pad && value.is_finite(),
        )
    }
}

fn fixed(magnitude: f64, precision: usize, alternate: bool) -> String {
    let mut out = format!("{magnitude:.precision$}");
    if alternate && precision == 0 {
        out.push('.');
    }
    out
}

fn scientific(magnitude: f64, precision: usize, alternate: bool) -> String {
    let (mut mantissa, exponent) = split_exponent(magnitude, precision);
    if alternate && precision == 0 {
        mantissa.push('.');
    }
    join_exponent(&mantissa, exponent)
}

// `%g`: scientific when the exponent is below -4 or not below the precision,
// fixed otherwise; trailing zeros go unless `#` is set.
fn general(magnitude: f64, precision: usize, alternate: bool) -> String {
    let precision = precision.max(1);
    let (mantissa, exponent) = split_exponent(magnitude, precision - 1);
    let limit = i32::try_from(precision).unwrap_or(i32::MAX);

    if exponent >= -4 && exponent < limit {
        let decimals = usize::try_from(limit - 1 - exponent).unwrap_or(0);
        let out = format!("{magnitude:.decimals$}");
        if alternate {
            out
        } else {
            strip_fraction_zeros(out)
        }
    } else {
        let mantissa = if alternate {
            mantissa
        } else {
            strip_fraction_zeros(mantissa)
        };
        join_exponent(&mantissa, exponent)
    }
}

fn split_exponent(magnitude: f64, precision: usize) -> (String, i32) {
    let raw = format!("{magnitude:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}

fn join_exponent(mantissa: &str, exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

fn strip_fraction_zeros(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn pad(sign: &str, body: &str, width: usize, left_align: bool, zero_pad: bool) -> String {
    let len = sign.len() + body.len();
    if len >= width {
        return format!("{sign}{body}");
    }
    let fill = width - len;
    if left_align {
        format!("{sign}{body}{}", " ".repeat(fill))
    } else if zero_pad {
        format!("{sign}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{body}", " ".repeat(fill))
    }
}

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^%([-+ #0]*)(\*|[0-9]+)?(?:\.(\*|[0-9]*))?([hlLqjzt]*)(.)?")
            .expect("valid conversion regex")
    })
}
