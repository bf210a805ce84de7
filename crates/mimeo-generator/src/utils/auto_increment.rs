//! `auto_increment` pattern formatting.

use crate::error::RenderError;
use crate::manager::ContextManager;
use mimeo_core::Atom;

pub const DEFAULT_PATTERN: &str = "{:05d}";

/// Advance the counter of the current context for `pattern` and format it.
pub fn auto_increment(manager: &mut ContextManager, pattern: &str) -> Result<Atom, RenderError> {
    let pattern_spec = IdPattern::parse(pattern)?;
    let context = manager.current_context_mut()?;
    let id = if pattern == DEFAULT_PATTERN {
        context.next_id()
    } else {
        context.next_pattern_id(pattern)
    };
    Ok(Atom::String(pattern_spec.format(id)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NumberSpec {
    zero_pad: bool,
    width: usize,
}

/// A pattern split around its single numeric placeholder.
#[derive(Debug, PartialEq)]
struct IdPattern<'a> {
    prefix: &'a str,
    spec: Option<NumberSpec>,
    suffix: &'a str,
}

impl<'a> IdPattern<'a> {
    fn parse(pattern: &'a str) -> Result<Self, RenderError> {
        let Some(open) = pattern.find('{') else {
            return Ok(Self {
                prefix: pattern,
                spec: None,
                suffix: "",
            });
        };
        let close = pattern[open..]
            .find('}')
            .map(|offset| open + offset)
            .ok_or_else(|| invalid(pattern, "unclosed '{'"))?;

        let suffix = &pattern[close + 1..];
        if suffix.contains('{') {
            return Err(invalid(pattern, "only one placeholder is supported"));
        }

        Ok(Self {
            prefix: &pattern[..open],
            spec: Some(parse_spec(pattern, &pattern[open + 1..close])?),
            suffix,
        })
    }

    fn format(&self, id: u64) -> String {
        let number = match self.spec {
            None => String::new(),
            Some(NumberSpec { zero_pad: true, width }) => format!("{id:0width$}"),
            Some(NumberSpec { zero_pad: false, width }) => format!("{id:>width$}"),
        };
        format!("{}{number}{}", self.prefix, self.suffix)
    }
}

fn parse_spec(pattern: &str, inner: &str) -> Result<NumberSpec, RenderError> {
    if inner.is_empty() || inner == ":d" {
        return Ok(NumberSpec {
            zero_pad: false,
            width: 0,
        });
    }

    let body = inner
        .strip_prefix(':')
        .and_then(|body| body.strip_suffix('d'))
        .ok_or_else(|| invalid(pattern, "expected {}, {:d}, {:Nd} or {:0Nd}"))?;
    let width = body
        .parse::<usize>()
        .map_err(|_| invalid(pattern, "invalid width"))?;

    Ok(NumberSpec {
        zero_pad: body.starts_with('0'),
        width,
    })
}

fn invalid(pattern: &str, reason: &str) -> RenderError {
    RenderError::InvalidValue {
        util: "auto_increment".into(),
        reason: format!("pattern '{pattern}': {reason}"),
    }
}
