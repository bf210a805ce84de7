//! Rendering of atomic template values.
//!
//! A string is resolved in a fixed order: special-field tokens `{:NAME:}`,
//! then variable tokens `{NAME}` (falling back to a reference of the same
//! name), then an exact `{name}` naming a reference or a raw function.
//! Anything else is a literal.

use crate::error::RenderError;
use crate::manager::ContextManager;
use crate::utils::{is_util, MimeoUtil};
use mimeo_core::{Atom, Node, UtilCall};
use mimeo_data::Datasets;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// Special-field (group 1) and variable (group 2) tokens.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{:([^{}:]+):\}|\{([A-Z][A-Z0-9_]*)\}").expect("token pattern is valid")
});

/// A whole string naming a reference or a raw function.
static RAW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{([^{}:]+)\}$").expect("raw pattern is valid"));

/// Variables may refer to other variables up to this depth.
const MAX_VAR_DEPTH: usize = 16;

/// Renders atomic nodes against the session state.
#[derive(Debug, Clone, Copy)]
pub struct ValueRenderer {
    datasets: &'static Datasets,
}

impl ValueRenderer {
    pub fn new(datasets: &'static Datasets) -> Self {
        Self { datasets }
    }

    /// Render an atomic node (scalar or function call).
    pub fn render(&self, manager: &mut ContextManager, node: &Node) -> Result<Atom, RenderError> {
        self.render_node(manager, node, 0)
    }

    /// Render a string value, resolving its placeholders.
    pub fn render_str(&self, manager: &mut ContextManager, value: &str) -> Result<Atom, RenderError> {
        self.render_text(manager, value, 0)
    }

    fn render_node(
        &self,
        manager: &mut ContextManager,
        node: &Node,
        depth: usize,
    ) -> Result<Atom, RenderError> {
        match node {
            Node::Atom(Atom::String(value)) => self.render_text(manager, value, depth),
            Node::Atom(atom) => Ok(atom.clone()),
            Node::Util(call) => self.render_util(manager, call, depth),
            Node::Object(_) | Node::Array(_) | Node::Templates(_) => Err(RenderError::NotAtomic),
        }
    }

    fn render_text(
        &self,
        manager: &mut ContextManager,
        value: &str,
        depth: usize,
    ) -> Result<Atom, RenderError> {
        let tokens: Vec<Captures<'_>> = TOKEN.captures_iter(value).collect();

        if tokens.is_empty() {
            if let Some(caps) = RAW.captures(value) {
                let name = &caps[1];
                if manager.has_ref(name) {
                    return manager.get_ref(name);
                }
                if is_util(name) {
                    return self.render_util(manager, &UtilCall::raw(name), depth);
                }
            }
            return Ok(Atom::String(value.to_string()));
        }

        if let [single] = tokens.as_slice() {
            if single.get(0).is_some_and(|whole| whole.len() == value.len()) {
                return self.resolve_token(manager, single, depth);
            }
        }

        let mut rendered = String::with_capacity(value.len());
        let mut last = 0;
        for caps in &tokens {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            rendered.push_str(&value[last..whole.start()]);
            rendered.push_str(&self.resolve_token(manager, caps, depth)?.to_text());
            last = whole.end();
        }
        rendered.push_str(&value[last..]);
        Ok(Atom::String(rendered))
    }

    fn resolve_token(
        &self,
        manager: &mut ContextManager,
        caps: &Captures<'_>,
        depth: usize,
    ) -> Result<Atom, RenderError> {
        if let Some(name) = caps.get(1) {
            return self.special_field(manager, name.as_str());
        }
        match caps.get(2) {
            Some(name) => self.variable(manager, name.as_str(), depth),
            None => Err(RenderError::NotAtomic),
        }
    }

    fn special_field(&self, manager: &ContextManager, name: &str) -> Result<Atom, RenderError> {
        manager
            .curr_iteration()?
            .special_field(name)
            .cloned()
            .ok_or_else(|| RenderError::SpecialFieldNotFound(name.to_string()))
    }

    fn variable(
        &self,
        manager: &mut ContextManager,
        name: &str,
        depth: usize,
    ) -> Result<Atom, RenderError> {
        if !manager.has_var(name) && manager.has_ref(name) {
            return manager.get_ref(name);
        }
        if depth >= MAX_VAR_DEPTH {
            return Err(RenderError::InvalidValue {
                util: name.to_string(),
                reason: "variables refer to each other in a cycle".into(),
            });
        }

        let node = manager.get_var(name)?;
        self.render_node(manager, &node, depth + 1)
    }

    fn render_util(
        &self,
        manager: &mut ContextManager,
        call: &UtilCall,
        depth: usize,
    ) -> Result<Atom, RenderError> {
        if !is_util(&call.name) {
            return Err(RenderError::InvalidMimeoUtil(call.name.clone()));
        }

        let mut args = Map::with_capacity(call.args.len());
        for (name, value) in &call.args {
            args.insert(name.clone(), self.render_arg(manager, value, depth)?);
        }
        MimeoUtil::from_args(&call.name, args)?.call(manager, self.datasets)
    }

    fn render_arg(
        &self,
        manager: &mut ContextManager,
        value: &Value,
        depth: usize,
    ) -> Result<Value, RenderError> {
        match value {
            Value::String(text) => Ok(self.render_text(manager, text, depth)?.to_json()),
            Value::Array(items) => items
                .iter()
                .map(|item| self.render_arg(manager, item, depth))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
}
