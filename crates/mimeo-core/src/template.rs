//! Template document model.
//!
//! A configuration's `_templates_` list is parsed into [`Template`] values
//! whose models are trees of [`Node`]. Node shapes are decided once, while
//! parsing, so the generator can dispatch on a closed enum:
//!
//! ```text
//! JSON value
//!   ├── scalar                              → Node::Atom
//!   ├── {"_mimeo_util": {"_name": ..}}      → Node::Util      (checked first)
//!   ├── {"_templates_": [..]}               → Node::Templates
//!   ├── {..}                                → Node::Object    (with `_attrs` / `_value`)
//!   └── [..]                                → Node::Array
//! ```

use crate::values::Atom;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Key of a nested template group.
pub const TEMPLATES_KEY: &str = "_templates_";
/// Key of inline node attributes.
pub const ATTRIBUTES_KEY: &str = "_attrs";
/// Key of the text value of an attribute-bearing node.
pub const VALUE_KEY: &str = "_value";
/// Key marking a parametrized function call.
pub const MIMEO_UTIL_KEY: &str = "_mimeo_util";
/// Key holding the function name inside a parametrized call.
pub const MIMEO_UTIL_NAME_KEY: &str = "_name";
/// Reserved model key holding root element attributes.
pub const MODEL_ATTRIBUTES_KEY: &str = "attributes";
/// Reserved model key overriding the context name.
pub const MODEL_CONTEXT_KEY: &str = "context";

/// Structural errors found while parsing a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("No count value in the template: {0}")]
    MissingCount(String),

    #[error("Invalid count value {0}: expected a positive integer")]
    InvalidCount(String),

    #[error("No model data in the template: {0}")]
    MissingModel(String),

    #[error("No root data in the model: {0}")]
    MissingRoot(String),

    #[error("Multiple root data in the model: [{}]", .0.join(", "))]
    MultipleRoots(Vec<String>),

    #[error("Invalid attributes for '{tag}': {reason}")]
    InvalidAttributes { tag: String, reason: String },

    #[error("Invalid templates group under '{tag}': {reason}")]
    InvalidTemplates { tag: String, reason: String },

    #[error("Invalid Mimeo Util under '{tag}': {reason}")]
    InvalidMimeoUtil { tag: String, reason: String },

    #[error("Node '{0}' declares both a `_value` and child fields")]
    ValueWithChildren(String),

    #[error("Invalid model context: {0}")]
    InvalidContext(String),
}

/// One repeated output shape: `count` records built from `model`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub count: u64,
    pub model: Model,
}

impl Template {
    /// Parse a template entry (`{"count": N, "model": {...}}`).
    pub fn from_json(value: &Value) -> Result<Self, TemplateError> {
        let entry = value
            .as_object()
            .ok_or_else(|| TemplateError::MissingModel(value.to_string()))?;

        let count = entry
            .get("count")
            .ok_or_else(|| TemplateError::MissingCount(value.to_string()))?;
        let count = count
            .as_u64()
            .filter(|c| *c > 0)
            .ok_or_else(|| TemplateError::InvalidCount(count.to_string()))?;

        let model = entry
            .get("model")
            .and_then(Value::as_object)
            .ok_or_else(|| TemplateError::MissingModel(value.to_string()))?;

        Ok(Self {
            count,
            model: Model::from_json(model)?,
        })
    }

    /// Parse a list of template entries.
    pub fn list_from_json(values: &[Value]) -> Result<Vec<Self>, TemplateError> {
        values.iter().map(Template::from_json).collect()
    }
}

/// Root-level definition of a template: one tag, its value, and optional
/// root attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub root_tag: String,
    pub root: Node,
    pub attributes: IndexMap<String, Atom>,
    pub context: Option<String>,
}

impl Model {
    pub fn from_json(model: &Map<String, Value>) -> Result<Self, TemplateError> {
        let mut attributes = IndexMap::new();
        if let Some(attrs) = model.get(MODEL_ATTRIBUTES_KEY) {
            let attrs = attrs
                .as_object()
                .ok_or_else(|| TemplateError::InvalidAttributes {
                    tag: MODEL_ATTRIBUTES_KEY.to_string(),
                    reason: "expected an object".to_string(),
                })?;
            for (name, value) in attrs {
                let atom = Atom::from_json(value).ok_or_else(|| TemplateError::InvalidAttributes {
                    tag: MODEL_ATTRIBUTES_KEY.to_string(),
                    reason: format!("attribute '{name}' is not atomic"),
                })?;
                attributes.insert(name.clone(), atom);
            }
        }

        let context = match model.get(MODEL_CONTEXT_KEY) {
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                return Err(TemplateError::InvalidContext(format!(
                    "expected a string, got {other}"
                )))
            }
            None => None,
        };

        let roots: Vec<(&String, &Value)> = model
            .iter()
            .filter(|(key, _)| *key != MODEL_ATTRIBUTES_KEY && *key != MODEL_CONTEXT_KEY)
            .collect();

        match roots.as_slice() {
            [] => Err(TemplateError::MissingRoot(
                Value::Object(model.clone()).to_string(),
            )),
            [(tag, value)] => Ok(Self {
                root_tag: (*tag).clone(),
                root: Node::parse(tag, value)?,
                attributes,
                context,
            }),
            many => Err(TemplateError::MultipleRoots(
                many.iter().map(|(tag, _)| (*tag).clone()).collect(),
            )),
        }
    }

    /// Name of the execution context serving this model.
    pub fn context_name(&self) -> &str {
        match &self.context {
            Some(name) => name,
            None => special_field_name(&self.root_tag).unwrap_or(&self.root_tag),
        }
    }
}

/// A node of a template model.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Scalar, possibly holding a placeholder string
    Atom(Atom),

    /// Parametrized function call
    Util(UtilCall),

    /// Object with child fields, or an attribute-bearing value
    Object(ObjectNode),

    /// Repeated leaf values or repeated sibling objects
    Array(Vec<Node>),

    /// Nested template group
    Templates(Vec<Template>),
}

impl Node {
    /// Parse the value declared under `tag`.
    pub fn parse(tag: &str, value: &Value) -> Result<Self, TemplateError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| Node::parse(tag, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Node::Array),
            Value::Object(map) => Node::parse_object(tag, map),
            scalar => Ok(Node::Atom(Atom::from_json(scalar).unwrap_or(Atom::Null))),
        }
    }

    fn parse_object(tag: &str, map: &Map<String, Value>) -> Result<Self, TemplateError> {
        if let Some(util) = map.get(MIMEO_UTIL_KEY) {
            if map.len() != 1 {
                return Err(TemplateError::InvalidMimeoUtil {
                    tag: tag.to_string(),
                    reason: format!("`{MIMEO_UTIL_KEY}` must be the only key"),
                });
            }
            return UtilCall::from_json(tag, util).map(Node::Util);
        }

        if let Some(templates) = map.get(TEMPLATES_KEY) {
            if map.len() != 1 {
                return Err(TemplateError::InvalidTemplates {
                    tag: tag.to_string(),
                    reason: format!("`{TEMPLATES_KEY}` must be the only key"),
                });
            }
            let entries = templates
                .as_array()
                .ok_or_else(|| TemplateError::InvalidTemplates {
                    tag: tag.to_string(),
                    reason: "expected a list of templates".to_string(),
                })?;
            return Template::list_from_json(entries).map(Node::Templates);
        }

        let mut object = ObjectNode::default();
        for (key, value) in map {
            match key.as_str() {
                ATTRIBUTES_KEY => {
                    let attrs = value
                        .as_object()
                        .ok_or_else(|| TemplateError::InvalidAttributes {
                            tag: tag.to_string(),
                            reason: "expected an object".to_string(),
                        })?;
                    for (name, attr) in attrs {
                        let node = Node::parse(name, attr)?;
                        if !node.is_atomic() {
                            return Err(TemplateError::InvalidAttributes {
                                tag: tag.to_string(),
                                reason: format!("attribute '{name}' is not atomic"),
                            });
                        }
                        object.attributes.insert(name.clone(), node);
                    }
                }
                VALUE_KEY => {
                    let node = Node::parse(tag, value)?;
                    if !node.is_atomic() {
                        return Err(TemplateError::InvalidAttributes {
                            tag: tag.to_string(),
                            reason: format!("`{VALUE_KEY}` is not atomic"),
                        });
                    }
                    object.value = Some(Box::new(node));
                }
                _ => {
                    object.fields.insert(key.clone(), Node::parse(key, value)?);
                }
            }
        }

        if object.value.is_some() && !object.fields.is_empty() {
            return Err(TemplateError::ValueWithChildren(tag.to_string()));
        }
        Ok(Node::Object(object))
    }

    /// Atomic nodes render to a single [`Atom`].
    pub fn is_atomic(&self) -> bool {
        matches!(self, Node::Atom(_) | Node::Util(_))
    }
}

/// Object node: ordered child fields plus inline attributes and an optional
/// text value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub fields: IndexMap<String, Node>,
    pub attributes: IndexMap<String, Node>,
    pub value: Option<Box<Node>>,
}

/// Parametrized function call: `{"_mimeo_util": {"_name": .., ..kwargs}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilCall {
    pub name: String,
    pub args: Map<String, Value>,
}

impl UtilCall {
    fn from_json(tag: &str, value: &Value) -> Result<Self, TemplateError> {
        let map = value
            .as_object()
            .ok_or_else(|| TemplateError::InvalidMimeoUtil {
                tag: tag.to_string(),
                reason: "expected an object".to_string(),
            })?;
        let name = map
            .get(MIMEO_UTIL_NAME_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| TemplateError::InvalidMimeoUtil {
                tag: tag.to_string(),
                reason: format!("missing `{MIMEO_UTIL_NAME_KEY}`"),
            })?;

        let args = map
            .iter()
            .filter(|(key, _)| *key != MIMEO_UTIL_NAME_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            name: name.to_string(),
            args,
        })
    }

    /// A call without arguments, as produced by a raw `{name}` placeholder.
    pub fn raw(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
        }
    }
}

/// Unwrap a special field tag (`{:Name:}` → `Name`).
pub fn special_field_name(tag: &str) -> Option<&str> {
    tag.strip_prefix("{:")
        .and_then(|rest| rest.strip_suffix(":}"))
        .filter(|name| !name.is_empty())
}
