//! Configuration documents.
//!
//! A configuration is loaded from JSON, YAML or TOML. All three are first
//! parsed into a [`serde_json::Value`] tree (key order preserved) and then
//! validated into a [`MimeoConfig`].
//!
//! ```yaml
//! output:
//!   direction: stdout
//!   format: json
//! vars:
//!   PREFIX: "ORD-"
//! refs:
//!   customer_id:
//!     context: Customer
//!     field: Id
//! _templates_:
//!   - count: 10
//!     model:
//!       Order:
//!         Prefix: "{PREFIX}"
//!         Number: "{auto_increment}"
//! ```

use crate::template::{Node, Template, TemplateError, TEMPLATES_KEY};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Error Types
// ============================================================================

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Error parsing TOML
    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    /// File extension does not select a known parser
    #[error("Unsupported config file: {0}")]
    UnsupportedFormat(String),

    #[error("Config root must be an object")]
    NotAnObject,

    #[error("No templates in the config")]
    MissingTemplates,

    #[error("Template #{index}: {source}")]
    Template {
        index: usize,
        #[source]
        source: TemplateError,
    },

    #[error("Invalid output settings: {0}")]
    Output(#[source] serde_json::Error),

    #[error("Invalid var '{name}': {reason}")]
    InvalidVar { name: String, reason: String },

    #[error("Invalid ref '{name}': {reason}")]
    InvalidRef { name: String, reason: String },

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
}

// ============================================================================
// Output Settings
// ============================================================================

/// Where generated records are shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputDirection {
    #[default]
    File,
    Stdout,
    Http,
}

/// Serialization format of generated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

impl OutputFormat {
    /// File extension for records written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Post,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpProtocol {
    #[default]
    Http,
    Https,
}

impl HttpProtocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            HttpProtocol::Http => "http",
            HttpProtocol::Https => "https",
        }
    }
}

/// Output settings (`output` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub direction: OutputDirection,
    pub format: OutputFormat,
    /// Indentation width; `None` or `0` produces compact output
    pub indent: Option<usize>,
    pub xml_declaration: bool,

    pub directory_path: PathBuf,
    pub file_name: String,

    pub method: HttpMethod,
    pub protocol: HttpProtocol,
    pub host: String,
    pub port: Option<u16>,
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            direction: OutputDirection::File,
            format: OutputFormat::Xml,
            indent: None,
            xml_declaration: false,
            directory_path: PathBuf::from("mimeo-output"),
            file_name: "mimeo-output".to_string(),
            method: HttpMethod::Post,
            protocol: HttpProtocol::Http,
            host: "localhost".to_string(),
            port: None,
            endpoint: "/".to_string(),
            username: None,
            password: None,
        }
    }
}

impl OutputConfig {
    /// Effective indentation width, if any.
    pub fn indent_width(&self) -> Option<usize> {
        self.indent.filter(|width| *width > 0)
    }

    /// Full URL of the HTTP destination.
    pub fn url(&self) -> String {
        let endpoint = if self.endpoint.starts_with('/') {
            self.endpoint.clone()
        } else {
            format!("/{}", self.endpoint)
        };
        match self.port {
            Some(port) => format!("{}://{}:{port}{endpoint}", self.protocol.scheme(), self.host),
            None => format!("{}://{}{endpoint}", self.protocol.scheme(), self.host),
        }
    }
}

// ============================================================================
// References
// ============================================================================

/// How a reference picks among cached values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    /// Any cached value, picked at random
    #[default]
    Any,
    /// The value cached at the same iteration position
    Parallel,
}

/// A named reference to values rendered for `field` in `context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefConfig {
    pub context: String,
    pub field: String,
    #[serde(rename = "type", default)]
    pub kind: RefType,
}

// ============================================================================
// Config Document
// ============================================================================

/// A validated configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct MimeoConfig {
    pub output: OutputConfig,
    pub vars: IndexMap<String, Node>,
    pub refs: IndexMap<String, RefConfig>,
    pub templates: Vec<Template>,
    /// Seed for the session random number generator
    pub seed: Option<u64>,
}

impl MimeoConfig {
    /// Load a config file; the extension selects the parser.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("toml") => Self::from_toml(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Parse a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_value(serde_yaml::from_str(yaml)?)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::from_value(toml::from_str(content)?)
    }

    /// Validate a parsed config tree.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut root) = value else {
            return Err(ConfigError::NotAnObject);
        };

        let templates = match root.remove(TEMPLATES_KEY) {
            Some(Value::Array(entries)) if !entries.is_empty() => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    Template::from_json(entry)
                        .map_err(|source| ConfigError::Template { index, source })
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(ConfigError::MissingTemplates),
        };

        let output = match root.remove("output") {
            Some(output) => serde_json::from_value(output).map_err(ConfigError::Output)?,
            None => OutputConfig::default(),
        };

        let vars = match root.remove("vars") {
            Some(Value::Object(vars)) => vars
                .iter()
                .map(|(name, value)| parse_var(name, value).map(|node| (name.clone(), node)))
                .collect::<Result<IndexMap<_, _>, _>>()?,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    name: "vars".to_string(),
                    reason: format!("expected an object, got {other}"),
                })
            }
            None => IndexMap::new(),
        };

        let refs: IndexMap<String, RefConfig> = match root.remove("refs") {
            Some(refs) => serde_json::from_value(refs).map_err(|e| ConfigError::InvalidRef {
                name: "refs".to_string(),
                reason: e.to_string(),
            })?,
            None => IndexMap::new(),
        };
        for name in refs.keys() {
            if name.is_empty() || name.contains(['{', '}', ':']) {
                return Err(ConfigError::InvalidRef {
                    name: name.clone(),
                    reason: "names cannot be empty or contain '{', '}' or ':'".to_string(),
                });
            }
            if vars.contains_key(name) {
                return Err(ConfigError::InvalidRef {
                    name: name.clone(),
                    reason: "name is already used by a var".to_string(),
                });
            }
        }

        let seed = match root.remove("seed") {
            Some(seed) => Some(
                seed.as_u64()
                    .ok_or_else(|| ConfigError::InvalidSeed(seed.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            output,
            vars,
            refs,
            templates,
            seed,
        })
    }
}

fn parse_var(name: &str, value: &Value) -> Result<Node, ConfigError> {
    if !is_var_name(name) {
        return Err(ConfigError::InvalidVar {
            name: name.to_string(),
            reason: "names must be upper-case letters, digits and underscores".to_string(),
        });
    }

    let node = Node::parse(name, value).map_err(|e| ConfigError::InvalidVar {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    if !node.is_atomic() {
        return Err(ConfigError::InvalidVar {
            name: name.to_string(),
            reason: "values must be atomic or a Mimeo Util".to_string(),
        });
    }
    Ok(node)
}

/// Variable names: an upper-case letter followed by upper-case letters,
/// digits or underscores.
pub fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Atom;
    use std::io::Write;

    const SAMPLE_CONFIG: &str = r#"
output:
  direction: http
  format: json
  indent: 2
  host: example.com
  port: 8080
  endpoint: records
vars:
  PREFIX: "ORD-"
  LIMIT:
    _mimeo_util:
      _name: random_int
      limit: 5
refs:
  customer:
    context: Customer
    field: Id
    type: parallel
seed: 7
_templates_:
  - count: 2
    model:
      Order:
        Prefix: "{PREFIX}"
        Number: "{auto_increment}"
"#;

    #[test]
    fn test_parse_yaml_config() {
        let config = MimeoConfig::from_yaml(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.templates.len(), 1);
        assert_eq!(config.output.direction, OutputDirection::Http);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.indent_width(), Some(2));
        assert_eq!(config.output.url(), "http://example.com:8080/records");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.vars["PREFIX"], Node::Atom(Atom::from("ORD-")));
        assert!(matches!(config.vars["LIMIT"], Node::Util(_)));
        assert_eq!(config.refs["customer"].kind, RefType::Parallel);
    }

    #[test]
    fn test_output_defaults() {
        let config = MimeoConfig::from_json(
            r#"{"_templates_": [{"count": 1, "model": {"A": 1}}]}"#,
        )
        .unwrap();

        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.output.direction, OutputDirection::File);
        assert_eq!(config.output.format.extension(), "xml");
        assert_eq!(config.output.indent_width(), None);
        assert!(config.vars.is_empty());
        assert!(config.refs.is_empty());
    }

    #[test]
    fn test_missing_templates() {
        let result = MimeoConfig::from_json(r#"{"output": {}}"#);
        assert!(matches!(result, Err(ConfigError::MissingTemplates)));

        let result = MimeoConfig::from_json(r#"{"_templates_": []}"#);
        assert!(matches!(result, Err(ConfigError::MissingTemplates)));
    }

    #[test]
    fn test_template_error_carries_index() {
        let result = MimeoConfig::from_json(
            r#"{"_templates_": [{"count": 1, "model": {"A": 1}}, {"model": {"B": 1}}]}"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Template {
                index: 1,
                source: TemplateError::MissingCount(_)
            })
        ));
    }

    #[test]
    fn test_invalid_var_names_and_values() {
        let result = MimeoConfig::from_json(
            r#"{"vars": {"lower": 1}, "_templates_": [{"count": 1, "model": {"A": 1}}]}"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidVar { .. })));

        let result = MimeoConfig::from_json(
            r#"{"vars": {"LIST": [1, 2]}, "_templates_": [{"count": 1, "model": {"A": 1}}]}"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidVar { .. })));
    }

    #[test]
    fn test_ref_conflicting_with_var() {
        let result = MimeoConfig::from_json(
            r#"{
                "vars": {"ID": 1},
                "refs": {"ID": {"context": "A", "field": "B"}},
                "_templates_": [{"count": 1, "model": {"A": 1}}]
            }"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidRef { .. })));
    }

    #[test]
    fn test_from_file_selects_parser() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("config.toml");
        let mut file = fs::File::create(&toml_path).unwrap();
        writeln!(
            file,
            r#"
[output]
direction = "stdout"

[[_templates_]]
count = 3

[_templates_.model.Item]
Name = "{{random_str}}"
"#
        )
        .unwrap();

        let config = MimeoConfig::from_file(&toml_path).unwrap();
        assert_eq!(config.output.direction, OutputDirection::Stdout);
        assert_eq!(config.templates[0].count, 3);
        assert_eq!(config.templates[0].model.root_tag, "Item");

        let txt_path = dir.path().join("config.txt");
        fs::write(&txt_path, "{}").unwrap();
        assert!(matches!(
            MimeoConfig::from_file(&txt_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_var_name_rules() {
        assert!(is_var_name("CUSTOMER_ID"));
        assert!(is_var_name("A1"));
        assert!(!is_var_name("1A"));
        assert!(!is_var_name("Customer"));
        assert!(!is_var_name(""));
    }
}
