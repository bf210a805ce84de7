//! Core types for the mimeo data generator.
//!
//! This crate provides the foundational types shared by the generator, the
//! consumers and the CLI:
//!
//! - [`MimeoConfig`] - Configuration documents loaded from JSON, YAML or TOML
//! - [`Template`] / [`Model`] / [`Node`] - The parsed template tree
//! - [`Atom`] - Atomic values produced by rendering
//! - [`Element`] - Format-neutral output records
//! - [`serialize`] - XML and JSON serialization of records
//!
//! # Architecture
//!
//! ```text
//! mimeo-core (this crate)
//!    │
//!    ├─── mimeo-generator  (walks templates, produces Elements)
//!    │
//!    └─── mimeo-consumers  (ships serialized records)
//! ```
//!
//! # Example
//!
//! ```rust
//! use mimeo_core::{MimeoConfig, Node};
//!
//! let config = MimeoConfig::from_json(r#"{
//!     "_templates_": [
//!         {"count": 2, "model": {"Item": {"Id": "{auto_increment}"}}}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.templates[0].count, 2);
//! assert!(matches!(config.templates[0].model.root, Node::Object(_)));
//! ```

pub mod config;
pub mod element;
pub mod serialize;
pub mod template;
pub mod values;

// Re-exports for convenience
pub use config::{
    ConfigError, HttpMethod, HttpProtocol, MimeoConfig, OutputConfig, OutputDirection,
    OutputFormat, RefConfig, RefType,
};
pub use element::{Body, Element};
pub use serialize::SerializeError;
pub use template::{special_field_name, Model, Node, ObjectNode, Template, TemplateError, UtilCall};
pub use values::Atom;
