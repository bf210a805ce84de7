//! Template rendering engine for the mimeo data generator.
//!
//! This crate turns parsed templates into output
//! [`Element`](mimeo_core::Element) records. Every
//! record is rendered on demand by the [`Records`] iterator while a
//! [`ContextManager`] session is open.
//!
//! # Architecture
//!
//! ```text
//! MimeoConfig (templates, vars, refs, seed)
//!        │
//!        ▼
//! ┌──────────────────────┐      ┌─────────────────────┐
//! │  Generator           │─────▶│  ValueRenderer      │
//! │  (tree walker)       │      │  + function library │
//! └──────────┬───────────┘      └──────────┬──────────┘
//!            │                             │
//!            ▼                             ▼
//! ┌──────────────────────────────────────────────────┐
//! │  ContextManager (Session)                        │
//! │  contexts · iterations · ref cache · StdRng      │
//! └──────────────────────────────────────────────────┘
//!            │
//!            ▼
//!     Element { tag, attributes, body }
//! ```
//!
//! # Example
//!
//! ```rust
//! use mimeo_core::MimeoConfig;
//! use mimeo_generator::{ContextManager, Generator};
//!
//! let config = MimeoConfig::from_json(r#"{
//!     "_templates_": [
//!         {"count": 2, "model": {"Item": {"Id": "{auto_increment}"}}}
//!     ]
//! }"#).unwrap();
//!
//! let generator = Generator::new().unwrap();
//! let mut manager = ContextManager::from_config(&config);
//! let mut session = manager.start_session();
//!
//! let records: Vec<_> = generator
//!     .generate(&config.templates, &mut session)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records.len(), 2);
//! ```
//!
//! # Functions
//!
//! - `random_str`, `random_int`, `random_item` - Random scalars
//! - `date`, `date_time` - Local clock with deltas
//! - `auto_increment` - Per-context counters with a format pattern
//! - `curr_iter`, `key` - Iteration lookups, optionally in another context
//! - `city`, `country`, `currency`, `first_name`, `last_name` - Reference data
//! - `phone` - Digits following a template

pub mod context;
pub mod error;
pub mod generator;
pub mod manager;
pub mod renderer;
pub mod utils;

// Re-exports for convenience
pub use context::{ExecutionContext, Iteration};
pub use error::{ContextError, GeneratorError, RenderError};
pub use generator::{Generator, Records};
pub use manager::{ContextManager, Session};
pub use renderer::ValueRenderer;
pub use utils::MimeoUtil;
