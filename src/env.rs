//! HTTP environments read from a `.mimeoenv` file.
//!
//! The file is a JSON object mapping environment names to HTTP settings:
//!
//! ```json
//! {
//!   "staging": {"protocol": "https", "host": "staging.example.com", "port": 443,
//!               "username": "mimeo", "password": "secret"}
//! }
//! ```

use anyhow::{Context, Result};
use mimeo_core::{HttpProtocol, OutputConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default environments file, relative to the working directory.
pub const DEFAULT_ENVS_FILE: &str = ".mimeoenv";

/// HTTP settings of one environment. Unset fields leave the
/// configuration untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MimeoEnv {
    pub protocol: Option<HttpProtocol>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MimeoEnv {
    /// Load the environment `name` from the environments file at `path`.
    pub fn load<P: AsRef<Path>>(path: P, name: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read environments file: {}", path.display()))?;
        let mut envs: BTreeMap<String, MimeoEnv> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse environments file: {}", path.display()))?;

        envs.remove(name).with_context(|| {
            format!(
                "No environment [{name}] in {} (available: {})",
                path.display(),
                envs.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }

    pub fn apply(&self, output: &mut OutputConfig) {
        if let Some(protocol) = self.protocol {
            output.protocol = protocol;
        }
        if let Some(host) = &self.host {
            output.host = host.clone();
        }
        if let Some(port) = self.port {
            output.port = Some(port);
        }
        if let Some(username) = &self.username {
            output.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            output.password = Some(password.clone());
        }
    }
}
