//! mimeo library
//!
//! Command-line plumbing around the mimeo generator: output overrides,
//! HTTP environments and the generation run itself.
//!
//! # Workspace Crates
//!
//! - `mimeo_core` - Configuration, template model and serialization
//! - `mimeo_data` - Reference datasets
//! - `mimeo_generator` - Contexts, value rendering and the template walker
//! - `mimeo_consumers` - File, stdout and HTTP sinks
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate XML files from a configuration
//! mimeo generate config.json
//!
//! # Print JSON records for every configuration in a directory
//! mimeo generate configs/ --direction stdout --format json --indent 2
//!
//! # Send records to an environment defined in .mimeoenv
//! mimeo generate config.yaml --direction http --env staging
//! ```

use clap::{Parser, ValueEnum};
use mimeo_core::{HttpMethod, HttpProtocol, OutputConfig, OutputDirection, OutputFormat};
use std::path::PathBuf;

pub mod env;
pub mod run;

pub use env::MimeoEnv;
pub use run::RunMetrics;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    File,
    Stdout,
    Http,
}

impl From<Direction> for OutputDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::File => OutputDirection::File,
            Direction::Stdout => OutputDirection::Stdout,
            Direction::Http => OutputDirection::Http,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Xml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xml => OutputFormat::Xml,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    #[value(name = "POST")]
    Post,
    #[value(name = "PUT")]
    Put,
}

impl From<Method> for HttpMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => HttpMethod::Post,
            Method::Put => HttpMethod::Put,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl From<Protocol> for HttpProtocol {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Http => HttpProtocol::Http,
            Protocol::Https => HttpProtocol::Https,
        }
    }
}

/// Output settings overriding the configuration file.
#[derive(Parser, Clone, Debug, Default)]
pub struct OutputOpts {
    /// Where records go
    #[arg(short = 'd', long, value_enum)]
    pub direction: Option<Direction>,

    /// Record format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<Format>,

    /// Indentation width (0 disables pretty printing)
    #[arg(short = 'i', long)]
    pub indent: Option<usize>,

    /// Emit the XML declaration
    #[arg(short = 'x', long)]
    pub xml_declaration: Option<bool>,

    /// Directory for file output
    #[arg(short = 'o', long = "directory", value_name = "PATH")]
    pub directory_path: Option<PathBuf>,

    /// File name prefix for file output
    #[arg(long)]
    pub file_name: Option<String>,

    /// HTTP request method
    #[arg(long, value_enum, ignore_case = true)]
    pub http_method: Option<Method>,

    /// HTTP protocol
    #[arg(long, value_enum)]
    pub http_protocol: Option<Protocol>,

    /// HTTP host
    #[arg(long)]
    pub http_host: Option<String>,

    /// HTTP port
    #[arg(long)]
    pub http_port: Option<u16>,

    /// HTTP endpoint path
    #[arg(long)]
    pub http_endpoint: Option<String>,

    /// HTTP basic auth user
    #[arg(long, env = "MIMEO_HTTP_USER")]
    pub http_user: Option<String>,

    /// HTTP basic auth password
    #[arg(long, env = "MIMEO_HTTP_PASSWORD", hide_env_values = true)]
    pub http_password: Option<String>,
}

impl OutputOpts {
    /// Overwrite every setting given on the command line.
    pub fn apply(&self, output: &mut OutputConfig) {
        if let Some(direction) = self.direction {
            output.direction = direction.into();
        }
        if let Some(format) = self.format {
            output.format = format.into();
        }
        if let Some(indent) = self.indent {
            output.indent = Some(indent);
        }
        if let Some(xml_declaration) = self.xml_declaration {
            output.xml_declaration = xml_declaration;
        }
        if let Some(directory_path) = &self.directory_path {
            output.directory_path = directory_path.clone();
        }
        if let Some(file_name) = &self.file_name {
            output.file_name = file_name.clone();
        }
        if let Some(method) = self.http_method {
            output.method = method.into();
        }
        if let Some(protocol) = self.http_protocol {
            output.protocol = protocol.into();
        }
        if let Some(host) = &self.http_host {
            output.host = host.clone();
        }
        if let Some(port) = self.http_port {
            output.port = Some(port);
        }
        if let Some(endpoint) = &self.http_endpoint {
            output.endpoint = endpoint.clone();
        }
        if let Some(user) = &self.http_user {
            output.username = Some(user.clone());
        }
        if let Some(password) = &self.http_password {
            output.password = Some(password.clone());
        }
    }
}
