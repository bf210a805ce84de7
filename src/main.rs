//! Command-line interface for mimeo
//!
//! # Usage Examples
//!
//! ## Generate
//! ```bash
//! # Generate records as configured in the file
//! mimeo generate config.json
//!
//! # Print indented JSON records to stdout
//! mimeo generate config.yaml --direction stdout --format json --indent 2
//!
//! # Reproducible output
//! mimeo generate config.toml --seed 42
//! ```
//!
//! ## HTTP Output
//! ```bash
//! # Use the "staging" environment from .mimeoenv
//! mimeo generate config.json --direction http --env staging
//!
//! # Explicit destination with credentials from the environment
//! MIMEO_HTTP_USER=user MIMEO_HTTP_PASSWORD=secret \
//!   mimeo generate config.json --direction http \
//!   --http-host localhost --http-port 8080 --http-endpoint /records
//! ```
//!
//! ## Validate
//! ```bash
//! mimeo validate configs/
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use mimeo::env::DEFAULT_ENVS_FILE;
use mimeo::run::collect_config_paths;
use mimeo::{MimeoEnv, OutputOpts};
use mimeo_core::MimeoConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mimeo")]
#[command(about = "Generate structured XML and JSON data from templates")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate records from configuration files
    Generate {
        /// Configuration files or directories containing them
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Output overrides
        #[command(flatten)]
        output: OutputOpts,

        /// HTTP environment name from the environments file
        #[arg(short = 'e', long)]
        env: Option<String>,

        /// Environments file
        #[arg(long, default_value = DEFAULT_ENVS_FILE)]
        envs_file: PathBuf,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Load and validate configuration files without generating
    Validate {
        /// Configuration files or directories containing them
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Records may go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            paths,
            output,
            env,
            envs_file,
            seed,
        } => {
            let env = env
                .map(|name| MimeoEnv::load(&envs_file, &name))
                .transpose()?;

            for path in collect_config_paths(&paths)? {
                let mut config = load_config(&path)?;
                if let Some(env) = &env {
                    env.apply(&mut config.output);
                }
                output.apply(&mut config.output);
                if seed.is_some() {
                    config.seed = seed;
                }

                info!("Processing {}", path.display());
                mimeo::run::generate(&config)
                    .await
                    .with_context(|| format!("Generation failed for {}", path.display()))?;
            }
        }
        Commands::Validate { paths } => {
            for path in collect_config_paths(&paths)? {
                let config = load_config(&path)?;
                info!(
                    "{} is valid: {} template(s), {} var(s), {} ref(s)",
                    path.display(),
                    config.templates.len(),
                    config.vars.len(),
                    config.refs.len()
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<MimeoConfig> {
    MimeoConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
