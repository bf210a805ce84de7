//! Generation runs: configuration discovery, record generation and delivery.

use anyhow::{Context, Result};
use mimeo_consumers::{consumer_for, Consumer};
use mimeo_core::serialize::serialize;
use mimeo_core::MimeoConfig;
use mimeo_generator::{ContextManager, Generator};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration file extensions picked up from directories.
pub const CONFIG_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "toml"];

/// Metrics from a generation run.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Number of records delivered.
    pub records_written: u64,
    /// Serialized size of all records in bytes.
    pub bytes_written: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent rendering and serializing records.
    pub generation_duration: Duration,
    /// Time spent in the consumer.
    pub delivery_duration: Duration,
}

impl RunMetrics {
    /// Calculate records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.records_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Expand paths into configuration files. Directories contribute their
/// configuration files in name order.
pub fn collect_config_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut configs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            configs.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?;
        for entry in entries {
            let entry_path = entry
                .with_context(|| format!("Failed to read directory: {}", path.display()))?
                .path();
            if !entry_path.is_file() {
                continue;
            }
            if is_config_file(&entry_path) {
                found.push(entry_path);
            } else {
                warn!(path = %entry_path.display(), "Skipping non-configuration file");
            }
        }
        found.sort();
        if found.is_empty() {
            anyhow::bail!("No configuration files found in {}", path.display());
        }
        configs.extend(found);
    }
    Ok(configs)
}

fn is_config_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Generate every record of `config` into the consumer selected by its
/// output settings.
pub async fn generate(config: &MimeoConfig) -> Result<RunMetrics> {
    let mut consumer = consumer_for(&config.output)?;
    generate_into(config, consumer.as_mut()).await
}

/// Generate every record of `config` into `consumer`.
///
/// The first failing record aborts the run; records delivered before it
/// stay delivered.
pub async fn generate_into(config: &MimeoConfig, consumer: &mut dyn Consumer) -> Result<RunMetrics> {
    let start_time = Instant::now();
    let mut metrics = RunMetrics::default();

    let generator = Generator::new().context("Failed to load reference datasets")?;
    let mut manager = ContextManager::from_config(config);
    let mut session = manager.start_session();

    info!(
        "Generating {} template(s) into {} output",
        config.templates.len(),
        consumer.name()
    );

    let mut records = generator.generate(&config.templates, &mut session);
    loop {
        let gen_start = Instant::now();
        let Some(record) = records.next() else {
            break;
        };
        let record = record
            .with_context(|| format!("Failed to generate record #{}", metrics.records_written + 1))?;
        let text = serialize(&record, &config.output).context("Failed to serialize record")?;
        metrics.generation_duration += gen_start.elapsed();

        let delivery_start = Instant::now();
        metrics.bytes_written += text.len() as u64;
        consumer
            .consume(text)
            .await
            .with_context(|| format!("Failed to deliver record #{}", metrics.records_written + 1))?;
        metrics.delivery_duration += delivery_start.elapsed();
        metrics.records_written += 1;

        if metrics.records_written % 1000 == 0 {
            debug!("Delivered {} records", metrics.records_written);
        }
    }

    consumer.finish().await.context("Failed to finish output")?;
    metrics.total_duration = start_time.elapsed();

    info!(
        "Generated {} records ({} bytes) in {:?} ({:.0} records/sec)",
        metrics.records_written,
        metrics.bytes_written,
        metrics.total_duration,
        metrics.records_per_second()
    );
    debug!(
        "Generation took {:?}, delivery took {:?}",
        metrics.generation_duration, metrics.delivery_duration
    );

    Ok(metrics)
}
