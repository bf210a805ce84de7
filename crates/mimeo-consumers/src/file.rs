//! File consumer: one file per record.

use crate::Consumer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use mimeo_core::OutputConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes record `n` to `{directory}/{file_name}-{n}.{extension}`,
/// numbering from 1.
#[derive(Debug)]
pub struct FileConsumer {
    directory: PathBuf,
    file_name: String,
    extension: &'static str,
    files_written: u64,
}

impl FileConsumer {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>, extension: &'static str) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            extension,
            files_written: 0,
        }
    }

    pub fn from_output(output: &OutputConfig) -> Self {
        Self::new(
            &output.directory_path,
            &output.file_name,
            output.format.extension(),
        )
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    fn path_for(&self, index: u64) -> PathBuf {
        self.directory
            .join(format!("{}-{}.{}", self.file_name, index, self.extension))
    }
}

#[async_trait]
impl Consumer for FileConsumer {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn consume(&mut self, record: String) -> Result<()> {
        if self.files_written == 0 {
            tokio::fs::create_dir_all(&self.directory)
                .await
                .with_context(|| {
                    format!("Failed to create output directory: {}", self.directory.display())
                })?;
        }

        let path = self.path_for(self.files_written + 1);
        tokio::fs::write(&path, record.as_bytes())
            .await
            .with_context(|| format!("Failed to write record to: {}", path.display()))?;
        self.files_written += 1;

        debug!("Wrote record to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimeo_core::OutputFormat;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_numbered_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("out");
        let mut consumer = FileConsumer::new(&target, "record", "xml");

        consumer.consume("<A>1</A>".to_string()).await.unwrap();
        consumer.consume("<A>2</A>".to_string()).await.unwrap();
        consumer.finish().await.unwrap();

        assert_eq!(consumer.files_written(), 2);
        let first = std::fs::read_to_string(target.join("record-1.xml")).unwrap();
        let second = std::fs::read_to_string(target.join("record-2.xml")).unwrap();
        assert_eq!(first, "<A>1</A>");
        assert_eq!(second, "<A>2</A>");
    }

    #[tokio::test]
    async fn test_from_output_uses_format_extension() {
        let dir = TempDir::new().unwrap();
        let output = OutputConfig {
            directory_path: dir.path().to_path_buf(),
            file_name: "data".to_string(),
            format: OutputFormat::Json,
            ..OutputConfig::default()
        };
        let mut consumer = FileConsumer::from_output(&output);
        assert_eq!(consumer.directory(), dir.path());

        consumer.consume(r#"{"A":1}"#.to_string()).await.unwrap();
        assert!(dir.path().join("data-1.json").exists());
    }
}
