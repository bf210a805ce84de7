//! Writer-backed consumers, standard output by default.

use crate::Consumer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

/// Writes each record followed by a newline.
#[derive(Debug)]
pub struct WriterConsumer<W> {
    writer: W,
}

/// Consumer printing records to standard output.
pub type StdoutConsumer = WriterConsumer<Stdout>;

impl StdoutConsumer {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> WriterConsumer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> Consumer for WriterConsumer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn consume(&mut self, record: String) -> Result<()> {
        self.writer
            .write_all(record.as_bytes())
            .await
            .context("Failed to write record")?;
        self.writer
            .write_all(b"\n")
            .await
            .context("Failed to write record separator")?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.writer.flush().await.context("Failed to flush output")
    }
}
