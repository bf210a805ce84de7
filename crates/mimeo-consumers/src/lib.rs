//! Record sinks for the mimeo data generator.
//!
//! A [`Consumer`] receives every record already serialized to its final
//! text form, in generation order.
//!
//! # Example
//!
//! ```ignore
//! use mimeo_consumers::consumer_for;
//!
//! let mut consumer = consumer_for(&config.output)?;
//! consumer.consume(record).await?;
//! consumer.finish().await?;
//! ```

pub mod file;
pub mod http;
pub mod stdout;

use anyhow::Result;
use async_trait::async_trait;
use mimeo_core::{OutputConfig, OutputDirection};

pub use file::FileConsumer;
pub use http::HttpConsumer;
pub use stdout::{StdoutConsumer, WriterConsumer};

/// Destination of serialized records.
#[async_trait]
pub trait Consumer: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one record.
    async fn consume(&mut self, record: String) -> Result<()>;

    /// Flush anything buffered once all records were delivered.
    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Build the consumer selected by `output.direction`.
pub fn consumer_for(output: &OutputConfig) -> Result<Box<dyn Consumer>> {
    Ok(match output.direction {
        OutputDirection::File => Box::new(FileConsumer::from_output(output)),
        OutputDirection::Stdout => Box::new(StdoutConsumer::stdout()),
        OutputDirection::Http => Box::new(HttpConsumer::from_output(output)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_for_direction() {
        let mut output = OutputConfig::default();
        assert_eq!(consumer_for(&output).unwrap().name(), "file");

        output.direction = OutputDirection::Stdout;
        assert_eq!(consumer_for(&output).unwrap().name(), "stdout");

        output.direction = OutputDirection::Http;
        assert_eq!(consumer_for(&output).unwrap().name(), "http");
    }
}
