//! HTTP consumer: one request per record.

use crate::Consumer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use mimeo_core::{HttpMethod, OutputConfig, OutputFormat};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use tracing::debug;

/// Sends each record as the body of a request to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpConsumer {
    client: Client,
    method: Method,
    url: String,
    content_type: &'static str,
    credentials: Option<(String, Option<String>)>,
    requests_sent: u64,
}

impl HttpConsumer {
    pub fn from_output(output: &OutputConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            method: match output.method {
                HttpMethod::Post => Method::POST,
                HttpMethod::Put => Method::PUT,
            },
            url: output.url(),
            content_type: match output.format {
                OutputFormat::Xml => "application/xml",
                OutputFormat::Json => "application/json",
            },
            credentials: output
                .username
                .clone()
                .map(|user| (user, output.password.clone())),
            requests_sent: 0,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }
}

#[async_trait]
impl Consumer for HttpConsumer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn consume(&mut self, record: String) -> Result<()> {
        let mut request = self
            .client
            .request(self.method.clone(), &self.url)
            .header(CONTENT_TYPE, self.content_type)
            .body(record);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_ref());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send record to: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP request failed with status {status} for URL: {}", self.url);
        }

        self.requests_sent += 1;
        debug!("Sent record #{} to {} ({status})", self.requests_sent, self.url);
        Ok(())
    }
}
