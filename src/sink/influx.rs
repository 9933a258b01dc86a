//! # InfluxDB Sink
//!
//! Writes points to the InfluxDB v1 HTTP write API
//! (`POST {base}write?db={database}` with a line-protocol body; the server
//! answers 204 No Content on success and assigns timestamps itself since the
//! lines carry none).
//!
//! Writes are batched by size and interval. Transient failures (connection
//! errors, HTTP 5xx) are retried with linear backoff up to a bounded number
//! of attempts; HTTP 4xx responses are treated as unrecoverable immediately,
//! since the same payload would be rejected again.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::buffer::PointBuffer;
use super::{PersistenceSink, Point, SinkError};
use crate::config::InfluxConfig;

/// Outcome classification for one write attempt
#[derive(Debug, PartialEq, Eq)]
enum WriteOutcome {
    /// Backend accepted the batch
    Accepted,
    /// Worth retrying: network error or server-side failure
    Transient(String),
    /// Not worth retrying: the backend rejected the payload
    Fatal { status: u16, body: String },
}

/// Retry classification of an HTTP response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    /// 2xx: the batch was written
    Accepted,
    /// 4xx: the backend rejected the payload; retrying the same bytes
    /// would fail identically
    Fatal,
    /// Anything else: server-side or intermediary trouble, worth retrying
    Transient,
}

/// Classify an HTTP response status for retry purposes
fn classify_status(status: reqwest::StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Accepted
    } else if status.is_client_error() {
        StatusClass::Fatal
    } else {
        StatusClass::Transient
    }
}

/// InfluxDB-backed persistence sink
pub struct InfluxSink {
    client: reqwest::Client,
    write_url: String,
    buffer: PointBuffer,
    max_retries: u32,
    retry_backoff: Duration,
}

impl InfluxSink {
    /// Create a sink from the InfluxDB section of the bridge configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated InfluxDB configuration (URL, database, batching
    ///   and retry parameters)
    pub fn new(config: &InfluxConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            write_url: build_write_url(&config.url, &config.database),
            buffer: PointBuffer::new(
                config.batch_size,
                Duration::from_millis(config.flush_interval_ms),
            ),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// POST one batch of lines, classifying the result
    async fn post_batch(&self, body: String) -> WriteOutcome {
        match self.client.post(&self.write_url).body(body).send().await {
            Ok(response) => {
                let status = response.status();
                match classify_status(status) {
                    StatusClass::Accepted => WriteOutcome::Accepted,
                    StatusClass::Fatal => {
                        let body = response.text().await.unwrap_or_default();
                        WriteOutcome::Fatal {
                            status: status.as_u16(),
                            body,
                        }
                    }
                    StatusClass::Transient => WriteOutcome::Transient(format!("HTTP {}", status)),
                }
            }
            Err(e) => WriteOutcome::Transient(e.to_string()),
        }
    }

    /// Write a batch with bounded retry on transient failures
    async fn write_batch(&mut self, lines: Vec<String>) -> Result<(), SinkError> {
        let body = lines.join("\n");
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            match self.post_batch(body.clone()).await {
                WriteOutcome::Accepted => {
                    debug!("Wrote batch of {} points", lines.len());
                    return Ok(());
                }
                WriteOutcome::Fatal { status, body } => {
                    return Err(SinkError::Rejected { status, body });
                }
                WriteOutcome::Transient(reason) => {
                    warn!(
                        "Transient write failure (attempt {}/{}): {}",
                        attempt, self.max_retries, reason
                    );
                    last_error = reason;
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_backoff * attempt).await;
                    }
                }
            }
        }

        Err(SinkError::RetriesExhausted {
            attempts: self.max_retries,
            last_error,
        })
    }
}

#[async_trait]
impl PersistenceSink for InfluxSink {
    async fn write_point(&mut self, point: Point) -> Result<(), SinkError> {
        if let Some(batch) = self.buffer.push(point.to_line_protocol()) {
            self.write_batch(batch).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        let batch = self.buffer.take();
        if batch.is_empty() {
            return Ok(());
        }
        self.write_batch(batch).await
    }
}

/// Build the v1 write endpoint URL from the configured base URL and database
fn build_write_url(base_url: &str, database: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{}/write?db={}", base, database)
}
