//! # Pipeline Module
//!
//! Orchestrates the telemetry stream from datagram source to storage sink.
//!
//! This module handles:
//! - Pulling raw datagrams from the source
//! - Decoding, filtering, and mapping each datagram in arrival order
//! - Pushing points into the persistence sink
//! - Local recovery from decode failures
//! - Graceful shutdown on an external stop signal

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sink::PersistenceSink;
use crate::source::DatagramSource;
use crate::wire::decode_batch;

pub mod filter;
pub mod mapper;

use filter::is_significant;
use mapper::to_point;

/// Number of datagrams between progress log messages
const LOG_INTERVAL_DATAGRAMS: u64 = 1000;

/// Default cadence for idle-time sink flushes
///
/// The sink's own batch buffer only checks its flush interval when a point
/// arrives, so when traffic goes idle the pipeline flushes on this cadence
/// to keep the last buffered points from sitting unwritten.
const DEFAULT_FLUSH_CADENCE: Duration = Duration::from_secs(1);

/// Lifecycle state of the pipeline
///
/// There is no pause state; once stopped, a pipeline must be re-constructed
/// to run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Accepting and processing datagrams
    Running,
    /// Terminated by shutdown, source exhaustion, or a fatal sink error
    Stopped,
}

/// Per-stage counters, reported in progress logs and the final summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Datagrams pulled from the source
    pub received: u64,
    /// Datagrams dropped because they failed schema decode
    pub decode_failures: u64,
    /// Batches skipped because they carried no measurements
    pub empty_skipped: u64,
    /// Points handed to the sink
    pub points_written: u64,
}

/// Streaming pipeline from a datagram source to a persistence sink
///
/// Each datagram is processed independently and synchronously in arrival
/// order: decode → filter → map → persist. The only suspension points are
/// waiting on the source and waiting on the sink, so storage backpressure
/// slows datagram consumption instead of buffering unboundedly.
pub struct Pipeline<S, K> {
    source: S,
    sink: K,
    state: PipelineState,
    stats: PipelineStats,
    flush_cadence: Duration,
}

impl<S: DatagramSource, K: PersistenceSink> Pipeline<S, K> {
    /// Create a pipeline in the `Running` state
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            state: PipelineState::Running,
            stats: PipelineStats::default(),
            flush_cadence: DEFAULT_FLUSH_CADENCE,
        }
    }

    /// Override the idle flush cadence
    pub fn flush_every(mut self, cadence: Duration) -> Self {
        self.flush_cadence = cadence;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Run the pipeline until shutdown, source exhaustion, or a fatal sink
    /// error
    ///
    /// # Arguments
    ///
    /// * `shutdown` - Watch channel; any change to `true` requests a stop.
    ///   An in-flight datagram finishes its decode/filter/map/persist before
    ///   the pipeline terminates, and no new datagrams are admitted after.
    ///
    /// # Returns
    ///
    /// * `Result<PipelineStats>` - Final counters on a clean stop
    ///
    /// # Errors
    ///
    /// Returns an error only for unrecoverable sink failures; decode
    /// failures are recovered locally and never escalate.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<PipelineStats> {
        info!("Pipeline running");

        let mut flush_timer = tokio::time::interval(self.flush_cadence);

        let outcome = loop {
            tokio::select! {
                // Poll in declaration order: a stop request must win over a
                // simultaneously-ready datagram, so nothing new is admitted
                // once a stop is requested
                biased;

                changed = shutdown.changed() => {
                    // A dropped sender counts as a stop request
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested, stopping datagram consumption");
                        break Ok(());
                    }
                }
                datagram = self.source.next_datagram() => {
                    match datagram {
                        Ok(Some(buffer)) => {
                            if let Err(e) = self.process_datagram(buffer).await {
                                break Err(e);
                            }
                        }
                        Ok(None) => {
                            info!("Datagram source exhausted");
                            break Ok(());
                        }
                        Err(e) => {
                            break Err(e.into());
                        }
                    }
                }
                _ = flush_timer.tick() => {
                    // Idle-time drain of the sink's batch buffer; a no-op
                    // when nothing is buffered
                    if let Err(e) = self.sink.flush().await {
                        break Err(e.into());
                    }
                }
            }
        };

        // Best-effort drain of buffered points; a clean stop surfaces any
        // flush failure, a failed stop keeps its original error
        let outcome = match outcome {
            Ok(()) => self.sink.flush().await.map_err(Into::into),
            Err(e) => {
                let _ = self.sink.flush().await;
                Err(e)
            }
        };

        self.state = PipelineState::Stopped;
        info!(
            "Pipeline stopped: {} received, {} decode failures, {} empty skipped, {} points written",
            self.stats.received,
            self.stats.decode_failures,
            self.stats.empty_skipped,
            self.stats.points_written
        );

        outcome.map(|_| self.stats)
    }

    /// Process one datagram through decode → filter → map → persist
    ///
    /// Decode failures and empty batches are absorbed here; only sink
    /// failures propagate.
    async fn process_datagram(&mut self, buffer: Bytes) -> Result<()> {
        self.stats.received += 1;
        if self.stats.received % LOG_INTERVAL_DATAGRAMS == 0 {
            info!(
                "Processed {} datagrams ({} points written, {} decode failures)",
                self.stats.received, self.stats.points_written, self.stats.decode_failures
            );
        }

        let batch = match decode_batch(&buffer) {
            Ok(batch) => batch,
            Err(e) => {
                self.stats.decode_failures += 1;
                warn!("Dropping undecodable datagram ({} bytes): {}", buffer.len(), e);
                return Ok(());
            }
        };

        if !is_significant(&batch) {
            self.stats.empty_skipped += 1;
            debug!("Skipping empty batch from robot {}", batch.robot_id);
            return Ok(());
        }

        let point = to_point(&batch);
        self.sink.write_point(point).await?;
        self.stats.points_written += 1;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::mocks::MockSink;
    use crate::sink::SinkError;
    use crate::source::mocks::MockSource;
    use crate::wire::{encode_batch, MeasurementBatch, SingleMeasurement};

    fn batch(robot_id: u32, readings: &[(&str, f64, i8)]) -> MeasurementBatch {
        MeasurementBatch {
            robot_id,
            measurements: readings
                .iter()
                .map(|(label, value, multiplier)| SingleMeasurement {
                    label: label.to_string(),
                    value: *value,
                    ten_fold_multiplier: *multiplier,
                })
                .collect(),
        }
    }

    fn frame(b: &MeasurementBatch) -> Bytes {
        Bytes::from(encode_batch(b).unwrap())
    }

    fn idle_shutdown() -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        // Keep the sender alive for the duration of the test
        std::mem::forget(tx);
        rx
    }

    #[tokio::test]
    async fn test_points_delivered_in_arrival_order() {
        let batches: Vec<_> = (1..=5u32)
            .map(|id| batch(id, &[("temp", id as f64, 0)]))
            .collect();
        let source = MockSource::new(batches.iter().map(frame).collect());

        let mut pipeline = Pipeline::new(source, MockSink::new());
        let stats = pipeline.run(idle_shutdown()).await.unwrap();

        assert_eq!(stats.points_written, 5);
        let names: Vec<_> = pipeline
            .sink
            .written
            .iter()
            .map(|p| p.measurement_name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["Robot #1", "Robot #2", "Robot #3", "Robot #4", "Robot #5"]
        );
    }

    #[tokio::test]
    async fn test_decode_failure_does_not_stop_pipeline() {
        let good_before = frame(&batch(1, &[("temp", 1.0, 0)]));
        let malformed = Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03, 0x04]);
        let good_after = frame(&batch(2, &[("temp", 2.0, 0)]));

        let source = MockSource::new(vec![good_before, malformed, good_after]);
        let mut pipeline = Pipeline::new(source, MockSink::new());
        let stats = pipeline.run(idle_shutdown()).await.unwrap();

        // The malformed datagram is dropped; everything around it survives
        assert_eq!(stats.received, 3);
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.points_written, 2);
        assert_eq!(pipeline.sink.written.len(), 2);
        assert_eq!(pipeline.sink.written[1].measurement_name(), "Robot #2");
    }

    #[tokio::test]
    async fn test_empty_batch_never_reaches_sink() {
        let heartbeat = frame(&batch(7, &[]));
        let real = frame(&batch(3, &[("temp", 21.0, 0)]));

        let source = MockSource::new(vec![heartbeat, real]);
        let mut pipeline = Pipeline::new(source, MockSink::new());
        let stats = pipeline.run(idle_shutdown()).await.unwrap();

        assert_eq!(stats.empty_skipped, 1);
        assert_eq!(stats.points_written, 1);
        assert_eq!(pipeline.sink.written.len(), 1);
        assert_eq!(pipeline.sink.written[0].measurement_name(), "Robot #3");
    }

    #[tokio::test]
    async fn test_duplicate_label_scenario() {
        // {robotId: 3, [temp 21.0 e0, temp 5.0 e1]} → Robot #3, temp=50.0
        let b = batch(3, &[("temp", 21.0, 0), ("temp", 5.0, 1)]);
        let source = MockSource::new(vec![frame(&b)]);

        let mut pipeline = Pipeline::new(source, MockSink::new());
        pipeline.run(idle_shutdown()).await.unwrap();

        let point = &pipeline.sink.written[0];
        assert_eq!(point.measurement_name(), "Robot #3");
        assert_eq!(point.field_count(), 1);
        assert_eq!(point.field("temp"), Some(50.0));
    }

    #[tokio::test]
    async fn test_fatal_sink_error_stops_pipeline() {
        let frames: Vec<_> = (1..=4u32)
            .map(|id| frame(&batch(id, &[("temp", 1.0, 0)])))
            .collect();
        let source = MockSource::new(frames);

        // Sink accepts two points, then fails unrecoverably
        let mut pipeline = Pipeline::new(source, MockSink::fail_after(2));
        let result = pipeline.run(idle_shutdown()).await;

        assert!(result.is_err());
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        assert_eq!(pipeline.sink.written.len(), 2);
        // The failing datagram was consumed but nothing after it was
        assert_eq!(pipeline.stats().received, 3);
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_consumption() {
        // A source that would block forever after its queued datagrams
        let source = MockSource::blocking_after(vec![frame(&batch(1, &[("temp", 1.0, 0)]))]);
        let (tx, rx) = watch::channel(false);

        // Request a stop shortly after startup; the pipeline is otherwise
        // parked waiting on the source forever
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let mut pipeline = Pipeline::new(source, MockSink::new());
        let stats = pipeline.run(rx).await.unwrap();
        assert_eq!(stats.points_written, 1);
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        // Buffered sink contents were flushed on the way out
        assert!(pipeline.sink.flush_count >= 1);
    }

    #[tokio::test]
    async fn test_no_datagram_admitted_after_stop_requested() {
        // A datagram sits ready in the source while the stop is already
        // requested; the stop must win every time
        for _ in 0..100 {
            let source = MockSource::blocking_after(vec![frame(&batch(1, &[("temp", 1.0, 0)]))]);
            let (tx, rx) = watch::channel(false);
            tx.send(true).unwrap();

            let mut pipeline = Pipeline::new(source, MockSink::new());
            let stats = pipeline.run(rx).await.unwrap();

            assert_eq!(
                stats.received, 0,
                "datagram admitted after stop was requested"
            );
            assert_eq!(stats.points_written, 0);
            assert_eq!(pipeline.state(), PipelineState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_idle_pipeline_flushes_sink_periodically() {
        // No datagrams at all: the sink still gets drained on the cadence
        let source = MockSource::blocking_after(vec![]);
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            let _ = tx.send(true);
        });

        let mut pipeline =
            Pipeline::new(source, MockSink::new()).flush_every(Duration::from_millis(10));
        let stats = pipeline.run(rx).await.unwrap();

        assert_eq!(stats.received, 0);
        assert!(
            pipeline.sink.flush_count >= 3,
            "expected several cadence flushes, got {}",
            pipeline.sink.flush_count
        );
    }

    #[tokio::test]
    async fn test_state_transitions_running_to_stopped() {
        let source = MockSource::new(vec![]);
        let mut pipeline = Pipeline::new(source, MockSink::new());

        assert_eq!(pipeline.state(), PipelineState::Running);
        pipeline.run(idle_shutdown()).await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
    }

    #[tokio::test]
    async fn test_sink_error_type_is_preserved() {
        let source = MockSource::new(vec![frame(&batch(1, &[("temp", 1.0, 0)]))]);
        let mut pipeline = Pipeline::new(source, MockSink::fail_after(0));

        let err = pipeline.run(idle_shutdown()).await.unwrap_err();
        match err {
            crate::error::InfluxBridgeError::Sink(SinkError::Rejected { status, .. }) => {
                assert_eq!(status, 400);
            }
            other => panic!("Expected Sink(Rejected) error, got: {:?}", other),
        }
    }
}
