//! # Influx Bridge Library
//!
//! Persist robot telemetry UDP datagrams to InfluxDB.
//!
//! This library provides the core streaming pipeline: datagram reception,
//! binary schema decode, empty-batch filtering, value normalization, point
//! construction, and batched persistence to the storage backend.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod wire;
