//! # Telemetry Wire Protocol Module
//!
//! Binary schema for robot measurement datagrams.
//!
//! This module handles:
//! - Protocol constants and decoded types
//! - Decoding raw datagram payloads (with CRC verification)
//! - Encoding batches for producers and tests
//! - CRC8-DVB-S2 checksum calculation

pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod protocol;

pub use decoder::{decode_batch, DecodeError};
pub use encoder::{encode_batch, EncodeError};
pub use protocol::{MeasurementBatch, SingleMeasurement};
