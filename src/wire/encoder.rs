//! # Telemetry Frame Encoder
//!
//! Encodes measurement batches into the fixed binary telemetry schema.
//!
//! The bridge itself only decodes; the encoder exists for producers and for
//! exercising the decode path against known-good frames.

use thiserror::Error;

use super::crc::crc8_dvb_s2;
use super::protocol::*;

/// Reasons a batch cannot be encoded
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A label exceeds the 1-byte length prefix
    #[error("label '{0}' exceeds 255 bytes")]
    LabelTooLong(String),

    /// A label is empty (reserved as invalid on the wire)
    #[error("empty label in measurement entry {0}")]
    EmptyLabel(usize),

    /// More entries than the 2-byte count field can carry
    #[error("batch has {0} measurements, maximum is 65535")]
    TooManyMeasurements(usize),
}

/// Encode a measurement batch into a complete telemetry frame
///
/// # Arguments
///
/// * `batch` - Batch to serialize
///
/// # Returns
///
/// * `Result<Vec<u8>, EncodeError>` - Complete frame (sync byte through
///   trailing CRC), suitable as a single UDP datagram payload
///
/// # Errors
///
/// Returns an error if any label is empty or longer than 255 bytes, or if
/// the batch holds more than `u16::MAX` measurements.
pub fn encode_batch(batch: &MeasurementBatch) -> Result<Vec<u8>, EncodeError> {
    if batch.measurements.len() > u16::MAX as usize {
        return Err(EncodeError::TooManyMeasurements(batch.measurements.len()));
    }

    let mut frame = Vec::with_capacity(batch.encoded_len());
    frame.push(TELEMETRY_SYNC_BYTE);
    frame.push(TELEMETRY_SCHEMA_VERSION);
    frame.extend_from_slice(&batch.robot_id.to_be_bytes());
    frame.extend_from_slice(&(batch.measurements.len() as u16).to_be_bytes());

    for (index, measurement) in batch.measurements.iter().enumerate() {
        if measurement.label.is_empty() {
            return Err(EncodeError::EmptyLabel(index));
        }
        if measurement.label.len() > TELEMETRY_MAX_LABEL_LEN {
            return Err(EncodeError::LabelTooLong(measurement.label.clone()));
        }

        frame.push(measurement.label.len() as u8);
        frame.extend_from_slice(measurement.label.as_bytes());
        frame.extend_from_slice(&measurement.value.to_be_bytes());
        frame.push(measurement.ten_fold_multiplier as u8);
    }

    // CRC covers everything between the sync byte and the CRC byte itself
    let crc = crc8_dvb_s2(&frame[1..]);
    frame.push(crc);

    Ok(frame)
}
