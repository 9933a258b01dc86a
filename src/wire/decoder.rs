//! # Telemetry Frame Decoder
//!
//! Decodes raw UDP datagram payloads into [`MeasurementBatch`] values.
//!
//! Decoding is pure and stateless. A failure for one datagram never affects
//! the processing of any other datagram; callers are expected to drop the
//! offending buffer and continue (UDP offers no integrity guarantee beyond
//! the payload checksum carried in the frame itself).

use thiserror::Error;

use super::crc::crc8_dvb_s2;
use super::protocol::*;

/// Reasons a datagram payload can fail to decode
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ends before the declared content does
    #[error("frame truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// First byte is not the telemetry sync byte
    #[error("invalid sync byte: 0x{0:02X}")]
    BadSyncByte(u8),

    /// Schema version this decoder does not understand
    #[error("unsupported schema version: 0x{0:02X}")]
    UnsupportedVersion(u8),

    /// Trailing CRC does not match the frame contents
    #[error("CRC mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    CrcMismatch { expected: u8, actual: u8 },

    /// A measurement entry declared a zero-length label
    #[error("measurement entry {0} has an empty label")]
    EmptyLabel(usize),

    /// A measurement label is not valid UTF-8
    #[error("measurement entry {0} has a non-UTF-8 label")]
    InvalidLabel(usize),

    /// Bytes remain after the declared entry count and CRC
    #[error("{0} trailing bytes after frame contents")]
    TrailingBytes(usize),
}

/// Decode a complete telemetry frame into a measurement batch
///
/// # Arguments
///
/// * `frame` - Raw datagram payload (sync byte through trailing CRC)
///
/// # Returns
///
/// * `Result<MeasurementBatch, DecodeError>` - Decoded batch, or the reason
///   the payload does not conform to the schema
///
/// # Errors
///
/// Returns an error if the frame is truncated, carries the wrong sync byte
/// or schema version, fails its CRC check, contains an empty or non-UTF-8
/// label, or has trailing bytes after the declared entries.
pub fn decode_batch(frame: &[u8]) -> Result<MeasurementBatch, DecodeError> {
    if frame.len() < TELEMETRY_MIN_FRAME_SIZE {
        return Err(DecodeError::Truncated {
            expected: TELEMETRY_MIN_FRAME_SIZE,
            actual: frame.len(),
        });
    }

    if frame[0] != TELEMETRY_SYNC_BYTE {
        return Err(DecodeError::BadSyncByte(frame[0]));
    }

    if frame[1] != TELEMETRY_SCHEMA_VERSION {
        return Err(DecodeError::UnsupportedVersion(frame[1]));
    }

    // CRC covers everything between the sync byte and the CRC byte itself
    let received_crc = frame[frame.len() - 1];
    let calculated_crc = crc8_dvb_s2(&frame[1..frame.len() - 1]);
    if calculated_crc != received_crc {
        return Err(DecodeError::CrcMismatch {
            expected: calculated_crc,
            actual: received_crc,
        });
    }

    let robot_id = u32::from_be_bytes([frame[2], frame[3], frame[4], frame[5]]);
    let count = u16::from_be_bytes([frame[6], frame[7]]) as usize;

    let body = &frame[TELEMETRY_HEADER_SIZE..frame.len() - 1];
    let mut offset = 0;
    // Capacity bounded by what the body could physically hold, so a forged
    // count cannot force a large allocation
    let mut measurements = Vec::with_capacity(count.min(body.len() / TELEMETRY_ENTRY_OVERHEAD));

    for index in 0..count {
        // Need at least the length prefix
        if offset >= body.len() {
            return Err(DecodeError::Truncated {
                expected: frame.len() + 1,
                actual: frame.len(),
            });
        }

        let label_len = body[offset] as usize;
        if label_len == 0 {
            return Err(DecodeError::EmptyLabel(index));
        }

        let entry_len = TELEMETRY_ENTRY_OVERHEAD + label_len;
        if offset + entry_len > body.len() {
            return Err(DecodeError::Truncated {
                expected: TELEMETRY_HEADER_SIZE + offset + entry_len + 1,
                actual: frame.len(),
            });
        }

        let label_bytes = &body[offset + 1..offset + 1 + label_len];
        let label = std::str::from_utf8(label_bytes)
            .map_err(|_| DecodeError::InvalidLabel(index))?
            .to_string();

        let value_start = offset + 1 + label_len;
        let mut value_bytes = [0u8; 8];
        value_bytes.copy_from_slice(&body[value_start..value_start + 8]);
        let value = f64::from_be_bytes(value_bytes);

        let ten_fold_multiplier = body[value_start + 8] as i8;

        measurements.push(SingleMeasurement {
            label,
            value,
            ten_fold_multiplier,
        });

        offset += entry_len;
    }

    if offset != body.len() {
        return Err(DecodeError::TrailingBytes(body.len() - offset));
    }

    Ok(MeasurementBatch {
        robot_id,
        measurements,
    })
}
