//! # Telemetry Wire Protocol Constants and Types
//!
//! Fixed, versioned binary schema for robot measurement datagrams.
//!
//! Frame layout (big-endian):
//! ```text
//! sync(1) + version(1) + robot_id(4) + count(2) + entries(N) + crc(1)
//! ```
//! Each entry:
//! ```text
//! label_len(1) + label(label_len) + value(8, f64) + multiplier(1, i8)
//! ```

/// Telemetry frame sync byte (always 0xB5)
pub const TELEMETRY_SYNC_BYTE: u8 = 0xB5;

/// Supported schema version
pub const TELEMETRY_SCHEMA_VERSION: u8 = 0x01;

/// Header size: sync(1) + version(1) + robot_id(4) + count(2)
pub const TELEMETRY_HEADER_SIZE: usize = 8;

/// Minimum frame size: header + crc, i.e. an empty (heartbeat) batch
pub const TELEMETRY_MIN_FRAME_SIZE: usize = TELEMETRY_HEADER_SIZE + 1;

/// Fixed per-entry overhead: label_len(1) + value(8) + multiplier(1)
pub const TELEMETRY_ENTRY_OVERHEAD: usize = 10;

/// Maximum label length (fits the 1-byte length prefix)
pub const TELEMETRY_MAX_LABEL_LEN: usize = 255;

/// One named reading within a batch.
///
/// The real-world value is `value * 10^ten_fold_multiplier`; the multiplier
/// may be negative (e.g. millivolts reported with multiplier -3).
#[derive(Debug, Clone, PartialEq)]
pub struct SingleMeasurement {
    /// Field key within the batch
    pub label: String,

    /// Floating-point mantissa
    pub value: f64,

    /// Base-10 exponent applied to `value`
    pub ten_fold_multiplier: i8,
}

/// One decoded telemetry datagram: zero or more readings from one robot.
///
/// A batch with an empty `measurements` list is a valid wire message
/// (heartbeat) but carries no storable information.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementBatch {
    /// Identifier of the emitting robot
    pub robot_id: u32,

    /// Readings in wire order; duplicate labels are allowed and resolve
    /// last-write-wins when mapped into a point
    pub measurements: Vec<SingleMeasurement>,
}

impl MeasurementBatch {
    /// Encoded size of this batch, including sync, header, and CRC
    pub fn encoded_len(&self) -> usize {
        TELEMETRY_MIN_FRAME_SIZE
            + self
                .measurements
                .iter()
                .map(|m| TELEMETRY_ENTRY_OVERHEAD + m.label.len())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(TELEMETRY_SYNC_BYTE, 0xB5);
        assert_eq!(TELEMETRY_SCHEMA_VERSION, 0x01);
        assert_eq!(TELEMETRY_HEADER_SIZE, 8);
        assert_eq!(TELEMETRY_MIN_FRAME_SIZE, 9);
    }

    #[test]
    fn test_encoded_len_empty_batch() {
        let batch = MeasurementBatch {
            robot_id: 7,
            measurements: vec![],
        };
        assert_eq!(batch.encoded_len(), TELEMETRY_MIN_FRAME_SIZE);
    }

    #[test]
    fn test_encoded_len_counts_labels() {
        let batch = MeasurementBatch {
            robot_id: 1,
            measurements: vec![
                SingleMeasurement {
                    label: "temp".to_string(),
                    value: 21.0,
                    ten_fold_multiplier: 0,
                },
                SingleMeasurement {
                    label: "voltage".to_string(),
                    value: 11.1,
                    ten_fold_multiplier: 0,
                },
            ],
        };

        // 9 (frame overhead) + (10 + 4) + (10 + 7)
        assert_eq!(batch.encoded_len(), 9 + 14 + 17);
    }
}
