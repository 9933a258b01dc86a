//! # Point Mapper
//!
//! Converts decoded measurement batches into storage points.

use crate::sink::Point;
use crate::wire::MeasurementBatch;

/// Convert a measurement batch into a storage point
///
/// The measurement name is derived from the robot id (`"Robot #3"`), and
/// every reading is normalized to its real-world value before insertion into
/// the field map:
///
/// ```text
/// normalized = value * 10 ^ ten_fold_multiplier
/// ```
///
/// Duplicate labels within one batch resolve last-write-wins: entries are
/// inserted in wire order, so a later reading overwrites an earlier one with
/// the same label. Float overflow/underflow of the normalization is passed
/// through as computed.
///
/// # Arguments
///
/// * `batch` - Non-empty measurement batch (callers filter empty batches
///   through [`is_significant`](crate::pipeline::filter::is_significant) first)
///
/// # Returns
///
/// * `Point` - Storage point with one field per distinct label
pub fn to_point(batch: &MeasurementBatch) -> Point {
    let mut point = Point::new(format!("Robot #{}", batch.robot_id));

    for measurement in &batch.measurements {
        let normalized = measurement.value * 10f64.powi(measurement.ten_fold_multiplier as i32);
        point.insert_field(measurement.label.clone(), normalized);
    }

    point
}
