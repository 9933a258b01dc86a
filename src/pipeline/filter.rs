//! # Batch Filter
//!
//! Drops measurement batches that carry no storable information.

use crate::wire::MeasurementBatch;

/// Check whether a batch is worth persisting
///
/// Empty batches are valid wire messages (heartbeats) but writing them would
/// pollute the storage backend with content-free points.
///
/// # Arguments
///
/// * `batch` - Decoded measurement batch
///
/// # Returns
///
/// * `bool` - false iff the batch has no measurements
pub fn is_significant(batch: &MeasurementBatch) -> bool {
    !batch.measurements.is_empty()
}
