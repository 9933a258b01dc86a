//! # Storage Point
//!
//! Storage-facing representation of one persisted record, plus its InfluxDB
//! line-protocol rendering.
//!
//! Line protocol format:
//! ```text
//! measurement field1=val1,field2=val2
//! ```
//! The timestamp column is deliberately omitted so the storage backend
//! assigns receive time itself.

use std::collections::BTreeMap;

/// One record destined for time-series storage
///
/// Fields are keyed by measurement label; insertion with an existing key
/// overwrites the previous value (last-write-wins). The ordered map makes
/// the rendered line deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement_name: String,
    fields: BTreeMap<String, f64>,
}

impl Point {
    /// Create a point with no fields yet
    pub fn new(measurement_name: String) -> Self {
        Self {
            measurement_name,
            fields: BTreeMap::new(),
        }
    }

    /// Insert a normalized field value, overwriting any previous value
    /// stored under the same label
    pub fn insert_field(&mut self, label: String, value: f64) {
        self.fields.insert(label, value);
    }

    /// The measurement name this point is stored under
    pub fn measurement_name(&self) -> &str {
        &self.measurement_name
    }

    /// Look up a field value by label
    pub fn field(&self, label: &str) -> Option<f64> {
        self.fields.get(label).copied()
    }

    /// Number of distinct fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether the point carries any fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render this point as one InfluxDB line-protocol line
    ///
    /// Measurement names and field keys are escaped per the line-protocol
    /// syntax (commas, spaces, and equals signs). Field values are plain
    /// floats. No timestamp is appended. A point without fields renders as
    /// the bare measurement name, with no trailing separator.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement_name);

        for (i, (label, value)) in self.fields.iter().enumerate() {
            line.push(if i == 0 { ' ' } else { ',' });
            line.push_str(&escape_field_key(label));
            line.push('=');
            line.push_str(&format_field_value(*value));
        }

        line
    }
}

/// Escape a measurement name: commas and spaces
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape a field key: commas, equals signs, and spaces
fn escape_field_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Format a float field value for line protocol
///
/// A bare numeric literal parses as a float on the InfluxDB side, so no
/// type suffix is needed.
fn format_field_value(value: f64) -> String {
    format!("{}", value)
}
