//! Test data builders for creating test objects

use chrono::{DateTime, Duration, TimeZone, Utc};
use graphstat_engine::sampling::DataSample;
use graphstat_engine::types::{DataPoint, DataSampleProperties};

/// Builder for creating test DataPoints
pub struct PointBuilder {
    timestamp: DateTime<Utc>,
    value: f64,
    label: String,
}

impl PointBuilder {
    pub fn new(value: f64) -> Self {
        Self {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap(),
            value,
            label: String::new(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn build(self) -> DataPoint {
        DataPoint::new(self.timestamp, self.value, self.label)
    }
}

/// Builder for creating in-memory test DataSamples with evenly spaced,
/// most-recent-first points
pub struct SampleBuilder {
    start: DateTime<Utc>,
    spacing: Duration,
    values: Vec<f64>,
    properties: DataSampleProperties,
}

impl SampleBuilder {
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap(),
            spacing: Duration::hours(1),
            values: Vec::new(),
            properties: DataSampleProperties::default(),
        }
    }

    /// Timestamp of the newest point; older points step back by the spacing
    pub fn newest_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }

    /// Values in most-recent-first order
    pub fn values(mut self, values: &[f64]) -> Self {
        self.values = values.to_vec();
        self
    }

    pub fn properties(mut self, properties: DataSampleProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn build(self) -> DataSample {
        let points = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(self.start - self.spacing * i as i32, *v, ""))
            .collect();
        DataSample::from_points(points, self.properties)
    }
}

impl Default for SampleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
