//! Core data types for the graph-statistics engine
//!
//! This module contains the fundamental data structures used throughout
//! the engine for representing tracked measurements and script values.
//!
//! # Main Types
//!
//! - [`DataPoint`] - A single timestamped measurement with value and label
//! - [`DataSampleProperties`] - Sample-level metadata (bin regularity, value
//!   interpretation)
//! - [`Value`] - The closed set of typed values scripts can return and
//!   functions can accept as arguments
//! - [`ValueKind`] - The tag of a [`Value`], used for argument checking and
//!   diagnostics
//!
//! # Ordering
//!
//! Within one sample, points are strictly ordered by timestamp in the order
//! established at creation. All row sources and transforms in this crate use
//! descending (most-recent-first) ordering; several transforms rely on it
//! and document it explicitly.

use crate::scripting::Color;
use crate::timeutil::TemporalAmount;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped measurement. Immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// When the measurement was recorded
    pub timestamp: DateTime<Utc>,
    /// The measured value. For duration features this is a number of seconds.
    pub value: f64,
    /// Free-form label attached at tracking time (may be empty)
    pub label: String,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64, label: impl Into<String>) -> Self {
        Self {
            timestamp,
            value,
            label: label.into(),
        }
    }
}

/// Sample-level properties carried alongside the points of a
/// [`DataSample`](crate::sampling::DataSample).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSampleProperties {
    /// If the sample was produced by aggregation, the bin size its points
    /// are regular to. `None` for raw samples.
    pub regularity: Option<TemporalAmount>,
    /// Whether values should be interpreted as durations in seconds rather
    /// than plain numbers.
    pub is_duration: bool,
}

impl DataSampleProperties {
    pub fn duration() -> Self {
        Self {
            regularity: None,
            is_duration: true,
        }
    }

    pub fn with_regularity(mut self, regularity: TemporalAmount) -> Self {
        self.regularity = Some(regularity);
        self
    }
}

/// One variant of the closed script-result / function-argument type set.
///
/// Conversions between variants are explicit, never implicit: the `as_*`
/// accessors return `None` rather than coercing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Time(DateTime<Utc>),
    Duration(Duration),
    Datapoints(Vec<DataPoint>),
    Text(String),
    Color(Color),
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Time(_) => ValueKind::Time,
            Value::Duration(_) => ValueKind::Duration,
            Value::Datapoints(_) => ValueKind::Datapoints,
            Value::Text(_) => ValueKind::Text,
            Value::Color(_) => ValueKind::Color,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datapoints(&self) -> Option<&[DataPoint]> {
        match self {
            Value::Datapoints(points) => Some(points),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }
}

/// The tag of a [`Value`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Time,
    Duration,
    Datapoints,
    Text,
    Color,
}

impl ValueKind {
    /// Localized display name used in diagnostics.
    pub fn localized_name(&self) -> String {
        match self {
            ValueKind::Number => rust_i18n::t!("value_kind.number").into_owned(),
            ValueKind::Time => rust_i18n::t!("value_kind.time").into_owned(),
            ValueKind::Duration => rust_i18n::t!("value_kind.duration").into_owned(),
            ValueKind::Datapoints => rust_i18n::t!("value_kind.datapoints").into_owned(),
            ValueKind::Text => rust_i18n::t!("value_kind.text").into_owned(),
            ValueKind::Color => rust_i18n::t!("value_kind.color").into_owned(),
        }
    }
}
