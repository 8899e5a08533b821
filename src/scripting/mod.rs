//! Script evaluation: pooled interpreters, deterministic script utilities
//! and graph result adaptation
//!
//! Graph scripts run on [rhai](https://rhai.rs) engines leased from a
//! [`VmPool`]. A script returns a map describing one of a small set of
//! graph shapes; [`adapt_result`](adapters::adapt_result) converts that map
//! into a typed [`GraphData`]. Script failures are captured per graph in
//! [`GraphResult`] so one broken script never takes down its neighbours.

mod adapters;
mod color;
mod engine;
mod error;
mod random;
mod vm_pool;

pub use adapters::{adapt_result, GraphResultAdapter};
pub use color::{parse_color, Color, ParseColorError, GRAPH_PALETTE};
pub use engine::{configure_engine, ScriptEngine};
pub use error::{get_argument, DatapointsKind, FunctionError};
pub use random::{palette_index, stable_hash32, SeededRandom};
pub use vm_pool::{VmGuard, VmPool, MAX_VMS};

use crate::error::EngineError;
use crate::timeutil::TemporalAmount;
use crate::types::DataPoint;
use chrono::{DateTime, Utc};

/// Text display size for [`GraphData::Text`] results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

impl TextSize {
    /// Map the numeric size used by scripts; out-of-range values clamp to
    /// the nearest size.
    pub fn from_script_value(value: i64) -> Self {
        match value {
            i64::MIN..=1 => TextSize::Small,
            2 => TextSize::Medium,
            _ => TextSize::Large,
        }
    }
}

/// One slice of a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSegment {
    pub label: String,
    pub value: f64,
    pub color: Option<Color>,
}

/// One line of a line graph, points in descending timestamp order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGraphLine {
    pub label: String,
    pub color: Option<Color>,
    pub points: Vec<DataPoint>,
}

/// One bar of a time bar chart, stamped with its bin's end.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBar {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub label: String,
}

/// A typed graph description produced by a script.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphData {
    /// A single highlighted datapoint (e.g. "last recorded value").
    DataPoint { point: DataPoint, is_duration: bool },
    Text { text: String, size: TextSize },
    PieChart { segments: Vec<PieSegment> },
    LineGraph { lines: Vec<LineGraphLine> },
    TimeBarChart {
        bin_size: Option<TemporalAmount>,
        bars: Vec<TimeBar>,
    },
}

/// The outcome of evaluating one graph script. Exactly one of `data` and
/// `error` is set.
#[derive(Debug)]
pub struct GraphResult {
    pub data: Option<GraphData>,
    pub error: Option<EngineError>,
}

impl GraphResult {
    pub fn success(data: GraphData) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: EngineError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}
