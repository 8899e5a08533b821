//! Adapters from raw script return values to typed graph data
//!
//! A script returns a map carrying a `type` tag. Each adapter recognises
//! one tag: a non-matching value yields `Ok(None)` so the next adapter can
//! try, while a matching tag with malformed content is a hard error. The
//! adapters are tried in a fixed priority order.

use crate::error::{EngineError, Result};
use crate::scripting::{
    parse_color, GraphData, LineGraphLine, PieSegment, TextSize, TimeBar,
};
use crate::timeutil::TemporalAmount;
use crate::types::DataPoint;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rhai::Dynamic;

const TAG_DATA_POINT: &str = "DATA_POINT";
const TAG_TEXT: &str = "TEXT";
const TAG_PIE_CHART: &str = "PIE_CHART";
const TAG_LINE_GRAPH: &str = "LINE_GRAPH";
const TAG_TIME_BARCHART: &str = "TIME_BARCHART";

/// Converts one script result shape into [`GraphData`].
pub trait GraphResultAdapter {
    /// `Ok(None)` when the value is not this adapter's shape, `Err` when it
    /// is but its content is malformed.
    fn adapt(&self, value: &Dynamic) -> Result<Option<GraphData>>;
}

/// Interpret a script return value, trying each known graph shape in
/// priority order.
pub fn adapt_result(value: &Dynamic) -> Result<GraphData> {
    let adapters: [&dyn GraphResultAdapter; 5] = [
        &DataPointAdapter,
        &TextAdapter,
        &PieChartAdapter,
        &LineGraphAdapter,
        &TimeBarChartAdapter,
    ];
    for adapter in adapters {
        if let Some(data) = adapter.adapt(value)? {
            return Ok(data);
        }
    }
    Err(EngineError::NoUsableResult)
}

fn as_map(value: &Dynamic) -> Option<rhai::Map> {
    value.clone().try_cast::<rhai::Map>()
}

fn tagged(value: &Dynamic, tag: &str) -> Option<rhai::Map> {
    let map = as_map(value)?;
    let found = map.get("type")?.clone().into_string().ok()?;
    (found == tag).then_some(map)
}

fn string_field(map: &rhai::Map, key: &str) -> Option<String> {
    map.get(key)?.clone().into_string().ok()
}

fn int_field(map: &rhai::Map, key: &str) -> Option<i64> {
    map.get(key)?.as_int().ok()
}

fn number_field(map: &rhai::Map, key: &str) -> Option<f64> {
    let value = map.get(key)?;
    value
        .as_float()
        .ok()
        .or_else(|| value.as_int().ok().map(|i| i as f64))
}

fn array_field(map: &rhai::Map, key: &str) -> Option<rhai::Array> {
    map.get(key)?.clone().try_cast::<rhai::Array>()
}

/// Timestamps cross the script boundary as epoch milliseconds.
fn timestamp_field(map: &rhai::Map, key: &str) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(int_field(map, key)?).single()
}

fn color_field(map: &rhai::Map, key: &str) -> Result<Option<crate::scripting::Color>> {
    match string_field(map, key) {
        Some(s) => Ok(Some(parse_color(&s)?)),
        None => Ok(None),
    }
}

fn malformed(tag: &str, what: &str) -> EngineError {
    EngineError::Script(format!("Malformed {tag} result: {what}"))
}

fn point_from(map: &rhai::Map, tag: &str) -> Result<DataPoint> {
    let timestamp =
        timestamp_field(map, "timestamp").ok_or_else(|| malformed(tag, "missing timestamp"))?;
    let value = number_field(map, "value").ok_or_else(|| malformed(tag, "missing value"))?;
    let label = string_field(map, "label").unwrap_or_default();
    Ok(DataPoint::new(timestamp, value, label))
}

struct DataPointAdapter;

impl GraphResultAdapter for DataPointAdapter {
    fn adapt(&self, value: &Dynamic) -> Result<Option<GraphData>> {
        let map = match tagged(value, TAG_DATA_POINT) {
            Some(map) => map,
            None => return Ok(None),
        };
        let point = point_from(&map, TAG_DATA_POINT)?;
        let is_duration = map
            .get("is_duration")
            .and_then(|v| v.as_bool().ok())
            .unwrap_or(false);
        Ok(Some(GraphData::DataPoint { point, is_duration }))
    }
}

struct TextAdapter;

impl GraphResultAdapter for TextAdapter {
    fn adapt(&self, value: &Dynamic) -> Result<Option<GraphData>> {
        let map = match tagged(value, TAG_TEXT) {
            Some(map) => map,
            None => return Ok(None),
        };
        let text = string_field(&map, "text").ok_or_else(|| malformed(TAG_TEXT, "missing text"))?;
        let size = int_field(&map, "size")
            .map(TextSize::from_script_value)
            .unwrap_or(TextSize::Medium);
        Ok(Some(GraphData::Text { text, size }))
    }
}

struct PieChartAdapter;

impl GraphResultAdapter for PieChartAdapter {
    fn adapt(&self, value: &Dynamic) -> Result<Option<GraphData>> {
        let map = match tagged(value, TAG_PIE_CHART) {
            Some(map) => map,
            None => return Ok(None),
        };
        let raw = array_field(&map, "segments")
            .ok_or_else(|| malformed(TAG_PIE_CHART, "missing segments"))?;
        let mut segments = Vec::with_capacity(raw.len());
        for entry in &raw {
            let entry = as_map(entry)
                .ok_or_else(|| malformed(TAG_PIE_CHART, "segment is not a map"))?;
            segments.push(PieSegment {
                label: string_field(&entry, "label")
                    .ok_or_else(|| malformed(TAG_PIE_CHART, "segment missing label"))?,
                value: number_field(&entry, "value")
                    .ok_or_else(|| malformed(TAG_PIE_CHART, "segment missing value"))?,
                color: color_field(&entry, "color")?,
            });
        }
        Ok(Some(GraphData::PieChart { segments }))
    }
}

struct LineGraphAdapter;

impl GraphResultAdapter for LineGraphAdapter {
    fn adapt(&self, value: &Dynamic) -> Result<Option<GraphData>> {
        let map = match tagged(value, TAG_LINE_GRAPH) {
            Some(map) => map,
            None => return Ok(None),
        };
        let raw =
            array_field(&map, "lines").ok_or_else(|| malformed(TAG_LINE_GRAPH, "missing lines"))?;
        let mut lines = Vec::with_capacity(raw.len());
        for entry in &raw {
            let entry =
                as_map(entry).ok_or_else(|| malformed(TAG_LINE_GRAPH, "line is not a map"))?;
            let raw_points = array_field(&entry, "points")
                .ok_or_else(|| malformed(TAG_LINE_GRAPH, "line missing points"))?;
            let mut points = Vec::with_capacity(raw_points.len());
            for point in &raw_points {
                let point = as_map(point)
                    .ok_or_else(|| malformed(TAG_LINE_GRAPH, "point is not a map"))?;
                points.push(point_from(&point, TAG_LINE_GRAPH)?);
            }
            lines.push(LineGraphLine {
                label: string_field(&entry, "label").unwrap_or_default(),
                color: color_field(&entry, "color")?,
                points,
            });
        }
        Ok(Some(GraphData::LineGraph { lines }))
    }
}

struct TimeBarChartAdapter;

impl GraphResultAdapter for TimeBarChartAdapter {
    fn adapt(&self, value: &Dynamic) -> Result<Option<GraphData>> {
        let map = match tagged(value, TAG_TIME_BARCHART) {
            Some(map) => map,
            None => return Ok(None),
        };
        let raw = array_field(&map, "bars")
            .ok_or_else(|| malformed(TAG_TIME_BARCHART, "missing bars"))?;
        let mut bars = Vec::with_capacity(raw.len());
        for entry in &raw {
            let entry =
                as_map(entry).ok_or_else(|| malformed(TAG_TIME_BARCHART, "bar is not a map"))?;
            let point = point_from(&entry, TAG_TIME_BARCHART)?;
            bars.push(TimeBar {
                timestamp: point.timestamp,
                value: point.value,
                label: point.label,
            });
        }
        let bin_size = int_field(&map, "bin_size_seconds")
            .map(|s| TemporalAmount::Duration(Duration::seconds(s)));
        Ok(Some(GraphData::TimeBarChart { bin_size, bars }))
    }
}
