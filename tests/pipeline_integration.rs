//! End-to-end tests for the sample transform pipeline: cursor-backed
//! samples flowing through clipping and aggregation, with disposal
//! chained to the pipeline output.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::builders::{PointBuilder, SampleBuilder};
use common::{assert_float_eq, init_test_logging};
use graphstat_engine::error::Result;
use graphstat_engine::functions::{
    reducers, CompositeFunction, DataClippingFunction, DataSampleFunction, FixedBinAggregator,
};
use graphstat_engine::sampling::{DataPointRowSource, DataSample};
use graphstat_engine::timeutil::{AggregationPreferences, TemporalAmount};
use graphstat_engine::types::{DataPoint, DataSampleProperties};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct VecRowSource {
    points: Vec<DataPoint>,
    offset: usize,
    closes: Arc<AtomicUsize>,
}

impl VecRowSource {
    fn new(points: Vec<DataPoint>) -> (Box<dyn DataPointRowSource>, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Self {
                points,
                offset: 0,
                closes: Arc::clone(&closes),
            }),
            closes,
        )
    }
}

impl DataPointRowSource for VecRowSource {
    fn count(&mut self) -> Result<usize> {
        Ok(self.points.len())
    }

    fn next_batch(&mut self, max: usize) -> Result<Vec<DataPoint>> {
        let end = (self.offset + max).min(self.points.len());
        let batch = self.points[self.offset..end].to_vec();
        self.offset = end;
        Ok(batch)
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn day(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, h, 0, 0).unwrap()
}

/// One point per hour over several days, newest first.
fn hourly_points(newest: DateTime<Utc>, count: usize) -> Vec<DataPoint> {
    (0..count)
        .map(|i| DataPoint::new(newest - Duration::hours(i as i64), 1.0, ""))
        .collect()
}

#[tokio::test]
async fn test_clip_then_aggregate_cursor_backed_sample() {
    init_test_logging();
    let (source, _) = VecRowSource::new(hourly_points(day(15, 20), 24 * 10));
    let sample = DataSample::from_row_source(source, DataSampleProperties::default()).unwrap();

    let pipeline = CompositeFunction::new(vec![
        Box::new(DataClippingFunction::new(
            Some(day(15, 0)),
            Some(Duration::days(3)),
        )),
        Box::new(
            FixedBinAggregator::new(TemporalAmount::days(1), AggregationPreferences::default())
                .with_value_reducer(reducers::count),
        ),
    ]);

    let out = pipeline.map_sample(sample).await.unwrap();
    let points = out.to_vec();

    // Window [May 12 00:00, May 15 00:00] spans four calendar days; the
    // newest bin holds only the point exactly on the window end.
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 24.0, 24.0, 24.0]);
    assert_eq!(points[0].timestamp, day(16, 0));
    assert_eq!(out.properties().regularity, Some(TemporalAmount::days(1)));
}

#[tokio::test]
async fn test_disposal_chains_through_the_whole_pipeline() {
    let (source, closes) = VecRowSource::new(hourly_points(day(15, 20), 48));
    let sample = DataSample::from_row_source(source, DataSampleProperties::default()).unwrap();

    let pipeline = CompositeFunction::new(vec![
        Box::new(DataClippingFunction::new(None, Some(Duration::days(1)))),
        Box::new(FixedBinAggregator::new(
            TemporalAmount::days(1),
            AggregationPreferences::default(),
        )),
    ]);

    let mut out = pipeline.map_sample(sample).await.unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 0);

    out.dispose().unwrap();
    out.dispose().unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_aggregated_output_is_replayable() {
    let sample = SampleBuilder::new()
        .newest_at(day(15, 12))
        .spacing(Duration::hours(6))
        .values(&[4.0, 3.0, 2.0, 1.0])
        .build();

    let agg = FixedBinAggregator::new(TemporalAmount::days(1), AggregationPreferences::default());
    let out = agg.map_sample(sample).await.unwrap();

    assert_eq!(out.to_vec(), out.to_vec());
}

#[tokio::test]
async fn test_duration_flag_survives_the_pipeline() {
    let sample = SampleBuilder::new()
        .newest_at(day(15, 12))
        .values(&[3600.0, 1800.0])
        .properties(DataSampleProperties::duration())
        .build();

    let pipeline = CompositeFunction::new(vec![
        Box::new(DataClippingFunction::new(None, Some(Duration::days(7)))),
        Box::new(FixedBinAggregator::new(
            TemporalAmount::days(1),
            AggregationPreferences::default(),
        )),
    ]);

    let out = pipeline.map_sample(sample).await.unwrap();
    assert!(out.properties().is_duration);
    assert_float_eq(out.to_vec()[0].value, 5400.0, 1e-9);
}

#[tokio::test]
async fn test_label_reducer_sees_labels_through_the_pipeline() {
    init_test_logging();
    let points = vec![
        PointBuilder::new(2.0).at(day(15, 18)).label("evening").build(),
        PointBuilder::new(1.0).at(day(15, 8)).label("morning").build(),
    ];
    let sample = DataSample::from_points(points, DataSampleProperties::default());

    let agg = FixedBinAggregator::new(TemporalAmount::days(1), AggregationPreferences::default())
        .with_label_reducer(reducers::latest_label);
    let out = agg.map_sample(sample).await.unwrap().to_vec();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].label, "evening");
}
