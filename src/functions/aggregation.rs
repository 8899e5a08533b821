use crate::error::Result;
use crate::functions::DataSampleFunction;
use crate::sampling::DataSample;
use crate::timeutil::{AggregationPreferences, TemporalAmount, TimeHelper};
use crate::types::DataPoint;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

type ValueReducer = Box<dyn Fn(&[DataPoint]) -> f64 + Send + Sync>;
type LabelReducer = Box<dyn Fn(&[DataPoint]) -> String + Send + Sync>;

/// Folds a sample into fixed, calendar-aligned bins.
///
/// Bins are located with [`TimeHelper`] in the aggregator's time zone
/// (UTC unless [`with_time_zone`](Self::with_time_zone) says otherwise),
/// so a one-month bin covers a real calendar month and day bins start at
/// the user's local midnight. The walk starts at the bin containing the
/// newest point and moves backward in time; bins with no points are still
/// emitted, so downstream consumers see a gapless regular series. Each
/// output point is stamped with its bin's exclusive upper bound, and the
/// output sample's regularity is set to the bin size.
///
/// Large inputs are processed cooperatively: the task yields between bins
/// so aggregation never monopolises a runtime worker.
pub struct FixedBinAggregator<Tz: TimeZone = Utc> {
    bin_size: TemporalAmount,
    helper: TimeHelper,
    tz: Tz,
    value_reducer: ValueReducer,
    label_reducer: LabelReducer,
}

impl FixedBinAggregator<Utc> {
    /// Aggregator summing values per bin, with empty labels, bins aligned
    /// to UTC.
    pub fn new(bin_size: TemporalAmount, prefs: AggregationPreferences) -> Self {
        Self {
            bin_size,
            helper: TimeHelper::new(prefs),
            tz: Utc,
            value_reducer: Box::new(reducers::sum),
            label_reducer: Box::new(|_| String::new()),
        }
    }
}

impl<Tz: TimeZone> FixedBinAggregator<Tz> {
    /// Locate bin boundaries in the given zone instead.
    pub fn with_time_zone<Tz2: TimeZone>(self, tz: Tz2) -> FixedBinAggregator<Tz2> {
        FixedBinAggregator {
            bin_size: self.bin_size,
            helper: self.helper,
            tz,
            value_reducer: self.value_reducer,
            label_reducer: self.label_reducer,
        }
    }

    pub fn with_value_reducer(
        mut self,
        reducer: impl Fn(&[DataPoint]) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.value_reducer = Box::new(reducer);
        self
    }

    pub fn with_label_reducer(
        mut self,
        reducer: impl Fn(&[DataPoint]) -> String + Send + Sync + 'static,
    ) -> Self {
        self.label_reducer = Box::new(reducer);
        self
    }

    fn close_bin(&self, upper: chrono::DateTime<Utc>, bin: &[DataPoint]) -> DataPoint {
        DataPoint::new(upper, (self.value_reducer)(bin), (self.label_reducer)(bin))
    }
}

#[async_trait]
impl<Tz> DataSampleFunction for FixedBinAggregator<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
{
    async fn map_sample(&self, sample: DataSample) -> Result<DataSample> {
        let properties = sample
            .properties()
            .clone()
            .with_regularity(self.bin_size);

        let mut iter = sample.iter();
        let first = match iter.next() {
            Some(point) => point,
            None => return Ok(DataSample::from_points_with_parent(vec![], properties, sample)),
        };

        let (mut lower, mut upper) =
            self.helper
                .bucket_bounds(first.timestamp, &self.bin_size, &self.tz);
        let mut bin = vec![first];
        let mut out = Vec::new();

        for point in iter {
            // A point on the lower bound starts that bin, so strictly-less
            // means "belongs to an older bin".
            while point.timestamp < lower.with_timezone(&Utc) {
                out.push(self.close_bin(upper.with_timezone(&Utc), &bin));
                bin.clear();
                upper = lower.clone();
                lower = self.bin_size.subtract_from(&lower);
                tokio::task::yield_now().await;
            }
            bin.push(point);
        }
        out.push(self.close_bin(upper.with_timezone(&Utc), &bin));

        Ok(DataSample::from_points_with_parent(out, properties, sample))
    }
}

/// Ready-made bin reducers. All of them accept an empty bin.
pub mod reducers {
    use crate::types::DataPoint;

    pub fn sum(bin: &[DataPoint]) -> f64 {
        bin.iter().map(|p| p.value).sum()
    }

    /// Arithmetic mean, `0.0` for an empty bin.
    pub fn average(bin: &[DataPoint]) -> f64 {
        if bin.is_empty() {
            0.0
        } else {
            sum(bin) / bin.len() as f64
        }
    }

    pub fn count(bin: &[DataPoint]) -> f64 {
        bin.len() as f64
    }

    /// Label of the newest point in the bin, empty for an empty bin.
    pub fn latest_label(bin: &[DataPoint]) -> String {
        bin.first().map(|p| p.label.clone()).unwrap_or_default()
    }
}
