use crate::error::Result;
use crate::functions::DataSampleFunction;
use crate::sampling::DataSample;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Restricts a sample to the window `[end_time - sample_duration, end_time]`,
/// both bounds inclusive.
///
/// When `end_time` is `None`, the window ends at the sample's most recent
/// point. When `sample_duration` is `None`, the window extends indefinitely
/// into the past. With both `None` the input passes through untouched, so a
/// no-op clip does not force the sample into memory.
pub struct DataClippingFunction {
    end_time: Option<DateTime<Utc>>,
    sample_duration: Option<Duration>,
}

impl DataClippingFunction {
    pub fn new(end_time: Option<DateTime<Utc>>, sample_duration: Option<Duration>) -> Self {
        Self {
            end_time,
            sample_duration,
        }
    }
}

#[async_trait]
impl DataSampleFunction for DataClippingFunction {
    async fn map_sample(&self, sample: DataSample) -> Result<DataSample> {
        if self.end_time.is_none() && self.sample_duration.is_none() {
            return Ok(sample);
        }

        let mut iter = sample.iter().peekable();
        let end = match self.end_time.or_else(|| iter.peek().map(|p| p.timestamp)) {
            Some(end) => end,
            None => {
                // Empty sample, nothing to clip.
                let properties = sample.properties().clone();
                return Ok(DataSample::from_points_with_parent(vec![], properties, sample));
            }
        };
        let start = self.sample_duration.map(|d| end - d);

        let points = iter
            .skip_while(|p| p.timestamp > end)
            .take_while(|p| match start {
                Some(start) => p.timestamp >= start,
                None => true,
            })
            .collect();

        let properties = sample.properties().clone();
        Ok(DataSample::from_points_with_parent(points, properties, sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataPoint, DataSampleProperties};
    use chrono::TimeZone;

    /// Points at hours 10 down to 1 on 2024-05-15, value = hour.
    fn hourly_sample() -> DataSample {
        let points = (1..=10)
            .rev()
            .map(|h| {
                DataPoint::new(
                    Utc.with_ymd_and_hms(2024, 5, 15, h, 0, 0).unwrap(),
                    h as f64,
                    "",
                )
            })
            .collect();
        DataSample::from_points(points, DataSampleProperties::default())
    }

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_clip_with_end_and_duration() {
        let clip = DataClippingFunction::new(Some(hour(5)), Some(Duration::hours(3)));
        let out = clip.map_sample(hourly_sample()).await.unwrap();
        let values: Vec<f64> = out.iter().map(|p| p.value).collect();
        // Window [02:00, 05:00], both ends inclusive.
        assert_eq!(values, vec![5.0, 4.0, 3.0, 2.0]);
    }

    #[tokio::test]
    async fn test_clip_duration_only_ends_at_newest_point() {
        let clip = DataClippingFunction::new(None, Some(Duration::hours(2)));
        let out = clip.map_sample(hourly_sample()).await.unwrap();
        let values: Vec<f64> = out.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 9.0, 8.0]);
    }

    #[tokio::test]
    async fn test_clip_end_only_drops_newer_points() {
        let clip = DataClippingFunction::new(Some(hour(3)), None);
        let out = clip.map_sample(hourly_sample()).await.unwrap();
        let values: Vec<f64> = out.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
    }

    #[tokio::test]
    async fn test_no_bounds_passes_input_through() {
        let clip = DataClippingFunction::new(None, None);
        let out = clip.map_sample(hourly_sample()).await.unwrap();
        assert_eq!(out.to_vec(), hourly_sample().to_vec());
    }

    #[tokio::test]
    async fn test_empty_sample_clips_to_empty() {
        let clip = DataClippingFunction::new(None, Some(Duration::hours(1)));
        let sample = DataSample::from_points(vec![], DataSampleProperties::default());
        let out = clip.map_sample(sample).await.unwrap();
        assert!(out.to_vec().is_empty());
    }

    #[tokio::test]
    async fn test_clip_preserves_properties() {
        let clip = DataClippingFunction::new(Some(hour(5)), Some(Duration::hours(3)));
        let sample = DataSample::from_points(
            hourly_sample().to_vec(),
            DataSampleProperties::duration(),
        );
        let out = clip.map_sample(sample).await.unwrap();
        assert!(out.properties().is_duration);
    }
}
