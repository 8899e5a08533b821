use crate::error::Result;
use crate::functions::DataSampleFunction;
use crate::sampling::DataSample;
use async_trait::async_trait;

/// Applies a list of functions in order, feeding each output into the next.
/// An empty list is the identity transform.
pub struct CompositeFunction {
    functions: Vec<Box<dyn DataSampleFunction>>,
}

impl CompositeFunction {
    pub fn new(functions: Vec<Box<dyn DataSampleFunction>>) -> Self {
        Self { functions }
    }
}

#[async_trait]
impl DataSampleFunction for CompositeFunction {
    async fn map_sample(&self, sample: DataSample) -> Result<DataSample> {
        let mut sample = sample;
        for function in &self.functions {
            sample = function.map_sample(sample).await?;
        }
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataPoint, DataSampleProperties};
    use chrono::{TimeZone, Utc};

    struct ScaleValues(f64);

    #[async_trait]
    impl DataSampleFunction for ScaleValues {
        async fn map_sample(&self, sample: DataSample) -> Result<DataSample> {
            let points = sample
                .iter()
                .map(|p| DataPoint::new(p.timestamp, p.value * self.0, p.label))
                .collect();
            let properties = sample.properties().clone();
            Ok(DataSample::from_points_with_parent(points, properties, sample))
        }
    }

    fn sample_of(values: &[f64]) -> DataSample {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                DataPoint::new(
                    Utc.timestamp_opt(1_000_000 - i as i64 * 60, 0).unwrap(),
                    *v,
                    "",
                )
            })
            .collect();
        DataSample::from_points(points, DataSampleProperties::default())
    }

    #[tokio::test]
    async fn test_empty_composite_is_identity() {
        let composite = CompositeFunction::new(vec![]);
        let out = composite.map_sample(sample_of(&[1.0, 2.0])).await.unwrap();
        let values: Vec<f64> = out.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_functions_apply_in_order() {
        let composite = CompositeFunction::new(vec![
            Box::new(ScaleValues(2.0)),
            Box::new(ScaleValues(10.0)),
        ]);
        let out = composite.map_sample(sample_of(&[1.0, 3.0])).await.unwrap();
        let values: Vec<f64> = out.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![20.0, 60.0]);
    }
}
