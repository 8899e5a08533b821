//! Transform pipeline over data samples
//!
//! A [`DataSampleFunction`] consumes a [`DataSample`] and produces a new
//! one. Functions take ownership of their input so that the output sample
//! can carry the input's disposal responsibility; callers dispose only the
//! final output of a pipeline.
//!
//! Built-in functions:
//!
//! - [`CompositeFunction`] chains functions left to right
//! - [`DataClippingFunction`] restricts a sample to a time window
//! - [`FixedBinAggregator`] folds points into calendar-aligned bins
//! - [`DataMergeFunction`] interleaves several samples into one

mod aggregation;
mod clipping;
mod composite;
mod merge;

pub use aggregation::{reducers, FixedBinAggregator};
pub use clipping::DataClippingFunction;
pub use composite::CompositeFunction;
pub use merge::DataMergeFunction;

use crate::error::Result;
use crate::sampling::DataSample;
use async_trait::async_trait;

/// A transform from one data sample to another.
///
/// Implementations must preserve descending timestamp order and must
/// arrange for the returned sample's disposal to release the input's
/// resources (see [`DataSample::from_points_with_parent`]).
#[async_trait]
pub trait DataSampleFunction: Send + Sync {
    async fn map_sample(&self, sample: DataSample) -> Result<DataSample>;
}
