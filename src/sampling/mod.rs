//! Data sampling: lazily-iterable, cacheable, disposable views over
//! persisted time-series points
//!
//! A [`DataSample`] is the unit of data the rest of the engine operates on:
//! a replayable sequence of [`DataPoint`]s plus sample-level
//! [`DataSampleProperties`], an optional accessor for the raw unclipped
//! underlying points, and a disposal action that releases whatever resource
//! backs the sample (typically a row cursor).
//!
//! # Lifecycle
//!
//! A sample must be disposed exactly once after its consumer finishes.
//! Repeated [`DataSample::dispose`] calls are no-ops; iterating after
//! disposal is forbidden by contract (cursor-backed samples will simply
//! stop yielding points, but callers must not rely on that).
//!
//! # Ordering
//!
//! Row sources yield points in descending timestamp order
//! (most-recent-first) and samples preserve that order across repeated
//! iterations.

mod cache;

pub use cache::{CacheIter, CachingSequence};

use crate::error::{EngineError, Result};
use crate::types::{DataPoint, DataSampleProperties};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// How many rows the cursor sequence requests from the row source at a time.
const CURSOR_BATCH_SIZE: usize = 256;

/// External row cursor over persisted points for one series.
///
/// Implementations yield points in descending timestamp order and expose a
/// total count usable for batched paging. Calls may perform I/O.
pub trait DataPointRowSource: Send {
    /// Total number of rows available.
    fn count(&mut self) -> Result<usize>;

    /// Fetch up to `max` rows. An empty batch means the source is
    /// exhausted.
    fn next_batch(&mut self, max: usize) -> Result<Vec<DataPoint>>;

    /// Release the underlying resource.
    fn close(&mut self) -> Result<()>;
}

type SharedRowSource = Arc<Mutex<Option<Box<dyn DataPointRowSource>>>>;

/// Iterator that pages rows out of a shared row source. Once the source is
/// exhausted, disposed, or fails, the iterator ends; read failures are
/// logged and surfaced to the owner via the disposal path.
struct CursorIter {
    source: SharedRowSource,
    buffer: VecDeque<DataPoint>,
    done: bool,
}

impl Iterator for CursorIter {
    type Item = DataPoint;

    fn next(&mut self) -> Option<DataPoint> {
        if let Some(point) = self.buffer.pop_front() {
            return Some(point);
        }
        if self.done {
            return None;
        }
        let mut guard = self.source.lock().unwrap_or_else(|e| e.into_inner());
        let source = match guard.as_mut() {
            Some(source) => source,
            None => {
                // Disposed underneath us; contract violation by the caller.
                self.done = true;
                return None;
            }
        };
        match source.next_batch(CURSOR_BATCH_SIZE) {
            Ok(batch) if batch.is_empty() => {
                self.done = true;
                None
            }
            Ok(batch) => {
                self.buffer.extend(batch);
                self.buffer.pop_front()
            }
            Err(e) => {
                tracing::error!("Row source read failed, ending iteration: {}", e);
                self.done = true;
                None
            }
        }
    }
}

/// Caches and replays the points of a [`DataPointRowSource`], and owns its
/// disposal.
#[derive(Clone)]
pub struct CursorSequence {
    source: SharedRowSource,
    cache: CachingSequence<DataPoint>,
    count: usize,
}

impl CursorSequence {
    pub fn new(mut source: Box<dyn DataPointRowSource>) -> Result<Self> {
        let count = source.count()?;
        let shared: SharedRowSource = Arc::new(Mutex::new(Some(source)));
        let iter = CursorIter {
            source: Arc::clone(&shared),
            buffer: VecDeque::new(),
            done: false,
        };
        Ok(Self {
            source: shared,
            cache: CachingSequence::new(iter),
            count,
        })
    }

    /// Total row count reported by the source at construction time.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn iter(&self) -> CacheIter<DataPoint> {
        self.cache.iter()
    }

    /// All underlying points, unclipped. Drains the cursor.
    pub fn raw_data_points(&self) -> Vec<DataPoint> {
        self.cache.collect_all()
    }

    /// The shared caching sequence over this cursor's points.
    pub fn sequence(&self) -> CachingSequence<DataPoint> {
        self.cache.clone()
    }

    /// Close the underlying cursor. Safe to call more than once.
    pub fn dispose(&self) -> Result<()> {
        let taken = self
            .source
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match taken {
            Some(mut source) => source
                .close()
                .map_err(|e| EngineError::Resource(e.to_string())),
            None => Ok(()),
        }
    }
}

type DisposeFn = Box<dyn FnOnce() -> Result<()> + Send + Sync>;
type RawPointsFn = Box<dyn Fn() -> Vec<DataPoint> + Send + Sync>;

/// An ordered, lazily-consumed, disposable collection of data points plus
/// metadata. See the module documentation for the lifecycle contract.
pub struct DataSample {
    properties: DataSampleProperties,
    points: CachingSequence<DataPoint>,
    raw_points: Option<RawPointsFn>,
    on_dispose: Option<DisposeFn>,
}

impl DataSample {
    /// Construct a sample from a raw point sequence, sample properties and a
    /// disposal callback.
    pub fn from_sequence<I>(
        points: I,
        properties: DataSampleProperties,
        on_dispose: Option<DisposeFn>,
    ) -> Self
    where
        I: Iterator<Item = DataPoint> + Send + 'static,
    {
        Self {
            properties,
            points: CachingSequence::new(points),
            raw_points: None,
            on_dispose,
        }
    }

    /// Construct an in-memory sample with no backing resource.
    pub fn from_points(points: Vec<DataPoint>, properties: DataSampleProperties) -> Self {
        Self::from_sequence(points.into_iter(), properties, None)
    }

    /// Construct an in-memory sample whose disposal also disposes `parent`.
    /// Used by transforms so the pipeline output carries the lifetime of
    /// the sample it was derived from.
    pub fn from_points_with_parent(
        points: Vec<DataPoint>,
        properties: DataSampleProperties,
        mut parent: DataSample,
    ) -> Self {
        Self::from_sequence(
            points.into_iter(),
            properties,
            Some(Box::new(move || parent.dispose())),
        )
    }

    /// Construct a sample backed by a row cursor. The sample owns the
    /// cursor: disposal closes it, and the raw-points accessor drains it.
    pub fn from_row_source(
        source: Box<dyn DataPointRowSource>,
        properties: DataSampleProperties,
    ) -> Result<Self> {
        let cursor = CursorSequence::new(source)?;
        let raw = cursor.clone();
        let for_dispose = cursor.clone();
        Ok(Self {
            properties,
            points: cursor.sequence(),
            raw_points: Some(Box::new(move || raw.raw_data_points())),
            on_dispose: Some(Box::new(move || for_dispose.dispose())),
        })
    }

    pub fn properties(&self) -> &DataSampleProperties {
        &self.properties
    }

    /// Iterate the sample's points. May be called repeatedly; each call
    /// replays the same points in the same order.
    pub fn iter(&self) -> CacheIter<DataPoint> {
        self.points.iter()
    }

    /// Collect all points into a vector, preserving order.
    pub fn to_vec(&self) -> Vec<DataPoint> {
        self.iter().collect()
    }

    /// The raw, unclipped underlying points, if this sample exposes them.
    /// Transformed samples generally do not.
    pub fn raw_points(&self) -> Option<Vec<DataPoint>> {
        self.raw_points.as_ref().map(|f| f())
    }

    /// Release the underlying resource. Only the first call runs the
    /// disposal action; subsequent calls are no-ops.
    pub fn dispose(&mut self) -> Result<()> {
        match self.on_dispose.take() {
            Some(dispose) => dispose(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for DataSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSample")
            .field("properties", &self.properties)
            .field("has_raw_points", &self.raw_points.is_some())
            .field("disposed", &self.on_dispose.is_none())
            .finish()
    }
}
