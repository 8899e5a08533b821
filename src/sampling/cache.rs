//! Replayable caching wrapper over a single-pass sequence
//!
//! A [`CachingSequence`] wraps a source iterator that may only be consumed
//! once (e.g. a database cursor) and hands out any number of replay
//! iterators. Whichever iterator is furthest ahead drives consumption;
//! every element pulled from the source is stored, and other iterators
//! replay the stored elements before resuming consumption of the shared
//! source.
//!
//! Invariant: the upstream source is consumed at most once in total,
//! regardless of how many iterators are created or how they interleave.
//!
//! Concurrency: the shared cache is safe for concurrent appends from
//! iterators advancing on different threads. A single iterator instance is
//! not designed to be used by multiple threads simultaneously.

use std::sync::{Arc, Mutex};

struct CacheState<T> {
    cache: Vec<T>,
    /// `None` once the source has been exhausted.
    source: Option<Box<dyn Iterator<Item = T> + Send>>,
}

/// A lazily-consumed, replayable view over a single-pass source.
pub struct CachingSequence<T: Clone> {
    state: Arc<Mutex<CacheState<T>>>,
}

impl<T: Clone> Clone for CachingSequence<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone> CachingSequence<T> {
    pub fn new<I>(source: I) -> Self
    where
        I: Iterator<Item = T> + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                cache: Vec::new(),
                source: Some(Box::new(source)),
            })),
        }
    }

    /// Create a new iterator that replays cached elements before resuming
    /// consumption of the shared source.
    pub fn iter(&self) -> CacheIter<T> {
        CacheIter {
            state: Arc::clone(&self.state),
            pos: 0,
        }
    }

    /// Drain the source completely and return all elements.
    pub fn collect_all(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Number of elements pulled from the source so far.
    pub fn cached_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cache
            .len()
    }
}

/// Iterator over a [`CachingSequence`]. Cheap to create; each instance
/// tracks its own position in the shared cache.
pub struct CacheIter<T: Clone> {
    state: Arc<Mutex<CacheState<T>>>,
    pos: usize,
}

impl<T: Clone> Iterator for CacheIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if self.pos < state.cache.len() {
            let item = state.cache[self.pos].clone();
            self.pos += 1;
            return Some(item);
        }
        let item = state.source.as_mut()?.next();
        match item {
            Some(item) => {
                state.cache.push(item.clone());
                self.pos += 1;
                Some(item)
            }
            None => {
                state.source = None;
                None
            }
        }
    }
}
