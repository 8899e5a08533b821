//! Bounded pool of script interpreter instances
//!
//! Engines are expensive to configure and must never run two scripts at
//! once, so each lives behind an async mutex and is leased out one caller
//! at a time. The pool reuses a free engine when one exists, grows up to
//! [`MAX_VMS`] engines on demand, and at capacity hands out waiters
//! round-robin so no single engine accumulates all the queueing.
//!
//! A lease is a [`VmGuard`]; dropping it returns the engine to the pool,
//! including on panic or task cancellation.

use crate::error::{EngineError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Upper bound on concurrently existing interpreter instances.
pub const MAX_VMS: usize = 8;

pub(crate) struct VmState {
    name: String,
    pub(crate) engine: rhai::Engine,
}

type VmCell = Arc<tokio::sync::Mutex<VmState>>;

/// Exclusive lease on one pooled engine. The engine is reusable by others
/// as soon as the guard drops.
pub struct VmGuard {
    guard: OwnedMutexGuard<VmState>,
}

impl VmGuard {
    /// Stable identifier of the leased instance ("VM-0" through "VM-7").
    pub fn name(&self) -> &str {
        &self.guard.name
    }

    pub fn engine(&mut self) -> &mut rhai::Engine {
        &mut self.guard.engine
    }
}

/// Pool of lazily-created, mutex-guarded script engines.
pub struct VmPool {
    builder: Box<dyn Fn() -> rhai::Engine + Send + Sync>,
    cells: Mutex<Vec<VmCell>>,
    next: AtomicUsize,
}

impl VmPool {
    pub fn new(builder: impl Fn() -> rhai::Engine + Send + Sync + 'static) -> Self {
        Self {
            builder: Box::new(builder),
            cells: Mutex::new(Vec::new()),
            next: AtomicUsize::new(0),
        }
    }

    /// Number of engine instances created so far.
    pub fn vm_count(&self) -> usize {
        self.cells.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Lease an engine, waiting if all instances are busy.
    ///
    /// Preference order: a currently-free engine, then a newly created one
    /// while under [`MAX_VMS`], then a round-robin pick among the existing
    /// instances.
    pub async fn acquire(&self) -> VmGuard {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());

            for cell in cells.iter() {
                if let Ok(guard) = Arc::clone(cell).try_lock_owned() {
                    return VmGuard { guard };
                }
            }

            if cells.len() < MAX_VMS {
                let name = format!("VM-{}", cells.len());
                tracing::debug!("Creating script engine instance {}", name);
                let cell: VmCell = Arc::new(tokio::sync::Mutex::new(VmState {
                    name,
                    engine: (self.builder)(),
                }));
                cells.push(Arc::clone(&cell));
                cell
            } else {
                let idx = self.next.fetch_add(1, Ordering::Relaxed) % cells.len();
                Arc::clone(&cells[idx])
            }
        };
        // Await outside the registry lock so other callers can pick
        // different instances while we queue.
        VmGuard {
            guard: cell.lock_owned().await,
        }
    }

    /// Lease an engine, giving up after `timeout`.
    pub async fn acquire_timeout(&self, timeout: std::time::Duration) -> Result<VmGuard> {
        tokio::time::timeout(timeout, self.acquire())
            .await
            .map_err(|_| {
                EngineError::Timeout(format!(
                    "No script engine became available within {timeout:?}"
                ))
            })
    }
}
