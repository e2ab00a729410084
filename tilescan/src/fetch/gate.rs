//! Admission gate for outbound tile requests.
//!
//! A counting semaphore that caps how many HTTP calls the fetcher has in
//! flight. Every worker holds one [`AdmissionPermit`] for the full duration of
//! its request; the permit is returned when dropped, whether the request
//! succeeded or failed.
//!
//! ```ignore
//! let gate = Arc::new(AdmissionGate::new(4));
//! let permit = gate.acquire().await?;
//! tokio::spawn(async move {
//!     // HTTP request happens here...
//!     drop(permit);
//! });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// The gate was closed while waiting for a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("admission gate closed")]
pub struct GateClosed;

#[derive(Debug, Default)]
struct GateCounters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl GateCounters {
    fn enter(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

        let mut peak = self.peak_in_flight.load(Ordering::SeqCst);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }
}

/// Fixed-capacity limiter for concurrent tile requests.
#[derive(Debug)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,

    /// Maximum permits
    capacity: usize,

    counters: Arc<GateCounters>,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `capacity` holders at once.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            counters: Arc::new(GateCounters::default()),
        }
    }

    /// Waits for a free slot.
    ///
    /// The returned permit is `'static` so it can move into a spawned task.
    pub async fn acquire(&self) -> Result<AdmissionPermit, GateClosed> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GateClosed)?;

        Ok(self.admit(permit))
    }

    /// Takes a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        Some(self.admit(permit))
    }

    fn admit(&self, permit: OwnedSemaphorePermit) -> AdmissionPermit {
        self.counters.enter();
        AdmissionPermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        }
    }

    /// Closes the gate; pending and future `acquire` calls fail with [`GateClosed`].
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Maximum number of simultaneous holders.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of permits held.
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at the same time since creation or the last reset.
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Number of free slots.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn reset_peak(&self) {
        self.counters
            .peak_in_flight
            .store(self.in_flight(), Ordering::SeqCst);
    }
}

/// A held slot in the [`AdmissionGate`]. Released on drop.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<GateCounters>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
