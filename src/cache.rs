//! Memoization of fitted curves.
//!
//! Entries are keyed by the exact input series and the requested model. The
//! cache is append-only and scanned linearly; the first inserted match wins.
//! [`ResultCache::get_or_fit`] runs at most one fit per key at a time: callers
//! arriving while a fit for their key is in progress wait for it and receive
//! the same result or error. Failed fits are not stored.

use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::error::{FitError, Result};
use crate::fit::FitResult;
use crate::model::FitModel;

/// Thread-safe store of fitted curves.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<Vec<Arc<FitResult>>>,
    in_flight: Mutex<Vec<Arc<Flight>>>,
}

/// A fit in progress.
#[derive(Debug)]
struct Flight {
    x: Vec<i64>,
    y: Vec<f64>,
    model: FitModel,
    outcome: Mutex<Option<Result<Arc<FitResult>>>>,
    done: Condvar,
}

impl Flight {
    fn matches(&self, x: &[i64], y: &[f64], model: FitModel) -> bool {
        self.model == model && self.x == x && self.y == y
    }

    fn publish(&self, outcome: Result<Arc<FitResult>>) {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(outcome);
        }
        self.done.notify_all();
    }

    fn wait(&self) -> Result<Arc<FitResult>> {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            slot = self.done.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Retires a flight when the leading caller leaves, including by panic.
struct FlightGuard<'a> {
    cache: &'a ResultCache,
    flight: Arc<Flight>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flight.publish(Err(FitError::ConvergenceFailure(
            "Fit was abandoned before it finished".to_string(),
        )));
        let mut in_flight = self
            .cache
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|f| !Arc::ptr_eq(f, &self.flight));
    }
}

impl ResultCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first stored result for exactly `(x, y, model)`.
    pub fn lookup(&self, x: &[i64], y: &[f64], model: FitModel) -> Option<Arc<FitResult>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let hit = entries.iter().find(|e| e.matches(x, y, model)).cloned();
        if hit.is_some() {
            debug!(model = %model, points = x.len(), "fit cache hit");
        }
        hit
    }

    /// Appends a result. Duplicates are kept; lookups return the oldest.
    pub fn store(&self, result: FitResult) -> Arc<FitResult> {
        let result = Arc::new(result);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&result));
        result
    }

    /// Returns the cached result for `(x, y, model)`, running `fit` on a miss.
    ///
    /// Concurrent callers for the same key share one run of `fit`. A
    /// successful result is stored before it is handed out; an error is
    /// returned to every waiting caller and nothing is stored.
    pub fn get_or_fit<F>(
        &self,
        x: &[i64],
        y: &[f64],
        model: FitModel,
        fit: F,
    ) -> Result<Arc<FitResult>>
    where
        F: FnOnce() -> Result<FitResult>,
    {
        if let Some(hit) = self.lookup(x, y, model) {
            return Ok(hit);
        }

        let flight = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(running) = in_flight.iter().find(|f| f.matches(x, y, model)) {
                let running = Arc::clone(running);
                drop(in_flight);
                debug!(model = %model, "waiting for in-flight fit");
                return running.wait();
            }
            // A leader may have finished between the first lookup and taking the lock.
            if let Some(hit) = self.lookup(x, y, model) {
                return Ok(hit);
            }
            let flight = Arc::new(Flight {
                x: x.to_vec(),
                y: y.to_vec(),
                model,
                outcome: Mutex::new(None),
                done: Condvar::new(),
            });
            in_flight.push(Arc::clone(&flight));
            flight
        };

        let guard = FlightGuard {
            cache: self,
            flight,
        };
        let outcome = fit().map(|result| self.store(result));
        guard.flight.publish(outcome.clone());
        drop(guard);
        outcome
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every stored result.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
