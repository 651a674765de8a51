//! Stale-response guards and loading flags.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Proof that a request was started; compare with [`RequestGeneration::is_current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    generation: u64,
}

impl Ticket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Monotonic per-resource counters. Starting a request for a key
/// supersedes every earlier ticket for that key, so a slow response that
/// lands after a newer request was issued is discarded.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    counters: Mutex<HashMap<String, u64>>,
}

impl RequestGeneration {
    pub fn begin(&self, key: &str) -> Ticket {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ticket {
            key: key.to_string(),
            generation: *counter,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters.get(&ticket.key) == Some(&ticket.generation)
    }

    /// Supersede any in-flight request for `key` without starting a new one.
    pub fn invalidate(&self, key: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(counter) = counters.get_mut(key) {
            *counter += 1;
        }
    }
}

/// Loading indicator shared between a view and its fetches.
///
/// Each fetch holds a [`LoadGuard`]; the view is loading while any guard
/// is alive. Guards release on drop, so an early return or error cannot
/// leave the flag stuck.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    in_flight: Arc<AtomicUsize>,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    pub fn start(&self) -> LoadGuard {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        LoadGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

#[derive(Debug)]
pub struct LoadGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
