//! Per-key build coordination.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

/// Ensures at most one in-flight build per cache key.
///
/// The first caller to [`SingleFlight::begin`] for a key gets a guard and
/// proceeds; concurrent callers block until the guard drops, then re-check
/// the cache instead of building again.
#[derive(Default)]
pub struct SingleFlight {
    in_flight: Mutex<HashSet<String>>,
    done: Condvar,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the build slot for a key, blocking while another holder has it.
    pub fn begin<'a>(&'a self, key: &str) -> FlightGuard<'a> {
        let mut in_flight = self.in_flight.lock().expect("single flight lock poisoned");
        while in_flight.contains(key) {
            in_flight = self
                .done
                .wait(in_flight)
                .expect("single flight lock poisoned");
        }
        in_flight.insert(key.to_string());
        FlightGuard {
            coordinator: self,
            key: key.to_string(),
        }
    }

    /// Try to acquire the build slot without blocking.
    pub fn try_begin<'a>(&'a self, key: &str) -> Option<FlightGuard<'a>> {
        let mut in_flight = self.in_flight.lock().expect("single flight lock poisoned");
        if in_flight.contains(key) {
            return None;
        }
        in_flight.insert(key.to_string());
        Some(FlightGuard {
            coordinator: self,
            key: key.to_string(),
        })
    }

    fn finish(&self, key: &str) {
        let mut in_flight = self.in_flight.lock().expect("single flight lock poisoned");
        in_flight.remove(key);
        self.done.notify_all();
    }
}

/// Releases the key's build slot on drop, including on panic.
pub struct FlightGuard<'a> {
    coordinator: &'a SingleFlight,
    key: String,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.finish(&self.key);
    }
}
