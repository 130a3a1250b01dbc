//! Change notification after successful mutations

use cantrip_core::{Method, StorePath, Value};
use parking_lot::Mutex;

/// Receives every committed mutation
///
/// Called after the store lock is released. Sinks cannot fail the request;
/// anything they need to report they must log themselves.
pub trait ChangeSink: Send + Sync {
    /// `value` is the created member for POST, the new value for PUT and
    /// PATCH, and the removed value for DELETE
    fn notify(&self, method: Method, path: &StorePath, value: &Value);
}

impl<F> ChangeSink for F
where
    F: Fn(Method, &StorePath, &Value) + Send + Sync,
{
    fn notify(&self, method: Method, path: &StorePath, value: &Value) {
        self(method, path, value)
    }
}

/// One recorded change
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Verb that committed
    pub method: Method,
    /// Request path
    pub path: StorePath,
    /// Value passed to the sink
    pub value: Value,
}

/// Sink that keeps every change in memory
#[derive(Debug, Default)]
pub struct ChangeLog {
    events: Mutex<Vec<ChangeEvent>>,
}

impl ChangeLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events, oldest first
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl ChangeSink for ChangeLog {
    fn notify(&self, method: Method, path: &StorePath, value: &Value) {
        self.events.lock().push(ChangeEvent {
            method,
            path: path.clone(),
            value: value.clone(),
        });
    }
}
