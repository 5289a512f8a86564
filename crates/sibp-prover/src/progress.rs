//! Progress reporting across the worker/store boundary.
//!
//! The executor and strategies are synchronous and never yield
//! mid-computation; the only observable points are the explicit
//! [`ProgressSink::report`] calls before each pipeline stage. The sink
//! implementation (the service's result-store writer) is responsible for
//! making those updates visible to pollers.

/// Receives progress updates for a single job execution.
///
/// ## Contract
/// - `progress` is 0–100 and callers report it monotonically
///   non-decreasing within one execution.
/// - Implementations must not block for long; the pipeline calls this
///   inline between stages.
pub trait ProgressSink: Send + Sync {
    /// Record the current pipeline stage for pollers.
    fn report(&self, progress: u8, message: &str);
}

/// Sink that drops all updates (tests, fire-and-forget invocations).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _progress: u8, _message: &str) {}
}

/// Sink that records every update in order; test helper.
#[derive(Debug, Default)]
pub struct RecordingSink(std::sync::Mutex<Vec<(u8, String)>>);

impl RecordingSink {
    /// Snapshot of every `(progress, message)` reported so far.
    #[must_use]
    pub fn updates(&self) -> Vec<(u8, String)> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, progress: u8, message: &str) {
        if let Ok(mut v) = self.0.lock() {
            v.push((progress, message.to_owned()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::default();
        sink.report(10, "a");
        sink.report(25, "b");
        let ups = sink.updates();
        assert_eq!(ups.len(), 2);
        assert_eq!(ups[0], (10, "a".to_owned()));
        assert_eq!(ups[1].0, 25);
    }
}
