//! Span helpers for store and service operations.

use tracing::{debug_span, Span};

/// Span for one resolved query against a mock table.
pub fn store_span(table: &str, operation: &str) -> Span {
    debug_span!("store", table = %table, op = %operation)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = %duration.as_micros(),
            "operation completed"
        );
        duration
    }
}
