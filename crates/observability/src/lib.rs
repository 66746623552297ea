use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{info, warn};

static STATEMENTS_EXECUTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static STATEMENT_FAILURES_TOTAL: AtomicU64 = AtomicU64::new(0);

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Records one committed statement and increments the executed counter.
pub fn record_statement_latency(phase: &str, table: &str, duration: Duration) {
    let total = STATEMENTS_EXECUTED_TOTAL.fetch_add(1, Ordering::Relaxed) + 1;
    info!(
        metric = "statement_latency_ms",
        phase,
        table,
        latency_ms = duration_ms(duration),
        statements_executed_total = total
    );
}

/// Marks a statement failure, incrementing failure totals and logging diagnostics.
pub fn record_statement_failure(phase: &str, table: &str, error: &str) {
    let total = STATEMENT_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed) + 1;
    warn!(
        metric = "statement_failure",
        phase,
        table,
        error,
        statement_failures_total = total
    );
}

/// Records the wall-clock time of a completed statement sequence.
pub fn record_sequence_elapsed(phase: &str, statements: usize, duration: Duration) {
    info!(
        metric = "sequence_elapsed_ms",
        phase,
        statements,
        elapsed_ms = duration_ms(duration)
    );
}
