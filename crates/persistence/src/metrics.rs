//! Gateway metrics collection.
//!
//! Provides functions for recording backend call metrics.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of one gateway call.
pub fn record_gateway_duration(operation: &str, table: &str, duration_secs: f64) {
    histogram!(
        "gateway_request_duration_seconds",
        "operation" => operation.to_string(),
        "table" => table.to_string()
    )
    .record(duration_secs);
}

/// Count a failed gateway call.
pub fn record_gateway_error(operation: &str, table: &str) {
    counter!(
        "gateway_errors_total",
        "operation" => operation.to_string(),
        "table" => table.to_string()
    )
    .increment(1);
}

/// Record database connection pool metrics.
///
/// Only meaningful for the direct Postgres backend.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one gateway call.
///
/// Usage:
/// ```ignore
/// let timer = GatewayTimer::new("select", "faqs");
/// let result = self.send(request).await;
/// timer.finish(result.is_ok());
/// ```
pub struct GatewayTimer {
    operation: &'static str,
    table: String,
    start: Instant,
}

impl GatewayTimer {
    pub fn new(operation: &'static str, table: impl Into<String>) -> Self {
        Self {
            operation,
            table: table.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration, and an error count when `ok` is false.
    pub fn finish(self, ok: bool) {
        let duration = self.start.elapsed().as_secs_f64();
        record_gateway_duration(self.operation, &self.table, duration);
        if !ok {
            record_gateway_error(self.operation, &self.table);
        }
    }
}
