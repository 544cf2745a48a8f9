use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: availability checks run. Labels: outcome (available/rejected/error).
pub const CHECKS_TOTAL: &str = "oarlock_checks_total";

/// Histogram: availability check latency in seconds.
pub const CHECK_DURATION_SECONDS: &str = "oarlock_check_duration_seconds";

/// Counter: commit attempts rejected as unavailable.
pub const RESERVATIONS_REJECTED_TOTAL: &str = "oarlock_reservations_rejected_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Counter: reservations committed.
pub const RESERVATIONS_CREATED_TOTAL: &str = "oarlock_reservations_created_total";

/// Counter: reservations cancelled.
pub const RESERVATIONS_CANCELLED_TOTAL: &str = "oarlock_reservations_cancelled_total";

/// Gauge: currently committed reservations.
pub const RESERVATIONS_ACTIVE: &str = "oarlock_reservations_active";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Default fmt subscriber for host applications embedding the engine.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}
