//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Field edit outcomes
//! - Swap outcomes and transfer attempts
//! - Status checks
//! - Ledger size

use crate::error::SwapResult;

use axum::{routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, CounterVec, Encoder, GaugeVec, TextEncoder,
};
use std::net::SocketAddr;
use tracing::info;

lazy_static! {
    // Form metrics
    pub static ref FIELD_EDITS: CounterVec = register_counter_vec!(
        "swap_orchestrator_field_edits_total",
        "Total form field edits by field and outcome",
        &["field", "outcome"]
    ).unwrap();

    // Swap metrics
    pub static ref SWAPS_TOTAL: CounterVec = register_counter_vec!(
        "swap_orchestrator_swaps_total",
        "Total swaps by final outcome",
        &["status"]
    ).unwrap();

    pub static ref SWAP_ERRORS: CounterVec = register_counter_vec!(
        "swap_orchestrator_swap_errors_total",
        "Total swap errors by kind",
        &["kind"]
    ).unwrap();

    pub static ref TRANSFER_ATTEMPTS: CounterVec = register_counter_vec!(
        "swap_orchestrator_transfer_attempts_total",
        "Total transfer submission attempts",
        &[]
    ).unwrap();

    // Status metrics
    pub static ref STATUS_CHECKS: CounterVec = register_counter_vec!(
        "swap_orchestrator_status_checks_total",
        "Total status checks by resolved state",
        &["status"]
    ).unwrap();

    // Ledger metrics
    pub static ref LEDGER_RECORDS: GaugeVec = register_gauge_vec!(
        "swap_orchestrator_ledger_records",
        "Records currently held in the swap ledger",
        &[]
    ).unwrap();
}

/// Prometheus metrics server
pub struct MetricsServer {
    port: u16,
}

impl MetricsServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub async fn run(&self) -> SwapResult<()> {
        let app = Router::new().route("/metrics", get(metrics_handler));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting metrics server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();

        Ok(())
    }
}

async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

// Helper functions to record metrics

pub fn record_field_edit(field: &str, accepted: bool) {
    let outcome = if accepted { "accepted" } else { "ignored" };
    FIELD_EDITS.with_label_values(&[field, outcome]).inc();
}

pub fn record_swap_success() {
    SWAPS_TOTAL.with_label_values(&["success"]).inc();
}

pub fn record_swap_failure() {
    SWAPS_TOTAL.with_label_values(&["fail"]).inc();
}

pub fn record_swap_error(kind: &str) {
    SWAP_ERRORS.with_label_values(&[kind]).inc();
}

pub fn record_transfer_attempt() {
    TRANSFER_ATTEMPTS.with_label_values(&[]).inc();
}

pub fn record_status_check(status: &str) {
    STATUS_CHECKS.with_label_values(&[status]).inc();
}

pub fn record_ledger_records(count: usize) {
    LEDGER_RECORDS.with_label_values(&[]).set(count as f64);
}
