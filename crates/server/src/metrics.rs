//! Prometheus metrics for the quizvault server.
//!
//! Covers draft uploads, artifact moves, attempt extraction, virtual file
//! resolution and the temp file janitor.
//!
//! The `/metrics` endpoint is unauthenticated so Prometheus can scrape it.
//! Labels carry only outcome and error kinds, never identities, job ids or
//! paths, but aggregate usage is still visible: keep the endpoint reachable
//! from the scraper only.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Draft and artifact metrics
pub static DRAFTS_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_drafts_uploaded_total",
        "Total number of draft files uploaded",
    )
    .expect("metric creation failed")
});

pub static BYTES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_bytes_uploaded_total",
        "Total bytes received as draft uploads",
    )
    .expect("metric creation failed")
});

pub static ARTIFACTS_STORED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_artifacts_stored_total",
        "Total number of drafts moved into artifact storage",
    )
    .expect("metric creation failed")
});

pub static ARTIFACTS_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_artifacts_deleted_total",
        "Total number of artifacts deleted",
    )
    .expect("metric creation failed")
});

// Extraction metrics
pub static ATTEMPT_EXTRACTIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quizvault_attempt_extractions_total",
            "Total attempt extractions by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static ATTEMPT_EXTRACTION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "quizvault_attempt_extraction_duration_seconds",
            "Time taken to extract one attempt from an archive",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("metric creation failed")
});

// Virtual file metrics
pub static VIRTUAL_FILES_SERVED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_virtual_files_served_total",
        "Total number of virtual files resolved",
    )
    .expect("metric creation failed")
});

pub static VIRTUAL_FILE_REJECTIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quizvault_virtual_file_rejections_total",
            "Total rejected virtual file requests by error kind",
        ),
        &["error_type"],
    )
    .expect("metric creation failed")
});

// Janitor metrics
pub static JANITOR_SWEEPS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quizvault_janitor_sweeps_total",
            "Total temp file sweeps by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static JANITOR_FILES_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_janitor_files_deleted_total",
        "Total expired temp files deleted",
    )
    .expect("metric creation failed")
});

pub static JANITOR_BYTES_RECLAIMED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_janitor_bytes_reclaimed_total",
        "Total bytes of expired temp files deleted",
    )
    .expect("metric creation failed")
});

pub static JANITOR_ERRORS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "quizvault_janitor_errors_total",
        "Total temp files a sweep failed to delete",
    )
    .expect("metric creation failed")
});

pub static JANITOR_SWEEP_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "quizvault_janitor_sweep_duration_seconds",
            "Time taken by one temp file sweep",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]),
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent: calls after the first are no-ops, so tests and embedded
/// routers can call it freely.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(DRAFTS_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(BYTES_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ARTIFACTS_STORED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ARTIFACTS_DELETED.clone()))
            .expect("metric registration failed");

        // Extraction metrics
        REGISTRY
            .register(Box::new(ATTEMPT_EXTRACTIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ATTEMPT_EXTRACTION_DURATION.clone()))
            .expect("metric registration failed");

        // Virtual file metrics
        REGISTRY
            .register(Box::new(VIRTUAL_FILES_SERVED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(VIRTUAL_FILE_REJECTIONS.clone()))
            .expect("metric registration failed");

        // Janitor metrics
        REGISTRY
            .register(Box::new(JANITOR_SWEEPS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(JANITOR_FILES_DELETED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(JANITOR_BYTES_RECLAIMED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(JANITOR_ERRORS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(JANITOR_SWEEP_DURATION.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record the outcome of an attempt extraction (`success` or an error kind).
pub fn record_extraction(outcome: &str) {
    ATTEMPT_EXTRACTIONS.with_label_values(&[outcome]).inc();
}

/// Record a rejected virtual file request by error kind.
pub fn record_virtual_file_rejection(error_type: &str) {
    VIRTUAL_FILE_REJECTIONS.with_label_values(&[error_type]).inc();
}
