//! Logging utilities for geoscatter.
//!
//! Structured `tracing` events for the render pipeline, so a failing figure run
//! names the stage and inputs involved.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::boundary::BoundaryGeometry;

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    // A second initialization (e.g. from tests) is not an error worth surfacing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation failed"
        );
    }
}

/// Run `f`, logging its duration under a fresh render id
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let render_id = generate_render_id();

    debug!(
        operation = operation,
        render_id = %render_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        render_id = %render_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log what a boundary source produced
pub fn log_boundary_load_stats(source: &str, geometry: &BoundaryGeometry) {
    let ring_count: usize = geometry
        .countries
        .iter()
        .map(|c| c.geometry.0.iter().map(|p| 1 + p.interiors().len()).sum::<usize>())
        .sum();

    info!(
        operation = "boundary_load",
        source = source,
        country_count = geometry.countries.len(),
        ring_count = ring_count,
        coastline_count = geometry.coastlines.len(),
        "Boundary data loaded"
    );
}

/// Log an error with the stage that produced it
pub fn log_error(error: &crate::error::GeoScatterError, context: &str) {
    error!(
        error = %error,
        stage = error.stage(),
        context = context,
        "Error occurred"
    );
}

/// Generate a unique render ID
pub fn generate_render_id() -> String {
    Uuid::new_v4().to_string()
}
