// src/db/monitoring.rs

use std::time::Instant;
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

/// Глобальные метрики операций хранилища
pub static DB_OPERATION_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "recordbook_db_operations_total",
        "Total number of record store operations executed",
        &["operation"]
    )
    .expect("Failed to create DB_OPERATION_COUNTER")
});

pub static DB_OPERATION_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "recordbook_db_operation_errors_total",
        "Number of record store operations that returned an error",
        &["operation"]
    )
    .expect("Failed to create DB_OPERATION_ERRORS")
});

pub static DB_OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "recordbook_db_operation_duration_seconds",
        "Duration of record store operations in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to create DB_OPERATION_DURATION")
});

/// Обёртка: выполняет операцию и собирает метрики (счётчик, ошибки, длительность).
pub fn measure_db_operation<T, E, F>(operation: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let result = f();
    let secs = start.elapsed().as_secs_f64();

    DB_OPERATION_COUNTER.with_label_values(&[operation]).inc();
    DB_OPERATION_DURATION.with_label_values(&[operation]).observe(secs);

    match &result {
        Ok(_) => debug!("DB operation {} took {:.4} seconds", operation, secs),
        Err(e) => {
            DB_OPERATION_ERRORS.with_label_values(&[operation]).inc();
            warn!("DB operation {} failed after {:.4} seconds: {}", operation, secs, e);
        }
    }
    result
}

/// Метрики в текстовом формате Prometheus
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
