//! Prometheus metrics for the incident desk.
//!
//! Covers HTTP traffic, the read-through caches (hits, misses and
//! invalidations per cache region), the store queries selected by the query
//! router, and incident/comment mutations.
//!
//! # Example
//! ```no_run
//! use incident_desk::metrics::CACHE_HITS_TOTAL;
//!
//! CACHE_HITS_TOTAL.with_label_values(&["listing"]).inc();
//! ```

mod middleware;

pub use middleware::track_http_metrics;

use lazy_static::lazy_static;
use prometheus::{CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry};

const NAMESPACE: &str = "incident_desk";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    // ============================================================================
    // Cache Metrics
    // ============================================================================

    /// Labels: cache
    pub static ref CACHE_HITS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("cache_hits_total", "Read-through cache hits")
            .namespace(NAMESPACE),
        &["cache"]
    ).expect("Failed to create CACHE_HITS_TOTAL metric");

    /// Labels: cache
    pub static ref CACHE_MISSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("cache_misses_total", "Read-through cache misses")
            .namespace(NAMESPACE),
        &["cache"]
    ).expect("Failed to create CACHE_MISSES_TOTAL metric");

    /// Labels: cache, scope (key, predicate, all)
    pub static ref CACHE_INVALIDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("cache_invalidations_total", "Cache invalidations")
            .namespace(NAMESPACE),
        &["cache", "scope"]
    ).expect("Failed to create CACHE_INVALIDATIONS_TOTAL metric");

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Labels: form
    pub static ref STORE_QUERIES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("store_queries_total", "Listing queries issued to the store, by query form")
            .namespace(NAMESPACE),
        &["form"]
    ).expect("Failed to create STORE_QUERIES_TOTAL metric");

    /// Labels: operation, outcome
    pub static ref MUTATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("mutations_total", "Incident and comment mutations")
            .namespace(NAMESPACE),
        &["operation", "outcome"]
    ).expect("Failed to create MUTATIONS_TOTAL metric");

    /// Build information (always 1)
    pub static ref BUILD_INFO: Gauge = Gauge::with_opts(
        Opts::new("build_info", "Build information")
            .namespace(NAMESPACE)
            .const_label("version", env!("CARGO_PKG_VERSION"))
    ).expect("Failed to create BUILD_INFO metric");
}

/// Register all metrics with the global registry.
///
/// Calling it more than once is harmless.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
        Box::new(CACHE_HITS_TOTAL.clone()),
        Box::new(CACHE_MISSES_TOTAL.clone()),
        Box::new(CACHE_INVALIDATIONS_TOTAL.clone()),
        Box::new(STORE_QUERIES_TOTAL.clone()),
        Box::new(MUTATIONS_TOTAL.clone()),
        Box::new(BUILD_INFO.clone()),
    ];

    for collector in collectors {
        match PROMETHEUS_REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e),
        }
    }

    BUILD_INFO.set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Record the outcome of a mutating operation
pub fn record_mutation(operation: &str, applied: bool) {
    let outcome = if applied { "applied" } else { "not_found" };
    MUTATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Generate Prometheus text format metrics for the /metrics endpoint
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
