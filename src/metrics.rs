// Performance metrics module
//
// Provides lightweight metrics tracking for monitoring application behavior

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Global performance metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Metrics are collected throughout the application lifecycle and logged
/// on shutdown for analysis.
#[derive(Debug)]
pub struct Metrics {
    /// Codes generated successfully
    pub codes_generated: AtomicUsize,

    /// Generations that failed
    pub generations_failed: AtomicUsize,

    /// Shortening requests issued
    pub shorten_requests: AtomicUsize,

    /// Shortening requests where every service failed
    pub shorten_failures: AtomicUsize,

    /// PNG exports written
    pub png_exports: AtomicUsize,

    /// SVG exports written
    pub svg_exports: AtomicUsize,

    /// Total encoding time in milliseconds
    pub total_encoding_time_ms: AtomicU64,

    /// Number of UI updates sent
    pub ui_updates: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            codes_generated: AtomicUsize::new(0),
            generations_failed: AtomicUsize::new(0),
            shorten_requests: AtomicUsize::new(0),
            shorten_failures: AtomicUsize::new(0),
            png_exports: AtomicUsize::new(0),
            svg_exports: AtomicUsize::new(0),
            total_encoding_time_ms: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_generated(&self) {
        self.codes_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_failed(&self) {
        self.generations_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shorten_request(&self) {
        self.shorten_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shorten_failure(&self) {
        self.shorten_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_png_export(&self) {
        self.png_exports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_svg_export(&self) {
        self.svg_exports.fetch_add(1, Ordering::Relaxed);
    }

    /// Record encoding time for a generation
    pub fn record_encoding_time(&self, duration: Duration) {
        self.total_encoding_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get average encoding time per generated code in milliseconds
    pub fn avg_encoding_time_ms(&self) -> f64 {
        let total = self.total_encoding_time_ms.load(Ordering::Relaxed);
        let count = self.codes_generated.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Performance Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Codes: {} generated, {} failed (avg encode: {:.2}ms)",
            self.codes_generated.load(Ordering::Relaxed),
            self.generations_failed.load(Ordering::Relaxed),
            self.avg_encoding_time_ms()
        );
        tracing::info!(
            "Shortening: {} requests, {} exhausted all services",
            self.shorten_requests.load(Ordering::Relaxed),
            self.shorten_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Exports: {} PNG, {} SVG",
            self.png_exports.load(Ordering::Relaxed),
            self.svg_exports.load(Ordering::Relaxed)
        );
        tracing::info!(
            "UI updates: {}",
            self.ui_updates.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.codes_generated.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.generations_failed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_operations() {
        let metrics = Metrics::new();

        metrics.record_generated();
        metrics.record_generated();
        metrics.record_generation_failed();
        metrics.record_shorten_request();
        metrics.record_shorten_failure();
        metrics.record_png_export();
        metrics.record_svg_export();

        assert_eq!(metrics.codes_generated.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.generations_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.shorten_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.shorten_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.png_exports.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.svg_exports.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_encoding_time() {
        let metrics = Metrics::new();

        metrics.record_generated();
        metrics.record_encoding_time(Duration::from_millis(100));
        metrics.record_generated();
        metrics.record_encoding_time(Duration::from_millis(200));

        assert_eq!(metrics.total_encoding_time_ms.load(Ordering::Relaxed), 300);
        assert_eq!(metrics.avg_encoding_time_ms(), 150.0);
    }

    #[test]
    fn test_avg_encoding_time_no_codes() {
        let metrics = Metrics::new();
        assert_eq!(metrics.avg_encoding_time_ms(), 0.0);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
