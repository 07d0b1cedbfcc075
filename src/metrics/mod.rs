//! Service Metrics
//!
//! Counters, gauges and a latency summary for the prediction endpoint,
//! rendered in the Prometheus text exposition format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// `f64` stored as raw bits so it can live in an atomic
#[derive(Debug, Default)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    fn add(&self, delta: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.0.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ServiceMetrics {
    requests: AtomicU64,
    errors: AtomicU64,
    latency_count: AtomicU64,
    latency_sum: AtomicF64,
    last_prediction: AtomicF64,
    drift_score: AtomicF64,
}

/// Point-in-time copy of every metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub latency_count: u64,
    pub latency_sum_seconds: f64,
    pub last_prediction: f64,
    pub drift_score: f64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, elapsed: Duration) {
        self.latency_count.fetch_add(1, Ordering::Relaxed);
        self.latency_sum.add(elapsed.as_secs_f64());
    }

    pub fn set_last_prediction(&self, probability: f64) {
        self.last_prediction.store(probability);
    }

    pub fn set_drift_score(&self, score: f64) {
        self.drift_score.store(score);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            latency_count: self.latency_count.load(Ordering::Relaxed),
            latency_sum_seconds: self.latency_sum.load(),
            last_prediction: self.last_prediction.load(),
            drift_score: self.drift_score.load(),
        }
    }

    /// Prometheus text exposition
    pub fn render(&self) -> String {
        let s = self.snapshot();
        let mut out = String::new();

        let _ = writeln!(out, "# HELP request_processing_seconds Tempo de processamento de requisição");
        let _ = writeln!(out, "# TYPE request_processing_seconds summary");
        let _ = writeln!(out, "request_processing_seconds_count {}", s.latency_count);
        let _ = writeln!(out, "request_processing_seconds_sum {}", s.latency_sum_seconds);

        write_sample(&mut out, "prediction_requests_total", "Número de requisições de predição", "counter", s.requests as f64);
        write_sample(&mut out, "prediction_errors_total", "Número de erros nas predições", "counter", s.errors as f64);
        write_sample(&mut out, "last_prediction_value", "Último valor predito", "gauge", s.last_prediction);
        write_sample(
            &mut out,
            "prediction_drift_score",
            "Métrica de drift baseada na média móvel das previsões",
            "gauge",
            s.drift_score,
        );

        out
    }
}

fn write_sample(out: &mut String, name: &str, help: &str, kind: &str, value: f64) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
    let _ = writeln!(out, "{} {}", name, value);
}
