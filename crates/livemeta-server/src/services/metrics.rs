//! In-memory request metrics, per locale
//!
//! Counters live for the process lifetime and are never persisted.
//! Timestamp samples older than the rate window are pruned lazily when a
//! snapshot is taken.

use livemeta_core::Locale;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Samples older than this are dropped from the per-minute rate
const RATE_WINDOW: Duration = Duration::from_secs(60);

struct Sample {
    at: Instant,
    duration: Duration,
}

#[derive(Default)]
struct LocaleMetrics {
    requests: u64,
    errors: u64,
    samples: VecDeque<Sample>,
}

impl LocaleMetrics {
    fn prune(&mut self, now: Instant) {
        while let Some(sample) = self.samples.front() {
            if now.duration_since(sample.at) > RATE_WINDOW {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn stats(&self) -> LocaleStats {
        let average_response_time_ms = if self.samples.is_empty() {
            0
        } else {
            let total: Duration = self.samples.iter().map(|s| s.duration).sum();
            (total / self.samples.len() as u32).as_millis() as u64
        };
        let error_rate = if self.requests > 0 {
            round2(self.errors as f64 / self.requests as f64 * 100.0)
        } else {
            0.0
        };

        LocaleStats {
            total_requests: self.requests,
            total_errors: self.errors,
            requests_per_minute: self.samples.len() as u64,
            average_response_time_ms,
            error_rate,
        }
    }
}

#[derive(Default)]
struct State {
    pt: LocaleMetrics,
    es: LocaleMetrics,
}

impl State {
    fn locale_mut(&mut self, locale: Locale) -> &mut LocaleMetrics {
        match locale {
            Locale::Pt => &mut self.pt,
            Locale::Es => &mut self.es,
        }
    }
}

pub struct MetricsRegistry {
    started_at: Instant,
    state: Mutex<State>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocaleStats {
    pub total_requests: u64,
    pub total_errors: u64,
    pub requests_per_minute: u64,
    pub average_response_time_ms: u64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub apis: ApiStats,
    pub performance: Totals,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiStats {
    pub pt: LocaleStats,
    pub es: LocaleStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub total_requests: u64,
    pub total_errors: u64,
    pub total_requests_per_minute: u64,
    pub error_rate: f64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            state: Mutex::new(State::default()),
        }
    }

    /// Count one served request and its measured latency
    pub async fn record_request(&self, locale: Locale, duration: Duration) {
        self.record_request_at(locale, Instant::now(), duration).await;
    }

    async fn record_request_at(&self, locale: Locale, at: Instant, duration: Duration) {
        let mut state = self.state.lock().await;
        let metrics = state.locale_mut(locale);
        metrics.requests += 1;
        metrics.samples.push_back(Sample { at, duration });
    }

    pub async fn record_error(&self, locale: Locale) {
        let mut state = self.state.lock().await;
        state.locale_mut(locale).errors += 1;
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        state.pt.prune(now);
        state.es.prune(now);

        let pt = state.pt.stats();
        let es = state.es.stats();

        let total_requests = pt.total_requests + es.total_requests;
        let total_errors = pt.total_errors + es.total_errors;
        let error_rate = if total_requests > 0 {
            round2(total_errors as f64 / total_requests as f64 * 100.0)
        } else {
            0.0
        };

        MetricsSnapshot {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            performance: Totals {
                total_requests,
                total_errors,
                total_requests_per_minute: pt.requests_per_minute + es.requests_per_minute,
                error_rate,
            },
            apis: ApiStats { pt, es },
            timestamp: chrono::Utc::now(),
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_counter_is_monotonic_per_locale() {
        let metrics = MetricsRegistry::new();

        for _ in 0..3 {
            metrics
                .record_request(Locale::Pt, Duration::from_millis(10))
                .await;
        }
        metrics
            .record_request(Locale::Es, Duration::from_millis(10))
            .await;

        let snapshot = metrics.snapshot().await;
        assert_eq!(snapshot.apis.pt.total_requests, 3);
        assert_eq!(snapshot.apis.es.total_requests, 1);
        assert_eq!(snapshot.performance.total_requests, 4);
    }

    #[tokio::test]
    async fn errors_increment_only_the_error_counter() {
        let metrics = MetricsRegistry::new();

        metrics.record_error(Locale::Es).await;

        let snapshot = metrics.snapshot().await;
        assert_eq!(snapshot.apis.es.total_errors, 1);
        assert_eq!(snapshot.apis.es.total_requests, 0);
    }

    #[tokio::test]
    async fn old_samples_fall_out_of_the_rate_window() {
        let metrics = MetricsRegistry::new();

        let stale = Instant::now()
            .checked_sub(RATE_WINDOW + Duration::from_secs(1))
            .unwrap();
        metrics
            .record_request_at(Locale::Pt, stale, Duration::from_millis(30))
            .await;
        metrics
            .record_request(Locale::Pt, Duration::from_millis(10))
            .await;

        let snapshot = metrics.snapshot().await;
        // Both requests counted, only the recent one in the window
        assert_eq!(snapshot.apis.pt.total_requests, 2);
        assert_eq!(snapshot.apis.pt.requests_per_minute, 1);
        assert_eq!(snapshot.apis.pt.average_response_time_ms, 10);
    }

    #[tokio::test]
    async fn average_is_a_rolling_mean_of_retained_samples() {
        let metrics = MetricsRegistry::new();

        metrics
            .record_request(Locale::Es, Duration::from_millis(20))
            .await;
        metrics
            .record_request(Locale::Es, Duration::from_millis(40))
            .await;

        let snapshot = metrics.snapshot().await;
        assert_eq!(snapshot.apis.es.average_response_time_ms, 30);
    }

    #[tokio::test]
    async fn error_rate_is_percent_of_requests() {
        let metrics = MetricsRegistry::new();

        for _ in 0..4 {
            metrics
                .record_request(Locale::Pt, Duration::from_millis(5))
                .await;
        }
        metrics.record_error(Locale::Pt).await;

        let snapshot = metrics.snapshot().await;
        assert_eq!(snapshot.apis.pt.error_rate, 25.0);
    }
}
