use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{Gauge, IntCounterVec, IntGaugeVec, Opts, Registry};

use crate::errors::{AppError, AppResult};
use crate::services::delay::Bucket;
use crate::services::stats::StatsSummary;

pub fn prometheus_metrics() -> AppResult<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("delaymap")
        .endpoint("/metrics")
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build Prometheus middleware: {}", e)))
}

/// Fleet-level gauges and poller counters.
#[derive(Clone)]
pub struct FleetMetrics {
    trains: IntGaugeVec,
    max_delay: Gauge,
    fetch_failures: IntCounterVec,
    stale_responses: IntCounterVec,
}

impl FleetMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            trains: IntGaugeVec::new(
                Opts::new("delaymap_trains", "Trains per delay bucket"),
                &["bucket"],
            )?,
            max_delay: Gauge::new("delaymap_max_delay_seconds", "Largest effective delay")?,
            fetch_failures: IntCounterVec::new(
                Opts::new("delaymap_fetch_failures_total", "Failed backend fetches"),
                &["feed"],
            )?,
            stale_responses: IntCounterVec::new(
                Opts::new(
                    "delaymap_stale_responses_total",
                    "Responses discarded because a newer one was already applied",
                ),
                &["feed"],
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> AppResult<()> {
        let register = |collector: Box<dyn prometheus::core::Collector>| {
            registry
                .register(collector)
                .map_err(|e| AppError::Internal(format!("Failed to register metric: {}", e)))
        };
        register(Box::new(self.trains.clone()))?;
        register(Box::new(self.max_delay.clone()))?;
        register(Box::new(self.fetch_failures.clone()))?;
        register(Box::new(self.stale_responses.clone()))?;
        Ok(())
    }

    pub fn observe_summary(&self, summary: &StatsSummary) {
        for bucket in [Bucket::Green, Bucket::Orange, Bucket::Red] {
            self.trains
                .with_label_values(&[bucket.color()])
                .set(summary.count(bucket) as i64);
        }
        self.max_delay.set(summary.max_delay);
    }

    pub fn fetch_failed(&self, feed: &str) {
        self.fetch_failures.with_label_values(&[feed]).inc();
    }

    pub fn stale_response(&self, feed: &str) {
        self.stale_responses.with_label_values(&[feed]).inc();
    }

    pub fn fetch_failures(&self, feed: &str) -> u64 {
        self.fetch_failures.with_label_values(&[feed]).get()
    }

    pub fn stale_responses(&self, feed: &str) -> u64 {
        self.stale_responses.with_label_values(&[feed]).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::delay::tests::delayed_train;
    use crate::services::stats::aggregate;

    #[test]
    fn observes_bucket_counts() {
        let metrics = FleetMetrics::new().unwrap();
        let summary = aggregate(&[delayed_train("a", 0.0), delayed_train("b", 700.0)]);
        metrics.observe_summary(&summary);

        assert_eq!(metrics.trains.with_label_values(&["green"]).get(), 1);
        assert_eq!(metrics.trains.with_label_values(&["orange"]).get(), 0);
        assert_eq!(metrics.trains.with_label_values(&["red"]).get(), 1);
        assert_eq!(metrics.max_delay.get(), 700.0);
    }

    #[test]
    fn registers_into_registry() {
        let registry = Registry::new();
        let metrics = FleetMetrics::new().unwrap();
        metrics.register(&registry).unwrap();
        metrics.fetch_failed("trains");
        assert_eq!(metrics.fetch_failures("trains"), 1);
        assert!(metrics.register(&registry).is_err());
    }
}
