use super::metric_set::{MetricDesc, metric_desc};
use crate::Result;
use core::fmt::{Debug, Formatter};
use core::time::Duration;
use ohno::IntoAppError;
use prometheus::proto::MetricFamily;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

const LOG_TARGET: &str = "   metrics";

pub static REQUEST_FAILURES: MetricDesc = metric_desc!(
    "github_request_failures_total",
    "Number of failed requests to the GitHub API, by collector",
    &["collector"]
);

pub static REQUEST_DURATION: MetricDesc = metric_desc!(
    "github_request_duration_seconds",
    "Time spent fetching one target from the GitHub API, by collector",
    &["collector"]
);

/// Metrics about the exporter's own GitHub traffic, kept across scrapes.
pub struct RequestMetrics {
    registry: Registry,
    failures: IntCounterVec,
    duration: HistogramVec,
}

impl RequestMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let failures = IntCounterVec::new(Opts::new(REQUEST_FAILURES.name, REQUEST_FAILURES.help), REQUEST_FAILURES.labels)
            .into_app_err("invalid request failure counter")?;
        let duration = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION.name, REQUEST_DURATION.help),
            REQUEST_DURATION.labels,
        )
        .into_app_err("invalid request duration histogram")?;

        registry
            .register(Box::new(failures.clone()))
            .into_app_err("could not register request failure counter")?;
        registry
            .register(Box::new(duration.clone()))
            .into_app_err("could not register request duration histogram")?;

        #[cfg(target_os = "linux")]
        registry
            .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))
            .into_app_err("could not register process metrics")?;

        Ok(Self {
            registry,
            failures,
            duration,
        })
    }

    /// Creates the failure series for `collector` at zero so it is exported before any failure.
    pub fn register_collector(&self, collector: &str) -> Result<()> {
        let _ = self
            .failures
            .get_metric_with_label_values(&[collector])
            .into_app_err_with(|| format!("could not create failure series for collector '{collector}'"))?;
        Ok(())
    }

    pub fn record_failure(&self, collector: &str) {
        match self.failures.get_metric_with_label_values(&[collector]) {
            Ok(counter) => counter.inc(),
            Err(e) => log::warn!(target: LOG_TARGET, "Could not count failure for collector '{collector}': {e}"),
        }
    }

    pub fn observe_duration(&self, collector: &str, elapsed: Duration) {
        match self.duration.get_metric_with_label_values(&[collector]) {
            Ok(histogram) => histogram.observe(elapsed.as_secs_f64()),
            Err(e) => log::warn!(target: LOG_TARGET, "Could not record duration for collector '{collector}': {e}"),
        }
    }

    #[must_use]
    pub fn failure_count(&self, collector: &str) -> u64 {
        self.failures.get_metric_with_label_values(&[collector]).map_or(0, |c| c.get())
    }

    #[must_use]
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

impl Debug for RequestMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestMetrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_collector_exports_zero() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.register_collector("repo").unwrap();

        assert_eq!(metrics.failure_count("repo"), 0);
        let families = metrics.gather();
        let failures = families.iter().find(|f| f.get_name() == REQUEST_FAILURES.name).unwrap();
        assert_eq!(failures.get_metric().len(), 1);
    }

    #[test]
    fn test_record_failure_per_collector() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.record_failure("repo");
        metrics.record_failure("repo");
        metrics.record_failure("issue");

        assert_eq!(metrics.failure_count("repo"), 2);
        assert_eq!(metrics.failure_count("issue"), 1);
        assert_eq!(metrics.failure_count("pull_request"), 0);
    }

    #[test]
    fn test_observe_duration() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.observe_duration("repo", Duration::from_millis(250));

        let families = metrics.gather();
        let duration = families.iter().find(|f| f.get_name() == REQUEST_DURATION.name).unwrap();
        let histogram = duration.get_metric()[0].get_histogram();
        assert_eq!(histogram.get_sample_count(), 1);
        assert!((histogram.get_sample_sum() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_instances_are_independent() {
        let first = RequestMetrics::new().unwrap();
        let second = RequestMetrics::new().unwrap();
        first.record_failure("repo");
        assert_eq!(second.failure_count("repo"), 0);
    }
}
