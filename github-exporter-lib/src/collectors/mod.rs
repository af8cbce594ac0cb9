//! Metric collection
//!
//! One [`Collector`] per record kind walks the configured targets on every scrape.
//! The [`Exporter`] runs the enabled collectors concurrently and merges their
//! output with the exporter's own request metrics.

mod collector;
mod fields;
mod issue;
mod metric_set;
mod pull_request;
mod repo;
mod request_metrics;

pub use collector::{Collect, Collector, RecordKind};
pub use issue::IssueKind;
pub use metric_set::{MetricDesc, MetricSet};
pub use pull_request::PullRequestKind;
pub use repo::RepoKind;
pub use request_metrics::{REQUEST_DURATION, REQUEST_FAILURES, RequestMetrics};

use crate::Result;
use crate::hosting::Client;
use core::time::Duration;
use futures_util::future::join_all;
use ohno::IntoAppError;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "  exporter";

/// The record kinds that can be collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorKind {
    Repo,
    Issue,
    PullRequest,
}

impl CollectorKind {
    pub const ALL: [Self; 3] = [Self::Repo, Self::Issue, Self::PullRequest];

    /// Value of the `collector` label for this kind
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Repo => RepoKind::KIND,
            Self::Issue => IssueKind::KIND,
            Self::PullRequest => PullRequestKind::KIND,
        }
    }

    #[must_use]
    pub fn descriptors(self) -> Vec<&'static MetricDesc> {
        match self {
            Self::Repo => RepoKind.descriptors(),
            Self::Issue => IssueKind.descriptors(),
            Self::PullRequest => PullRequestKind.descriptors(),
        }
    }
}

/// Everything the `/metrics` endpoint serves.
#[derive(Debug)]
pub struct Exporter {
    collectors: Vec<Box<dyn Collect>>,
    request_metrics: Arc<RequestMetrics>,
}

impl Exporter {
    pub fn new(client: &Client, targets: Vec<String>, timeout: Duration, kinds: &[CollectorKind]) -> Result<Self> {
        let targets: Arc<[String]> = targets.into();
        let request_metrics = Arc::new(RequestMetrics::new()?);

        let mut collectors: Vec<Box<dyn Collect>> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let targets = Arc::clone(&targets);
            let request_metrics = Arc::clone(&request_metrics);
            let client = client.clone();

            let collector: Box<dyn Collect> = match kind {
                CollectorKind::Repo => Box::new(Collector::new(RepoKind, client, targets, timeout, request_metrics)?),
                CollectorKind::Issue => Box::new(Collector::new(IssueKind, client, targets, timeout, request_metrics)?),
                CollectorKind::PullRequest => Box::new(Collector::new(PullRequestKind, client, targets, timeout, request_metrics)?),
            };
            collectors.push(collector);
        }

        log::debug!(
            target: LOG_TARGET,
            "Enabled collectors: {}",
            collectors.iter().map(|c| c.kind()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            collectors,
            request_metrics,
        })
    }

    #[must_use]
    pub fn request_metrics(&self) -> &RequestMetrics {
        &self.request_metrics
    }

    /// Polls every collector concurrently and returns the combined families.
    pub async fn gather(&self, cancel: &CancellationToken) -> Vec<MetricFamily> {
        let per_collector = join_all(self.collectors.iter().map(|c| c.collect(cancel))).await;

        let mut families: Vec<MetricFamily> = per_collector.into_iter().flatten().collect();
        families.extend(self.request_metrics.gather());
        families
    }
}

/// Renders metric families in the Prometheus text exposition format.
pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(families, &mut buffer)
        .into_app_err("could not encode metrics")?;
    String::from_utf8(buffer).into_app_err("encoded metrics are not valid UTF-8")
}

/// Every metric the exporter can emit, for documentation.
#[must_use]
pub fn all_descriptors() -> Vec<&'static MetricDesc> {
    CollectorKind::ALL
        .into_iter()
        .flat_map(CollectorKind::descriptors)
        .chain([&REQUEST_FAILURES, &REQUEST_DURATION])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_descriptors_unique_names() {
        let descs = all_descriptors();
        let mut names: Vec<_> = descs.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), descs.len());
        assert!(names.contains(&"github_repo_all"));
        assert!(names.contains(&"github_issues_all"));
        assert!(names.contains(&"github_pull_requests_all"));
        assert!(names.contains(&"github_request_failures_total"));
    }

    #[test]
    fn test_encode_text_empty() {
        assert_eq!(encode_text(&[]).unwrap(), "");
    }

    #[tokio::test]
    async fn test_exporter_without_targets_exports_zero_failures() {
        let client = Client::new(None, "http://127.0.0.1:9").unwrap();
        let exporter = Exporter::new(&client, Vec::new(), Duration::from_secs(1), &CollectorKind::ALL).unwrap();

        let text = encode_text(&exporter.gather(&CancellationToken::new()).await).unwrap();

        for kind in ["repo", "issue", "pull_request"] {
            assert!(
                text.lines()
                    .any(|l| l == format!(r#"github_request_failures_total{{collector="{kind}"}} 0"#)),
                "missing zero failure series for {kind}:\n{text}"
            );
        }
        assert!(!text.contains("github_repo_all"));
    }

    #[tokio::test]
    async fn test_exporter_only_enabled_collectors() {
        let client = Client::new(None, "http://127.0.0.1:9").unwrap();
        let exporter = Exporter::new(&client, Vec::new(), Duration::from_secs(1), &[CollectorKind::Issue]).unwrap();

        let text = encode_text(&exporter.gather(&CancellationToken::new()).await).unwrap();
        assert!(text.contains(r#"collector="issue""#));
        assert!(!text.contains(r#"collector="repo""#));
    }

    #[tokio::test]
    async fn test_exporter_counts_malformed_target() {
        let client = Client::new(None, "http://127.0.0.1:9").unwrap();
        let exporter = Exporter::new(&client, vec!["not-a-repo".into()], Duration::from_secs(1), &[CollectorKind::Repo]).unwrap();

        let _ = exporter.gather(&CancellationToken::new()).await;
        assert_eq!(exporter.request_metrics().failure_count("repo"), 1);
    }
}
