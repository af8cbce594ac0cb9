use super::metric_set::{MetricDesc, MetricSet};
use super::request_metrics::RequestMetrics;
use crate::Result;
use crate::hosting::{Client, RepoTarget, Repository, resolve};
use core::fmt::{Debug, Formatter};
use core::time::Duration;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use prometheus::proto::MetricFamily;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// A record paired with its position in the listing it came from
pub type Ranked<T> = (usize, T);

/// The records fetched for one repository, or why they could not be
pub type Listing<T> = Result<Vec<Ranked<T>>>;

/// The per-kind half of a collector: what to list for a target and how to shape it.
pub trait RecordKind: Send + Sync + 'static {
    type Record: Send + Sync;

    /// Value of the `collector` label on the exporter's own metrics
    const KIND: &'static str;

    const LOG_TARGET: &'static str;

    /// Every gauge family this kind can emit
    fn descriptors(&self) -> Vec<&'static MetricDesc>;

    /// Fetches the records for one target's resolved repositories.
    ///
    /// Each listing pairs a record with its position, which becomes its sample value.
    /// A failed listing affects only the repository it was fetched for.
    fn fetch(&self, client: &Client, repos: Vec<Ranked<Repository>>) -> impl Future<Output = Vec<Listing<Self::Record>>> + Send;

    /// Emits the samples for one record.
    fn extract(&self, position: usize, record: &Self::Record, metrics: &MetricSet) -> Result<()>;
}

/// An object-safe collector the exporter can poll without knowing its record kind.
pub trait Collect: Send + Sync + Debug {
    fn kind(&self) -> &'static str;

    fn descriptors(&self) -> Vec<&'static MetricDesc>;

    /// Walks every configured target and returns the gauge families for this scrape.
    fn collect<'a>(&'a self, cancel: &'a CancellationToken) -> BoxFuture<'a, Vec<MetricFamily>>;
}

/// Polls every configured target for one record kind.
///
/// Targets are walked in order. A malformed target, a failed resolution, or a
/// timed-out target is logged, counted once, and skipped. Within a target, each
/// repository whose listing fails is counted and skipped on its own.
pub struct Collector<K: RecordKind> {
    kind: K,
    client: Client,
    targets: Arc<[String]>,
    timeout: Duration,
    request_metrics: Arc<RequestMetrics>,
}

impl<K: RecordKind> Collector<K> {
    /// Creates a collector, registering its failure series and checking its metric definitions.
    pub fn new(kind: K, client: Client, targets: Arc<[String]>, timeout: Duration, request_metrics: Arc<RequestMetrics>) -> Result<Self> {
        let _ = MetricSet::new(kind.descriptors())?;
        request_metrics.register_collector(K::KIND)?;

        Ok(Self {
            kind,
            client,
            targets,
            timeout,
            request_metrics,
        })
    }

    async fn poll(&self, cancel: &CancellationToken) -> Result<MetricSet> {
        let metrics = MetricSet::new(self.kind.descriptors())?;

        for spec in self.targets.iter() {
            if cancel.is_cancelled() {
                log::info!(target: K::LOG_TARGET, "Shutdown requested, abandoning the remaining targets");
                break;
            }

            let target = match RepoTarget::parse(spec) {
                Ok(target) => target,
                Err(e) => {
                    log::error!(target: K::LOG_TARGET, "Skipping target: {e:#}");
                    self.request_metrics.record_failure(K::KIND);
                    continue;
                }
            };

            let start = Instant::now();
            let outcome = tokio::time::timeout(self.timeout, self.fetch_target(&target)).await;
            self.request_metrics.observe_duration(K::KIND, start.elapsed());

            let listings = match outcome {
                Ok(Ok(listings)) => listings,
                Ok(Err(e)) => {
                    log::error!(target: K::LOG_TARGET, "Could not fetch {} data for '{target}': {e:#}", K::KIND);
                    self.request_metrics.record_failure(K::KIND);
                    continue;
                }
                Err(elapsed) => {
                    log::error!(target: K::LOG_TARGET, "Could not fetch {} data for '{target}' within {:?}: {elapsed}", K::KIND, self.timeout);
                    self.request_metrics.record_failure(K::KIND);
                    continue;
                }
            };

            let mut emitted = 0usize;
            for listing in listings {
                let records = match listing {
                    Ok(records) => records,
                    Err(e) => {
                        log::error!(target: K::LOG_TARGET, "Skipping a repository of '{target}': {e:#}");
                        self.request_metrics.record_failure(K::KIND);
                        continue;
                    }
                };

                for (position, record) in &records {
                    match self.kind.extract(*position, record, &metrics) {
                        Ok(()) => emitted += 1,
                        Err(e) => log::error!(target: K::LOG_TARGET, "Could not convert a {} record for '{target}': {e:#}", K::KIND),
                    }
                }
            }

            log::debug!(target: K::LOG_TARGET, "Collected {emitted} {} record(s) for '{target}'", K::KIND);
        }

        Ok(metrics)
    }

    async fn fetch_target(&self, target: &RepoTarget) -> Result<Vec<Listing<K::Record>>> {
        let repos = resolve(&self.client, target).await?;
        if repos.is_empty() {
            log::warn!(target: K::LOG_TARGET, "No repositories match '{target}'");
            return Ok(Vec::new());
        }

        Ok(self.kind.fetch(&self.client, repos).await)
    }
}

impl<K: RecordKind> Collect for Collector<K> {
    fn kind(&self) -> &'static str {
        K::KIND
    }

    fn descriptors(&self) -> Vec<&'static MetricDesc> {
        self.kind.descriptors()
    }

    fn collect<'a>(&'a self, cancel: &'a CancellationToken) -> BoxFuture<'a, Vec<MetricFamily>> {
        async move {
            match self.poll(cancel).await {
                Ok(metrics) => metrics.gather(),
                Err(e) => {
                    log::error!(target: K::LOG_TARGET, "Could not collect {} metrics: {e:#}", K::KIND);
                    Vec::new()
                }
            }
        }
        .boxed()
    }
}

impl<K: RecordKind> Debug for Collector<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collector")
            .field("kind", &K::KIND)
            .field("targets", &self.targets)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Splits a resolved repository into the owner and name used for follow-up listings.
pub fn repo_coordinates(repo: &Repository) -> Result<(&str, &str)> {
    repo.owner_and_name()
        .ok_or_else(|| ohno::app_err!("repository record has neither a full name nor an owner and name"))
}

/// Numbers records by their position in the listing they were returned in.
pub fn ranked<T>(records: Vec<T>) -> Vec<Ranked<T>> {
    records.into_iter().enumerate().collect()
}
