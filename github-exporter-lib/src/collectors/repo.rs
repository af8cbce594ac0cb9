use super::collector::{Listing, Ranked, RecordKind};
use super::fields::{count_value, flag_value, number, position_value, timestamp_value};
use super::metric_set::{MetricDesc, MetricSet, metric_desc};
use crate::Result;
use crate::hosting::{Client, Repository};
use core::iter;
use std::borrow::Cow;

const REPO_LABELS: &[&str] = &["owner", "name"];

static REPO_ALL: MetricDesc = metric_desc!(
    "github_repo_all",
    "Repository counts as labels, valued by the repository's position in the listing it was resolved from",
    &["owner", "name", "forks", "network", "issues", "stargazers", "subscribers", "watchers", "size"]
);

/// A per-field repository gauge, emitted only when its source field is present.
#[derive(Debug)]
struct RepoGauge {
    desc: MetricDesc,
    value: fn(&Repository) -> Option<f64>,
}

macro_rules! repo_gauge {
    ($name:expr, $help:expr, $value:expr) => {
        RepoGauge {
            desc: metric_desc!($name, $help, REPO_LABELS),
            value: $value,
        }
    };
}

static REPO_GAUGES: &[RepoGauge] = &[
    repo_gauge!("github_repo_forked", "Whether the repository is a fork", |r| flag_value(r.fork)),
    repo_gauge!("github_repo_forks", "Number of forks", |r| count_value(r.forks_count)),
    repo_gauge!("github_repo_network", "Number of repositories in the fork network", |r| count_value(r.network_count)),
    repo_gauge!("github_repo_issues", "Number of open issues", |r| count_value(r.open_issues_count)),
    repo_gauge!("github_repo_stargazers", "Number of stargazers", |r| count_value(r.stargazers_count)),
    repo_gauge!("github_repo_subscribers", "Number of subscribers", |r| count_value(r.subscribers_count)),
    repo_gauge!("github_repo_watchers", "Number of watchers", |r| count_value(r.watchers_count)),
    repo_gauge!("github_repo_size", "Size of the repository in kilobytes", |r| count_value(r.size)),
    repo_gauge!("github_repo_allow_rebase_merge", "Whether rebase merging is allowed", |r| flag_value(
        r.allow_rebase_merge
    )),
    repo_gauge!("github_repo_allow_squash_merge", "Whether squash merging is allowed", |r| flag_value(
        r.allow_squash_merge
    )),
    repo_gauge!("github_repo_allow_merge_commit", "Whether merge commits are allowed", |r| flag_value(
        r.allow_merge_commit
    )),
    repo_gauge!("github_repo_archived", "Whether the repository is archived", |r| flag_value(r.archived)),
    repo_gauge!("github_repo_private", "Whether the repository is private", |r| flag_value(r.private)),
    repo_gauge!("github_repo_has_issues", "Whether issues are enabled", |r| flag_value(r.has_issues)),
    repo_gauge!("github_repo_has_wiki", "Whether the wiki is enabled", |r| flag_value(r.has_wiki)),
    repo_gauge!("github_repo_has_pages", "Whether GitHub Pages is enabled", |r| flag_value(r.has_pages)),
    repo_gauge!("github_repo_has_projects", "Whether projects are enabled", |r| flag_value(r.has_projects)),
    repo_gauge!("github_repo_has_downloads", "Whether downloads are enabled", |r| flag_value(r.has_downloads)),
    repo_gauge!("github_repo_pushed_timestamp", "Time of the last push, in Unix seconds", |r| timestamp_value(
        r.pushed_at
    )),
    repo_gauge!("github_repo_created_timestamp", "Time the repository was created, in Unix seconds", |r| {
        timestamp_value(r.created_at)
    }),
    repo_gauge!("github_repo_updated_timestamp", "Time the repository was last updated, in Unix seconds", |r| {
        timestamp_value(r.updated_at)
    }),
];

/// Repository metadata for every resolved repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoKind;

impl RecordKind for RepoKind {
    type Record = Repository;

    const KIND: &'static str = "repo";
    const LOG_TARGET: &'static str = "      repo";

    fn descriptors(&self) -> Vec<&'static MetricDesc> {
        iter::once(&REPO_ALL).chain(REPO_GAUGES.iter().map(|g| &g.desc)).collect()
    }

    async fn fetch(&self, _client: &Client, repos: Vec<Ranked<Repository>>) -> Vec<Listing<Repository>> {
        vec![Ok(repos)]
    }

    fn extract(&self, position: usize, repo: &Repository, metrics: &MetricSet) -> Result<()> {
        let (owner, name) = repo.owner_and_name().unwrap_or_default();

        let all_labels = [
            Cow::Borrowed(owner),
            Cow::Borrowed(name),
            number(repo.forks_count),
            number(repo.network_count),
            number(repo.open_issues_count),
            number(repo.stargazers_count),
            number(repo.subscribers_count),
            number(repo.watchers_count),
            number(repo.size),
        ];
        metrics.set(&REPO_ALL, &all_labels, position_value(position))?;

        for gauge in REPO_GAUGES {
            if let Some(value) = (gauge.value)(repo) {
                metrics.set(&gauge.desc, &[owner, name], value)?;
            }
        }

        Ok(())
    }
}
