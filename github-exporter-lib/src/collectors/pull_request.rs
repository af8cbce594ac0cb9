use super::collector::{Listing, Ranked, RecordKind, ranked, repo_coordinates};
use super::fields::{first_label, flag, login, logins, number, position_value, text, timestamp};
use super::metric_set::{MetricDesc, MetricSet, metric_desc};
use crate::Result;
use crate::hosting::{Client, PullRequest, Repository};

static PULL_REQUESTS_ALL: MetricDesc = metric_desc!(
    "github_pull_requests_all",
    "Pull request fields as labels, valued by the pull request's position in its repository listing",
    &[
        "number",
        "state",
        "title",
        "body",
        "created_at",
        "labels",
        "user",
        "merged",
        "comments",
        "commits",
        "additions",
        "deletions",
        "changed_files",
        "html_url",
        "review_comments",
        "assignee",
        "assignees",
        "author_association",
        "requested_reviewers",
        "id",
        "locked",
        "updated_at",
        "url",
    ]
);

/// The first page of pull requests of every resolved repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct PullRequestKind;

impl RecordKind for PullRequestKind {
    type Record = PullRequest;

    const KIND: &'static str = "pull_request";
    const LOG_TARGET: &'static str = "     pulls";

    fn descriptors(&self) -> Vec<&'static MetricDesc> {
        vec![&PULL_REQUESTS_ALL]
    }

    async fn fetch(&self, client: &Client, repos: Vec<Ranked<Repository>>) -> Vec<Listing<PullRequest>> {
        let mut listings = Vec::with_capacity(repos.len());
        for (_, repo) in &repos {
            listings.push(list(client, repo).await);
        }
        listings
    }

    fn extract(&self, position: usize, pr: &PullRequest, metrics: &MetricSet) -> Result<()> {
        let labels = [
            number(pr.number),
            text(pr.state.as_deref()),
            text(pr.title.as_deref()),
            text(pr.body.as_deref()),
            timestamp(pr.created_at),
            first_label(pr.labels.as_deref()),
            login(pr.user.as_ref()),
            flag(pr.merged),
            number(pr.comments),
            number(pr.commits),
            number(pr.additions),
            number(pr.deletions),
            number(pr.changed_files),
            text(pr.html_url.as_deref()),
            number(pr.review_comments),
            login(pr.assignee.as_ref()),
            logins(pr.assignees.as_deref()),
            text(pr.author_association.as_deref()),
            logins(pr.requested_reviewers.as_deref()),
            number(pr.id),
            flag(pr.locked),
            timestamp(pr.updated_at),
            text(pr.url.as_deref()),
        ];

        metrics.set(&PULL_REQUESTS_ALL, &labels, position_value(position))
    }
}

async fn list(client: &Client, repo: &Repository) -> Listing<PullRequest> {
    let (owner, name) = repo_coordinates(repo)?;
    Ok(ranked(client.list_pull_requests(owner, name).await?))
}
