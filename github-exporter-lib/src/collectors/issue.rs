use super::collector::{Listing, Ranked, RecordKind, ranked, repo_coordinates};
use super::fields::{first_label, flag, login, number, position_value, text, timestamp};
use super::metric_set::{MetricDesc, MetricSet, metric_desc};
use crate::Result;
use crate::hosting::{Client, Issue, Repository};

static ISSUES_ALL: MetricDesc = metric_desc!(
    "github_issues_all",
    "Issue fields as labels, valued by the issue's position in its repository listing",
    &[
        "id",
        "status",
        "locked",
        "title",
        "body",
        "user",
        "author_association",
        "label",
        "num_comments",
        "created_at",
        "updated_at",
        "url",
        "html_url",
        "reactions_total",
        "reactions_plus_one",
        "reactions_minus_one",
        "assignee",
    ]
);

/// The first page of issues of every resolved repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueKind;

impl RecordKind for IssueKind {
    type Record = Issue;

    const KIND: &'static str = "issue";
    const LOG_TARGET: &'static str = "     issue";

    fn descriptors(&self) -> Vec<&'static MetricDesc> {
        vec![&ISSUES_ALL]
    }

    async fn fetch(&self, client: &Client, repos: Vec<Ranked<Repository>>) -> Vec<Listing<Issue>> {
        let mut listings = Vec::with_capacity(repos.len());
        for (_, repo) in &repos {
            listings.push(list(client, repo).await);
        }
        listings
    }

    fn extract(&self, position: usize, issue: &Issue, metrics: &MetricSet) -> Result<()> {
        let reactions = issue.reactions.as_ref();

        let labels = [
            number(issue.id),
            text(issue.state.as_deref()),
            flag(issue.locked),
            text(issue.title.as_deref()),
            text(issue.body.as_deref()),
            login(issue.user.as_ref()),
            text(issue.author_association.as_deref()),
            first_label(issue.labels.as_deref()),
            number(issue.comments),
            timestamp(issue.created_at),
            timestamp(issue.updated_at),
            text(issue.url.as_deref()),
            text(issue.html_url.as_deref()),
            number(reactions.and_then(|r| r.total_count)),
            number(reactions.and_then(|r| r.plus_one)),
            number(reactions.and_then(|r| r.minus_one)),
            login(issue.assignee.as_ref()),
        ];

        metrics.set(&ISSUES_ALL, &labels, position_value(position))
    }
}

async fn list(client: &Client, repo: &Repository) -> Listing<Issue> {
    let (owner, name) = repo_coordinates(repo)?;
    Ok(ranked(client.list_issues(owner, name).await?))
}
