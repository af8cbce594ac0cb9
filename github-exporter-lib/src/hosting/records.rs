//! Record types returned by the GitHub REST API.
//!
//! Every field is optional: the API omits or nulls fields depending on the endpoint,
//! the token's permissions, and the age of the object. Search results in particular
//! lack `network_count`, `subscribers_count`, and the merge-method flags.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    pub login: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reactions {
    pub total_count: Option<i64>,
    #[serde(rename = "+1")]
    pub plus_one: Option<i64>,
    #[serde(rename = "-1")]
    pub minus_one: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub owner: Option<User>,

    pub fork: Option<bool>,
    pub forks_count: Option<i64>,
    pub network_count: Option<i64>,
    pub open_issues_count: Option<i64>,
    pub stargazers_count: Option<i64>,
    pub subscribers_count: Option<i64>,
    pub watchers_count: Option<i64>,
    pub size: Option<i64>,

    pub allow_rebase_merge: Option<bool>,
    pub allow_squash_merge: Option<bool>,
    pub allow_merge_commit: Option<bool>,
    pub archived: Option<bool>,
    pub private: Option<bool>,
    pub has_issues: Option<bool>,
    pub has_wiki: Option<bool>,
    pub has_pages: Option<bool>,
    pub has_projects: Option<bool>,
    pub has_downloads: Option<bool>,

    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Repository {
    /// Owner login and repository name, taken from `full_name` when available.
    #[must_use]
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        if let Some((owner, name)) = self.full_name.as_deref().and_then(|full| full.split_once('/'))
            && !owner.is_empty()
            && !name.is_empty()
        {
            return Some((owner, name));
        }

        let owner = self.owner.as_ref()?.login.as_deref()?;
        let name = self.name.as_deref()?;
        Some((owner, name))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {
    pub id: Option<i64>,
    pub number: Option<i64>,
    pub state: Option<String>,
    pub locked: Option<bool>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub user: Option<User>,
    pub author_association: Option<String>,
    pub labels: Option<Vec<Label>>,
    pub comments: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub html_url: Option<String>,
    pub reactions: Option<Reactions>,
    pub assignee: Option<User>,
}

/// A pull request as returned by the pulls list endpoint.
///
/// The list endpoint leaves out the merge and diff statistics that the single
/// pull request endpoint carries, so those fields are usually absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    pub id: Option<i64>,
    pub number: Option<i64>,
    pub state: Option<String>,
    pub locked: Option<bool>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub user: Option<User>,
    pub author_association: Option<String>,
    pub labels: Option<Vec<Label>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub html_url: Option<String>,
    pub assignee: Option<User>,
    pub assignees: Option<Vec<User>>,
    pub requested_reviewers: Option<Vec<User>>,
    pub merged: Option<bool>,
    pub comments: Option<i64>,
    pub review_comments: Option<i64>,
    pub commits: Option<i64>,
    pub additions: Option<i64>,
    pub deletions: Option<i64>,
    pub changed_files: Option<i64>,
}

/// Body of a `/search/repositories` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    /// Set when the search timed out before finding every match
    pub incomplete_results: Option<bool>,
    #[serde(default)]
    pub items: Vec<Repository>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_deserialize_full() {
        let json = r#"{
            "name": "web",
            "full_name": "acme/web",
            "owner": { "login": "acme" },
            "fork": false,
            "forks_count": 3,
            "network_count": 4,
            "open_issues_count": 5,
            "stargazers_count": 1000,
            "subscribers_count": 50,
            "watchers_count": 1000,
            "size": 2048,
            "allow_rebase_merge": true,
            "allow_squash_merge": false,
            "allow_merge_commit": true,
            "archived": false,
            "private": false,
            "has_issues": true,
            "has_wiki": true,
            "has_pages": false,
            "has_projects": true,
            "has_downloads": true,
            "pushed_at": "2024-01-02T03:04:05Z",
            "created_at": "2020-01-01T00:00:00Z",
            "updated_at": "2024-01-02T03:04:06Z"
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name.as_deref(), Some("acme/web"));
        assert_eq!(repo.stargazers_count, Some(1000));
        assert_eq!(repo.network_count, Some(4));
        assert_eq!(repo.allow_squash_merge, Some(false));
        assert_eq!(repo.pushed_at.unwrap().timestamp(), 1_704_164_645);
    }

    #[test]
    fn test_repository_deserialize_search_item_lacks_detail_fields() {
        let json = r#"{
            "name": "auth-service",
            "full_name": "acme/auth-service",
            "forks_count": 1,
            "stargazers_count": 2,
            "pushed_at": null
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.forks_count, Some(1));
        assert_eq!(repo.network_count, None);
        assert_eq!(repo.subscribers_count, None);
        assert_eq!(repo.allow_rebase_merge, None);
        assert!(repo.pushed_at.is_none());
    }

    #[test]
    fn test_owner_and_name_from_full_name() {
        let repo = Repository {
            full_name: Some("acme/web".into()),
            ..Repository::default()
        };
        assert_eq!(repo.owner_and_name(), Some(("acme", "web")));
    }

    #[test]
    fn test_owner_and_name_falls_back_to_owner_login() {
        let repo = Repository {
            name: Some("web".into()),
            owner: Some(User { login: Some("acme".into()) }),
            ..Repository::default()
        };
        assert_eq!(repo.owner_and_name(), Some(("acme", "web")));
    }

    #[test]
    fn test_owner_and_name_missing() {
        let repo = Repository {
            name: Some("web".into()),
            ..Repository::default()
        };
        assert_eq!(repo.owner_and_name(), None);
    }

    #[test]
    fn test_issue_deserialize_reactions() {
        let json = r#"{
            "id": 42,
            "number": 7,
            "state": "open",
            "locked": false,
            "title": "Crash on start",
            "body": null,
            "user": { "login": "octocat" },
            "labels": [{ "name": "bug" }, { "name": "p1" }],
            "comments": 3,
            "reactions": { "total_count": 5, "+1": 4, "-1": 1 }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.id, Some(42));
        assert!(issue.body.is_none());
        assert_eq!(issue.labels.as_ref().map(Vec::len), Some(2));
        let reactions = issue.reactions.unwrap();
        assert_eq!(reactions.total_count, Some(5));
        assert_eq!(reactions.plus_one, Some(4));
        assert_eq!(reactions.minus_one, Some(1));
    }

    #[test]
    fn test_issue_deserialize_empty_object() {
        let issue: Issue = serde_json::from_str("{}").unwrap();
        assert!(issue.id.is_none());
        assert!(issue.labels.is_none());
        assert!(issue.reactions.is_none());
    }

    #[test]
    fn test_pull_request_deserialize_list_item() {
        let json = r#"{
            "id": 1001,
            "number": 12,
            "state": "open",
            "title": "Add feature",
            "assignees": [{ "login": "a" }, { "login": "b" }],
            "requested_reviewers": [],
            "labels": null
        }"#;

        let pr: PullRequest = serde_json::from_str(json).unwrap();
        assert_eq!(pr.number, Some(12));
        assert_eq!(pr.assignees.as_ref().map(Vec::len), Some(2));
        assert!(pr.labels.is_none());
        assert!(pr.merged.is_none());
        assert!(pr.commits.is_none());
    }

    #[test]
    fn test_search_results_deserialize() {
        let json = r#"{
            "total_count": 2,
            "incomplete_results": false,
            "items": [{ "full_name": "acme/a" }, { "full_name": "acme/b" }]
        }"#;

        let results: SearchResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.incomplete_results, Some(false));
        assert_eq!(results.items.len(), 2);
    }
}
