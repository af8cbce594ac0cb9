//! Typed GitHub REST endpoints used by the collectors.

use super::client::{Client, Page};
use super::records::{Issue, PullRequest, Repository, SearchResults};
use crate::Result;
use serde::de::DeserializeOwned;

const LOG_TARGET: &str = "       api";

/// Page size requested from the search endpoint
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// The search API stops serving results after 1000 items
const MAX_SEARCH_PAGES: u32 = 1000 / SEARCH_PAGE_SIZE;

impl Client {
    /// `GET /repos/{owner}/{name}`
    pub async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        let url = self.endpoint(&["repos", owner, name]);
        let page: Page<Repository> = self.get_page(&url).await.into_result(format!("repository '{owner}/{name}'"))?;
        Ok(page.data)
    }

    /// Lists all repositories owned by `owner` through `GET /search/repositories?q=user:{owner}`.
    ///
    /// Follows `rel="next"` links until none remain or an empty page comes back.
    pub async fn search_user_repositories(&self, owner: &str) -> Result<Vec<Repository>> {
        let query = format!("user:{owner}");
        let per_page = SEARCH_PAGE_SIZE.to_string();
        let mut repos = Vec::new();
        let mut page_num = 1u32;

        loop {
            let mut url = self.endpoint(&["search", "repositories"]);
            let _ = url
                .query_pairs_mut()
                .append_pair("q", &query)
                .append_pair("per_page", &per_page)
                .append_pair("page", &page_num.to_string());

            let page: Page<SearchResults> = self
                .get_page(&url)
                .await
                .into_result(format!("page {page_num} of repositories for '{owner}'"))?;

            if page.data.incomplete_results == Some(true) {
                log::warn!(target: LOG_TARGET, "Search for '{owner}' returned incomplete results on page {page_num}; some repositories may be missing");
            }

            if page.data.items.is_empty() {
                break;
            }

            repos.extend(page.data.items);

            if !page.has_next {
                break;
            }

            page_num += 1;

            if page_num > MAX_SEARCH_PAGES {
                log::warn!(target: LOG_TARGET, "Reached maximum search page limit ({MAX_SEARCH_PAGES}) for '{owner}', stopping after {} repositories", repos.len());
                break;
            }
        }

        log::debug!(target: LOG_TARGET, "Search for '{owner}' returned {} repositories over {page_num} page(s)", repos.len());
        Ok(repos)
    }

    /// `GET /repos/{owner}/{name}/issues`, first page with the API's default filters
    pub async fn list_issues(&self, owner: &str, name: &str) -> Result<Vec<Issue>> {
        self.list_first_page(&["repos", owner, name, "issues"], &format!("issues for '{owner}/{name}'"))
            .await
    }

    /// `GET /repos/{owner}/{name}/pulls`, first page with the API's default filters
    pub async fn list_pull_requests(&self, owner: &str, name: &str) -> Result<Vec<PullRequest>> {
        self.list_first_page(&["repos", owner, name, "pulls"], &format!("pull requests for '{owner}/{name}'"))
            .await
    }

    async fn list_first_page<T: DeserializeOwned>(&self, segments: &[&str], what: &str) -> Result<Vec<T>> {
        let url = self.endpoint(segments);
        let page: Page<Vec<T>> = self.get_page(&url).await.into_result(what)?;
        if page.has_next {
            log::debug!(target: LOG_TARGET, "Only the first page of {what} is reported");
        }
        Ok(page.data)
    }
}
