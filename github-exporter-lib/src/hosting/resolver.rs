use super::client::Client;
use super::records::Repository;
use super::target::RepoTarget;
use crate::Result;

const LOG_TARGET: &str = "  resolver";

/// Expands a target into the repositories it names, each paired with its position.
///
/// A plain `owner/name` target triggers a single direct fetch, whose result is not
/// re-checked against the target and sits at position 0. A wildcard target lists the
/// owner's repositories through the search API and keeps those whose `full_name`
/// matches, each at its index in the unfiltered search results.
pub async fn resolve(client: &Client, target: &RepoTarget) -> Result<Vec<(usize, Repository)>> {
    if !target.is_glob() {
        let repo = client.get_repository(target.owner(), target.name()).await?;
        return Ok(vec![(0, repo)]);
    }

    let candidates = client.search_user_repositories(target.owner()).await?;
    let total = candidates.len();

    let matched: Vec<(usize, Repository)> = candidates
        .into_iter()
        .enumerate()
        .filter(|(_, repo)| repo.full_name.as_deref().is_some_and(|full_name| target.matches(full_name)))
        .collect();

    log::debug!(target: LOG_TARGET, "Pattern '{target}' matched {} of {total} repositories", matched.len());
    Ok(matched)
}
