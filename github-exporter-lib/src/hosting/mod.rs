//! GitHub API access
//!
//! The [`Client`] performs authenticated requests and classifies responses, the
//! records mirror the JSON shapes of the endpoints we read, and [`resolve`] expands
//! configured targets into concrete repositories.

mod api;
mod client;
mod records;
mod resolver;
mod target;

pub use api::SEARCH_PAGE_SIZE;
pub use client::{Client, DEFAULT_BASE_URL, HostingApiResult, Page, RateLimitInfo};
pub use records::{Issue, Label, PullRequest, Reactions, Repository, SearchResults, User};
pub use resolver::resolve;
pub use target::RepoTarget;
