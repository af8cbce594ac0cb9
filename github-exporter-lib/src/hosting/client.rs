//! GitHub API client
//!
//! Thin wrapper over `reqwest` that carries the credentials and classifies responses.

use crate::Result;
use chrono::{DateTime, Utc};
use core::fmt::Display;
use ohno::{EnrichableExt, IntoAppError, app_err, bail};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;
use url::Url;

const LOG_TARGET: &str = "    client";
const USER_AGENT: &str = concat!("github-exporter/", env!("CARGO_PKG_VERSION"));
const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Public GitHub REST API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of a GitHub API call
#[derive(Debug)]
pub enum HostingApiResult<T> {
    /// Request succeeded, with the rate limit reported alongside it
    Success(T, Option<RateLimitInfo>),

    /// Rejected with 403 or 429
    RateLimited(Option<RateLimitInfo>),

    /// The requested resource was not found (404)
    NotFound(Option<RateLimitInfo>),

    /// Transport failure, any other HTTP error, or an undecodable body
    Failed(ohno::AppError, Option<RateLimitInfo>),
}

impl<T> HostingApiResult<T> {
    /// Collapses the classification into a plain result, naming `what` in the error.
    pub fn into_result(self, what: impl Display) -> Result<T> {
        match self {
            Self::Success(data, rate_limit) => {
                if let Some(rl) = rate_limit {
                    log::debug!(target: LOG_TARGET, "{} API request(s) remaining until {}", rl.remaining, rl.reset_at);
                }
                Ok(data)
            }
            Self::RateLimited(Some(rl)) => {
                bail!("rate limited while fetching {what} ({} requests remaining, resets at {})", rl.remaining, rl.reset_at)
            }
            Self::RateLimited(None) => bail!("rate limited while fetching {what}"),
            Self::NotFound(_) => bail!("{what} not found"),
            Self::Failed(e, _) => Err(e.enrich_with(|| format!("could not fetch {what}"))),
        }
    }
}

/// A single page of a paginated listing
#[derive(Debug)]
pub struct Page<T> {
    pub data: T,
    pub has_next: bool,
}

/// Unwraps a successful `HostingApiResult` or returns the failure from the enclosing function
macro_rules! unwrap_or_return {
    ($expr:expr) => {
        match $expr {
            HostingApiResult::Success(data, rate_limit) => (data, rate_limit),
            HostingApiResult::RateLimited(rate_limit) => return HostingApiResult::RateLimited(rate_limit),
            HostingApiResult::NotFound(rate_limit) => return HostingApiResult::NotFound(rate_limit),
            HostingApiResult::Failed(e, rate_limit) => return HostingApiResult::Failed(e, rate_limit),
        }
    };
}

/// GitHub API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Create a new client with an optional bearer token and the API base URL
    pub fn new(token: Option<&str>, base_url: &str) -> Result<Self> {
        use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};

        let base_url = Url::parse(base_url).into_app_err_with(|| format!("invalid API base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("invalid API base URL '{base_url}': not a hierarchical URL");
        }

        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));

        if let Some(t) = token.filter(|t| !t.is_empty()) {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        } else {
            log::debug!(target: LOG_TARGET, "No GitHub token configured, using unauthenticated requests");
        }

        let client = reqwest::Client::builder().user_agent(USER_AGENT).default_headers(headers).build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Builds an endpoint URL by appending percent-encoded path segments to the base URL.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            let _ = path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Make an API call and classify the result
    pub async fn api_call(&self, url: &Url) -> HostingApiResult<reqwest::Response> {
        log::trace!(target: LOG_TARGET, "GET {url}");

        let resp = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => return HostingApiResult::Failed(e.into(), None),
        };

        // Extract rate limit info from response headers before checking status
        let rate_limit = extract_rate_limit_from_headers(resp.headers());

        let status = resp.status();
        if status.is_success() {
            return HostingApiResult::Success(resp, rate_limit);
        }

        if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
            return HostingApiResult::RateLimited(rate_limit);
        }

        if status == StatusCode::NOT_FOUND {
            return HostingApiResult::NotFound(rate_limit);
        }

        let error = match resp.error_for_status() {
            Err(e) => e.into(),
            Ok(_) => app_err!("unexpected HTTP status {status}"),
        };
        HostingApiResult::Failed(error, rate_limit)
    }

    /// Fetches `url` and decodes the JSON body, noting whether a further page exists.
    pub async fn get_page<T: DeserializeOwned>(&self, url: &Url) -> HostingApiResult<Page<T>> {
        let (resp, rate_limit) = unwrap_or_return!(self.api_call(url).await);
        let has_next = has_next_page(resp.headers());

        match resp.json::<T>().await {
            Ok(data) => HostingApiResult::Success(Page { data, has_next }, rate_limit),
            Err(e) => HostingApiResult::Failed(e.into(), rate_limit),
        }
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

/// Whether the `Link` header advertises a `rel="next"` page
fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get(LINK)
        .and_then(|link| link.to_str().ok())
        .is_some_and(|link_str| link_str.contains(r#"rel="next""#))
}
