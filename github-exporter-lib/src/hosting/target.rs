use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::{IntoAppError, bail};
use regex::Regex;
use std::sync::Arc;

/// A configured repository target in `owner/name` form.
///
/// The name part may contain `*` wildcards, each matching any run of characters.
/// Matching is case-sensitive and applies to the whole `owner/name` string.
#[derive(Debug, Clone)]
pub struct RepoTarget {
    spec: Arc<str>,
    owner: Arc<str>,
    name: Arc<str>,
    pattern: Option<Regex>,
}

impl RepoTarget {
    /// Parses a target, requiring exactly two non-empty `/`-separated segments.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let segments: Vec<&str> = spec.split('/').collect();

        let [owner, name] = segments.as_slice() else {
            bail!("invalid repository name '{spec}': expected 'owner/name'");
        };

        if owner.is_empty() || name.is_empty() {
            bail!("invalid repository name '{spec}': owner and name must not be empty");
        }

        let pattern = if name.contains('*') { Some(glob_to_regex(spec)?) } else { None };

        Ok(Self {
            spec: Arc::from(spec),
            owner: Arc::from(*owner),
            name: Arc::from(*name),
            pattern,
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the name part contains a wildcard
    #[must_use]
    pub const fn is_glob(&self) -> bool {
        self.pattern.is_some()
    }

    /// Whether `full_name` is selected by this target
    #[must_use]
    pub fn matches(&self, full_name: &str) -> bool {
        self.pattern.as_ref().map_or_else(|| full_name == &*self.spec, |re| re.is_match(full_name))
    }
}

impl PartialEq for RepoTarget {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

impl Eq for RepoTarget {}

impl Display for RepoTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.spec)
    }
}

fn glob_to_regex(glob: &str) -> Result<Regex> {
    let body = glob.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
    Regex::new(&format!("^{body}$")).into_app_err_with(|| format!("invalid repository pattern '{glob}'"))
}
