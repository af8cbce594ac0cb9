use crate::Result;
use crate::collectors::CollectorKind;
use crate::hosting::{DEFAULT_BASE_URL, RepoTarget};
use camino::{Utf8Path, Utf8PathBuf};
use core::net::{Ipv4Addr, SocketAddr};
use core::time::Duration;
use ohno::{AppError, IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");
pub const DEFAULT_CONFIG_FILE: &str = "github-exporter.toml";

/// Paths served by the exporter itself, unavailable as the metrics path
const RESERVED_PATHS: &[&str] = &["/healthz", "/readyz"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub repos: Vec<String>,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub collectors: CollectorsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebConfig {
    #[serde(default = "default_web_address")]
    pub address: SocketAddr,

    #[serde(default = "default_web_path")]
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
#[expect(clippy::struct_excessive_bools, reason = "one switch per collector")]
pub struct CollectorsConfig {
    #[serde(default = "enabled")]
    pub repos: bool,

    #[serde(default = "enabled")]
    pub issues: bool,

    #[serde(default = "enabled")]
    pub pull_requests: bool,
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_web_address() -> SocketAddr {
    SocketAddr::new(core::net::IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9504)
}

fn default_web_path() -> String {
    "/metrics".to_string()
}

const fn enabled() -> bool {
    true
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: default_web_address(),
            path: default_web_path(),
        }
    }
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            repos: true,
            issues: true,
            pull_requests: true,
        }
    }
}

impl CollectorsConfig {
    #[must_use]
    pub fn enabled_kinds(&self) -> Vec<CollectorKind> {
        [
            (self.repos, CollectorKind::Repo),
            (self.issues, CollectorKind::Issue),
            (self.pull_requests, CollectorKind::PullRequest),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos: Vec::new(),
            request_timeout: default_request_timeout(),
            base_url: default_base_url(),
            web: WebConfig::default(),
            collectors: CollectorsConfig::default(),
        }
    }
}

impl Config {
    /// Loads `config_path`, or `github-exporter.toml` under `base_dir` when no path is given.
    ///
    /// A missing default file yields the default configuration; a missing explicit file is an error.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        Self::from_toml(&text, &format!("configuration file '{final_path}'"))
    }

    /// Parses and validates configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_toml(text, "configuration")
    }

    fn from_toml(text: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).into_app_err_with(|| format!("parsing {origin}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than zero");
        }

        if !self.web.path.starts_with('/') {
            bail!("web.path must start with '/', got '{}'", self.web.path);
        }

        if self.web.path.contains(['{', '}', '*']) {
            bail!("web.path cannot contain '{{', '}}' or '*', got '{}'", self.web.path);
        }

        if self.web.path.contains("//") {
            bail!("web.path cannot contain an empty segment, got '{}'", self.web.path);
        }

        if self.web.path.split('/').any(|segment| segment.starts_with(':')) {
            bail!("web.path segments cannot start with ':', got '{}'", self.web.path);
        }

        if RESERVED_PATHS.contains(&self.web.path.as_str()) {
            bail!("web.path cannot be '{}', which the exporter serves itself", self.web.path);
        }

        if self.collectors.enabled_kinds().is_empty() {
            bail!("at least one collector must be enabled");
        }

        let _ = Url::parse(&self.base_url).into_app_err_with(|| format!("base_url '{}' is not a valid URL", self.base_url))?;

        Ok(())
    }

    /// Entries of `repos` that are not of the form `owner/name`.
    ///
    /// These are not fatal: each is skipped and counted as a failure at poll time.
    #[must_use]
    pub fn invalid_targets(&self) -> Vec<AppError> {
        self.repos.iter().filter_map(|spec| RepoTarget::parse(spec).err()).collect()
    }
}

/// Resolves the location of the default configuration file relative to `base_dir`
#[must_use]
pub fn default_config_path(base_dir: &Utf8Path) -> Utf8PathBuf {
    base_dir.join(DEFAULT_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_config_matches_embedded() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_empty_text_yields_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            repos = ["acme/web", "acme/*-service"]
            request_timeout = "1m 30s"
            base_url = "https://ghe.example.com/api/v3"

            [web]
            address = "127.0.0.1:9000"
            path = "/prom"

            [collectors]
            issues = false
            "#,
        )
        .unwrap();

        assert_eq!(config.repos, ["acme/web", "acme/*-service"]);
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.base_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.web.address, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.web.path, "/prom");
        assert!(config.collectors.repos);
        assert!(!config.collectors.issues);
        assert!(config.collectors.pull_requests);
        assert_eq!(config.collectors.enabled_kinds(), [CollectorKind::Repo, CollectorKind::PullRequest]);
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let _ = Config::parse("repositories = []").unwrap_err();
        let _ = Config::parse("[web]\nport = 9504").unwrap_err();
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = Config {
            request_timeout: Duration::ZERO,
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    fn test_validate_relative_path() {
        let config = Config {
            web: WebConfig {
                path: "metrics".into(),
                ..WebConfig::default()
            },
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    fn test_validate_reserved_path() {
        let config = Config {
            web: WebConfig {
                path: "/healthz".into(),
                ..WebConfig::default()
            },
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    fn test_validate_rejects_route_syntax_in_path() {
        for path in ["/metrics{", "/metrics}", "/{id}", "/*rest", "/prom//metrics", "//", "/:id", "/a/:b"] {
            let config = Config {
                web: WebConfig {
                    path: path.into(),
                    ..WebConfig::default()
                },
                ..Config::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("web.path"), "{path}: {err}");
        }
    }

    #[test]
    fn test_validate_accepts_plain_paths() {
        for path in ["/", "/metrics", "/prom/metrics", "/metrics/", "/a-b_c.txt"] {
            let config = Config {
                web: WebConfig {
                    path: path.into(),
                    ..WebConfig::default()
                },
                ..Config::default()
            };
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_parse_rejects_route_syntax_in_path() {
        let err = Config::parse("[web]\npath = \"/metrics{\"").unwrap_err();
        assert!(err.to_string().contains("web.path"));
    }

    #[test]
    fn test_validate_no_collectors() {
        let config = Config {
            collectors: CollectorsConfig {
                repos: false,
                issues: false,
                pull_requests: false,
            },
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one collector"));
    }

    #[test]
    fn test_validate_bad_base_url() {
        let config = Config {
            base_url: "not a url".into(),
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    fn test_invalid_targets() {
        let config = Config {
            repos: vec!["acme/web".into(), "justaname".into(), "a/b/c".into(), "acme/*".into()],
            ..Config::default()
        };
        assert_eq!(config.invalid_targets().len(), 2);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let output_path = default_config_path(&dir);
        Config::save_default(&output_path).unwrap();

        let loaded = Config::load(&dir, None).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_default_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        assert_eq!(Config::load(&dir, None).unwrap(), Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_explicit_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let missing = dir.join("nope.toml");
        let err = Config::load(&dir, Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_reports_file_on_invalid_content() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let path = dir.join("bad.toml");
        fs::write(&path, "request_timeout = 5").unwrap();

        let err = Config::load(&dir, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_validates_content() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let path = dir.join("zero.toml");
        fs::write(&path, "request_timeout = \"0s\"").unwrap();

        let err = Config::load(&dir, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("request_timeout must be greater than zero"));
    }
}
