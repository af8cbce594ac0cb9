use super::Host;
use super::common::{LogLevel, init_logging};
use super::config::Config;
use super::server::{router, run_server, shutdown_on_signal};
use crate::Result;
use crate::collectors::Exporter;
use crate::hosting::Client;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use core::net::SocketAddr;
use ohno::IntoAppError;
use std::io::Write;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "     serve";

#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Path to configuration file (default is `github-exporter.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Additional repositories to export, as `owner/name` (may contain `*`)
    #[arg(long = "repo", value_name = "OWNER/NAME", env = "GITHUB_EXPORTER_REPOS", value_delimiter = ',')]
    pub repos: Vec<String>,

    /// Address to listen on, overriding `web.address`
    #[arg(long, value_name = "ADDR", env = "GITHUB_EXPORTER_WEB_ADDRESS")]
    pub web_address: Option<SocketAddr>,

    /// GitHub API base URL, overriding `base_url`
    #[arg(long, value_name = "URL", env = "GITHUB_EXPORTER_BASE_URL")]
    pub base_url: Option<String>,

    /// Set the logging level for diagnostic output (default is `info`)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl ServeArgs {
    /// Loads the configuration and layers the command-line overrides on top.
    pub fn resolve_config(&self, base_dir: &Utf8Path) -> Result<Config> {
        let mut config = Config::load(base_dir, self.config.as_deref())?;

        config.repos.extend(self.repos.iter().map(|r| r.trim().to_string()).filter(|r| !r.is_empty()));

        if let Some(address) = self.web_address {
            config.web.address = address;
        }

        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Runs the exporter until a shutdown signal arrives.
pub async fn serve<H: Host>(host: &mut H, args: &ServeArgs) -> Result<()> {
    init_logging(args.log_level.unwrap_or(LogLevel::Info));

    let config = args.resolve_config(Utf8Path::new("."))?;

    if config.repos.is_empty() {
        log::warn!(target: LOG_TARGET, "No repositories configured, only the exporter's own metrics will be served");
    }

    for e in config.invalid_targets() {
        log::warn!(target: LOG_TARGET, "{e}");
    }

    let client = Client::new(args.github_token.as_deref(), &config.base_url)?;
    let exporter = Exporter::new(
        &client,
        config.repos.clone(),
        config.request_timeout,
        &config.collectors.enabled_kinds(),
    )?;

    let listener = TcpListener::bind(config.web.address)
        .await
        .into_app_err_with(|| format!("binding to {}", config.web.address))?;

    let local_addr = listener.local_addr().into_app_err("reading the listening address")?;
    log::info!(target: LOG_TARGET, "Serving metrics on http://{local_addr}{}", config.web.path);
    let _ = writeln!(host.output(), "Listening on {local_addr}");

    let cancel = CancellationToken::new();
    let signals = tokio::spawn(shutdown_on_signal(cancel.clone()));

    let app = router(Arc::new(exporter), &config.web.path, cancel.clone());
    let result = run_server(listener, app, cancel.clone()).await;

    cancel.cancel();
    let _ = signals.await;

    log::info!(target: LOG_TARGET, "Exporter stopped");
    result
}
