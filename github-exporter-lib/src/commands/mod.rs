//! Command-line interface and orchestration for github-exporter
//!
//! # Commands
//!
//! - **serve**: Load the configuration, build the collectors, and serve `/metrics`
//!   until Ctrl-C or SIGTERM
//! - **metrics**: Print the catalog of metric names, help text, and labels
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file, flagging malformed repository entries
//!
//! Configuration is a TOML file (`github-exporter.toml` by default) whose values
//! can be overridden from the command line or the environment.

mod common;
mod config;
mod host;
mod init;
mod metrics;
mod run;
mod serve;
mod server;
mod validate;

pub use common::{LogLevel, init_logging};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use metrics::{CatalogFormat, MetricsArgs, list_metrics};
pub use run::run;
pub use serve::{ServeArgs, serve};
pub use server::{router, run_server, shutdown_on_signal};
pub use validate::{ValidateArgs, validate_config};
