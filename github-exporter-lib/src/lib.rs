#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for github-exporter
//!
//! This library consolidates all functionality for the github-exporter tool, which
//! polls the GitHub REST API on every Prometheus scrape and re-exposes repository,
//! issue, and pull request fields as metrics.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface, configuration, and the HTTP server
//! - [`hosting`]: GitHub API client, record types, and target resolution
//! - [`collectors`]: Per-kind metric collectors and metric shaping

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod collectors;
#[cfg(not(any(debug_assertions, test)))]
mod collectors;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod hosting;
#[cfg(not(any(debug_assertions, test)))]
mod hosting;

pub use crate::commands::{Host, run};
