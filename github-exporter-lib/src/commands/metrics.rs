use super::Host;
use crate::Result;
use crate::collectors::{MetricDesc, all_descriptors};
use clap::{Parser, ValueEnum};
use ohno::IntoAppError;
use std::io::Write;

/// Output format for the metric catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CatalogFormat {
    /// One metric per line
    #[default]
    Text,

    /// A Markdown table, for documentation
    Markdown,
}

#[derive(Parser, Debug, Default)]
pub struct MetricsArgs {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: CatalogFormat,
}

/// Prints every metric the exporter can emit.
pub fn list_metrics<H: Host>(host: &mut H, args: &MetricsArgs) -> Result<()> {
    let descs = all_descriptors();
    let mut out = host.output();

    match args.format {
        CatalogFormat::Text => {
            for desc in &descs {
                writeln!(out, "{}{{{}}}  {}", desc.name, desc.labels.join(","), desc.help).into_app_err("writing metric catalog")?;
            }
        }
        CatalogFormat::Markdown => {
            writeln!(out, "| Metric | Description | Labels |\n|--------|-------------|--------|").into_app_err("writing metric catalog")?;
            for desc in &descs {
                writeln!(out, "{}", markdown_row(desc)).into_app_err("writing metric catalog")?;
            }
        }
    }

    Ok(())
}

fn markdown_row(desc: &MetricDesc) -> String {
    let labels = desc.labels.iter().map(|l| format!("`{l}`")).collect::<Vec<_>>().join(", ");
    format!("| `{}` | {} | {labels} |", desc.name, desc.help)
}
