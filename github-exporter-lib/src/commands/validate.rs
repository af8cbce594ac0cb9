use super::Host;
use super::config::{Config, default_config_path};
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `github-exporter.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    validate_in(host, Utf8Path::new("."), args)
}

fn validate_in<H: Host>(host: &mut H, base_dir: &Utf8Path, args: &ValidateArgs) -> Result<()> {
    let config_path = args.config.as_deref();

    let config = match Config::load(base_dir, config_path) {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            return Err(e);
        }
    };

    for e in config.invalid_targets() {
        let _ = writeln!(host.error(), "⚠️ {e}; this entry will be skipped");
    }

    let _ = writeln!(host.output(), "Configuration file is valid");
    match config_path {
        Some(path) => {
            let _ = writeln!(host.output(), "Config file: {path}");
        }
        None if default_config_path(base_dir).exists() => {
            let _ = writeln!(host.output(), "Config file: {}", default_config_path(base_dir));
        }
        None => {
            let _ = writeln!(host.output(), "Using default configuration (no config file found)");
        }
    }

    let _ = writeln!(
        host.output(),
        "{} repository entr{}, collectors: {}",
        config.repos.len(),
        if config.repos.len() == 1 { "y" } else { "ies" },
        config
            .collectors
            .enabled_kinds()
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};
    use std::fs;

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        (tmp, dir)
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_generated_config_is_valid() {
        let (_tmp, dir) = temp_dir();
        let config_path = dir.join("generated.toml");

        let mut init_host = TestHost::new();
        init_config(
            &mut init_host,
            &InitArgs {
                output: config_path.clone(),
                force: false,
            },
        )
        .unwrap();

        let mut host = TestHost::new();
        validate_in(&mut host, &dir, &ValidateArgs { config: Some(config_path) }).unwrap();
        assert!(host.output_text().contains("Configuration file is valid"));
        assert_eq!(host.exit_code, None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_missing_default_file_uses_defaults() {
        let (_tmp, dir) = temp_dir();
        let mut host = TestHost::new();
        validate_in(&mut host, &dir, &ValidateArgs { config: None }).unwrap();
        assert!(host.output_text().contains("Using default configuration"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_toml_syntax() {
        let (_tmp, dir) = temp_dir();
        let config_path = dir.join("invalid_syntax.toml");
        fs::write(&config_path, "[web\naddress = \"0.0.0.0:9504\"\n").unwrap();

        let mut host = TestHost::new();
        let result = validate_in(&mut host, &dir, &ValidateArgs { config: Some(config_path) });

        let _ = result.unwrap_err();
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_values_fail() {
        let (_tmp, dir) = temp_dir();
        let config_path = dir.join("no_collectors.toml");
        fs::write(&config_path, "[collectors]\nrepos = false\nissues = false\npull_requests = false\n").unwrap();

        let mut host = TestHost::new();
        let _ = validate_in(&mut host, &dir, &ValidateArgs { config: Some(config_path) }).unwrap_err();
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_malformed_targets_are_warnings() {
        let (_tmp, dir) = temp_dir();
        fs::write(dir.join("github-exporter.toml"), "repos = [\"acme/web\", \"justaname\"]\n").unwrap();

        let mut host = TestHost::new();
        validate_in(&mut host, &dir, &ValidateArgs { config: None }).unwrap();

        assert!(host.error_text().contains("justaname"));
        assert!(host.output_text().contains("Configuration file is valid"));
        assert!(host.output_text().contains("2 repository entries"));
        assert_eq!(host.exit_code, None);
    }
}
