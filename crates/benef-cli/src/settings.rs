//! Runtime settings: defaults, then the TOML file, then `BENEF_*`
//! environment variables, then command-line flags.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, ensure};
use benef_client::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use benef_core::api::DEFAULT_PER_PAGE;
use serde::Deserialize;

use crate::Args;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Server root, without the `/api` prefix.
  pub url:          String,
  pub per_page:     u32,
  pub download_dir: PathBuf,
  pub log_file:     PathBuf,
  pub timeout_secs: u64,
}

impl Settings {
  pub fn load(args: &Args) -> Result<Self> {
    let path_string = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());

    let settings: Settings = config::Config::builder()
      .set_default("url", DEFAULT_BASE_URL)?
      .set_default("per_page", i64::from(DEFAULT_PER_PAGE))?
      .set_default("download_dir", ".")?
      .set_default("log_file", "benef.log")?
      .set_default("timeout_secs", DEFAULT_TIMEOUT.as_secs() as i64)?
      .add_source(config::File::from(args.config.clone()).required(false))
      .add_source(config::Environment::with_prefix("BENEF").try_parsing(true))
      .set_override_option("url", args.url.clone())?
      .set_override_option("per_page", args.per_page.map(i64::from))?
      .set_override_option("download_dir", path_string(&args.download_dir))?
      .set_override_option("log_file", path_string(&args.log_file))?
      .build()
      .with_context(|| format!("failed to read config file {}", args.config.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")?;

    ensure!(settings.per_page > 0, "per_page must be at least 1");
    Ok(settings)
  }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      base_url:     self.url.clone(),
      download_dir: self.download_dir.clone(),
      timeout:      Duration::from_secs(self.timeout_secs),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use clap::Parser;

  use super::*;

  fn args(extra: &[&str]) -> Args {
    Args::parse_from(std::iter::once("benef").chain(extra.iter().copied()))
  }

  #[test]
  fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("absent.toml");
    let settings = Settings::load(&args(&["--config", config.to_str().unwrap()])).unwrap();
    assert_eq!(settings.per_page, 10);
    assert_eq!(settings.download_dir, PathBuf::from("."));
    assert_eq!(settings.log_file, PathBuf::from("benef.log"));
    assert_eq!(settings.api_config().timeout, Duration::from_secs(30));
  }

  #[test]
  fn flags_override_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
      file,
      "url = \"http://plans.internal:8080\"\nper_page = 25\ndownload_dir = \"/tmp/exports\""
    )
    .unwrap();
    let path = file.path().to_str().unwrap();

    let settings = Settings::load(&args(&["--config", path])).unwrap();
    assert_eq!(settings.url, "http://plans.internal:8080");
    assert_eq!(settings.per_page, 25);
    assert_eq!(settings.download_dir, PathBuf::from("/tmp/exports"));

    let settings =
      Settings::load(&args(&["--config", path, "--url", "http://other:5000", "--per-page", "5"]))
        .unwrap();
    assert_eq!(settings.url, "http://other:5000");
    assert_eq!(settings.per_page, 5);
    assert_eq!(settings.api_config().base_url, "http://other:5000");
  }

  #[test]
  fn zero_page_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("absent.toml");
    let result = Settings::load(&args(&["--config", config.to_str().unwrap(), "--per-page", "0"]));
    assert!(result.is_err());
  }
}
