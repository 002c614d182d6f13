//! Command-line options and the resolved runtime configuration.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

use crate::db::database_path;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".harmony-notes";
/// Log folder inside the data directory.
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Parser)]
#[command(
    name = "harmony",
    version,
    about = "Terminal notebook with depression and schizophrenia indicators"
)]
pub struct Cli {
    /// Directory holding the notes database and logs (defaults to ~/.harmony-notes)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Pre-fill the login screen with this email
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,
}

/// Fully resolved settings used by `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
    pub email: Option<String>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        Self::with_data_dir(data_dir, &cli.log_level, cli.email.clone())
    }

    pub fn with_data_dir(data_dir: PathBuf, log_level: &str, email: Option<String>) -> Result<Self> {
        Ok(Self {
            db_path: database_path(&data_dir),
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
            log_level: normalize_level(log_level)?,
            email: email.filter(|value| !value.trim().is_empty()),
        })
    }
}

/// Resolve `~/.harmony-notes`.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(anyhow!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}
