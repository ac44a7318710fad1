use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MINDLITE_LOG";
const LOG_FILE_NAME: &str = "mindlite.log";

/// Log file sits next to the database; the TUI owns the terminal.
pub fn log_path_for(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(LOG_FILE_NAME),
        _ => PathBuf::from(LOG_FILE_NAME),
    }
}

pub fn init(db_path: &Path, default_level: &str) -> Result<()> {
    let path = log_path_for(db_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {:?}", path))?;

    let env_value = env::var(LOG_ENV).ok();
    let (filter, rejected) = select_filter(env_value.as_deref(), default_level)?;
    if let Some(reason) = &rejected {
        eprintln!("warning: {}", reason);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing log subscriber: {}", err))?;
    if let Some(reason) = rejected {
        warn!("{}", reason);
    }
    Ok(())
}

/// Uses `env_value` when it parses as a filter, else `default_level`.
/// The second value says why a non-empty `env_value` was ignored.
fn select_filter(
    env_value: Option<&str>,
    default_level: &str,
) -> Result<(EnvFilter, Option<String>)> {
    let mut rejected = None;
    if let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) {
        match EnvFilter::try_new(raw) {
            Ok(filter) => return Ok((filter, None)),
            Err(err) => {
                rejected = Some(format!("ignoring invalid {}={:?}: {}", LOG_ENV, raw, err));
            }
        }
    }
    let filter = EnvFilter::try_new(default_level)
        .with_context(|| format!("parsing log level {:?}", default_level))?;
    Ok((filter, rejected))
}
