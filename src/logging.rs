use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "narat.log";

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("narat")
}

/// `RUST_LOG` wins, then the CLI flag, then the config value.
pub fn filter_directive(env: Option<String>, cli: Option<&str>, config: &str) -> String {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| cli.map(str::to_string))
        .unwrap_or_else(|| config.to_string())
}

/// The terminal belongs to the UI, so logs go to a file.
pub fn init(dir: &Path, directive: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("narat=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_precedence() {
        assert_eq!(
            filter_directive(Some("debug".into()), Some("warn"), "narat=info"),
            "debug"
        );
        assert_eq!(filter_directive(Some(" ".into()), Some("warn"), "narat=info"), "warn");
        assert_eq!(filter_directive(None, None, "narat=info"), "narat=info");
    }
}
