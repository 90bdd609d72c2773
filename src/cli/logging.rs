//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level. With a log file
//! configured, output is appended there without ANSI colours.

use super::config::LoggingConfig;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    // try_init: a subscriber may already be installed (tests).
    match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create log directory: {}", e))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;

            let _ = registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init();
        }
        None => {
            let _ = registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("catalog.log");
        let config = LoggingConfig {
            level: "debug".to_string(),
            file: Some(path.clone()),
        };

        init(&config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_init_tolerates_bad_level() {
        let config = LoggingConfig {
            level: "not a [valid filter".to_string(),
            file: None,
        };
        assert!(init(&config).is_ok());
    }
}
