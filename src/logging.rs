use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Route tracing output to the configured log file. Both front ends own the
/// terminal, so nothing is ever logged to stdout or stderr. Problems creating
/// the file are reported once on stderr and logging stays off.
pub fn init(config: &Config) {
    let Some(log_path) = config.log_file.as_ref() else {
        return;
    };

    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = fs::create_dir_all(parent) {
            eprintln!(
                "Warning: could not create log directory {}: {err}",
                parent.display()
            );
            return;
        }
    }

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!(
                "Warning: could not open log file {}: {err}",
                log_path.display()
            );
            return;
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("book_catalog={}", config.log_level)));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!(path = %log_path.display(), "logging initialized");
}
