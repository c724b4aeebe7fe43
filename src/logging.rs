//! Logging setup.
//!
//! Logs go to stderr so that listings printed on stdout stay clean. The
//! configured level applies to gator itself; sqlx and the HTTP stack are
//! held at `warn` or quieter. `RUST_LOG`, when set and valid, replaces all of
//! this.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Targets that only log at `warn` or above unless `RUST_LOG` says otherwise.
const NOISY_TARGETS: &[&str] = &["sqlx", "hyper", "hyper_util", "reqwest", "rustls"];

/// Map a configured level name to a [`Level`], defaulting to `INFO`.
fn parse_level(level: &str) -> Level {
    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        return Level::WARN;
    }
    level.parse().unwrap_or(Level::INFO)
}

/// Filter directives for the configured level.
fn directives(level: &str) -> String {
    let level = parse_level(level);
    // More verbose levels compare greater.
    let noisy = level.min(Level::WARN);

    let mut directives = level.as_str().to_lowercase();
    for target in NOISY_TARGETS {
        directives.push_str(&format!(",{target}={}", noisy.as_str().to_lowercase()));
    }
    directives
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// Open `path` for appending, creating it and its parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::options().create(true).append(true).open(path)?)
}

/// Install the global subscriber.
///
/// Without a log file this is [`init_console_only`]. With one, every event
/// is written to both stderr and the file, without ANSI colors. Fails only
/// if the file cannot be opened; nothing is installed in that case.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let Some(file) = config.file.as_deref() else {
        init_console_only(&config.level);
        return Ok(());
    };

    let log_file = Arc::new(open_log_file(Path::new(file))?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(env_filter(&config.level))
        .init();

    Ok(())
}

/// Install a stderr-only subscriber.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(env_filter(level))
        .init();
}
