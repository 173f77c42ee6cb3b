//! Logging infrastructure for gidkit.
//!
//! Structured file logging with daily rotation to platform-standard directories.
//! Standard output stays reserved for command results.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

/// Prefix of every log file written by the daily appender.
const LOG_FILE_PREFIX: &str = "gidkit";

/// Log files older than this are removed at startup.
const RETENTION_DAYS: u64 = 7;

/// Result of initializing the logging system.
pub struct LoggingContext {
    /// Guard that must be held for the application lifetime to ensure logs are flushed.
    pub _guard: WorkerGuard,
    /// The session ID for this gidkit invocation.
    pub session_id: String,
    /// The directory where logs are written.
    pub log_directory: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to determine log directory")]
    NoLogDirectory,

    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}

/// Generates a 6-character random hex session ID.
fn generate_session_id() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let bytes: [u8; 3] = rng.random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Platform log directory.
///
/// macOS: ~/Library/Logs/gidkit/
/// Linux: ~/.local/state/gidkit/
/// Windows: %LocalAppData%\gidkit\
pub fn log_directory() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|home| home.join("Library").join("Logs").join("gidkit"))
    } else {
        let project_dirs = ProjectDirs::from("com", "gidkit", "gidkit")?;
        project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .or_else(|| Some(project_dirs.data_local_dir().to_path_buf()))
    }
}

/// Builds the level filter: `RUST_LOG` wins, then `--verbose`, then the configured level.
fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose { "debug" } else { level };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes the logging system.
///
/// The returned `WorkerGuard` must be held for the application lifetime.
pub fn init(level: &str, verbose: bool) -> Result<LoggingContext, LoggingError> {
    let session_id = generate_session_id();

    let log_dir = log_directory().ok_or(LoggingError::NoLogDirectory)?;
    fs::create_dir_all(&log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: log_dir.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(level, verbose))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;

    info!(session_id = %session_id, version = env!("CARGO_PKG_VERSION"), "session_start");

    Ok(LoggingContext {
        _guard: guard,
        session_id,
        log_directory: log_dir,
    })
}

/// Deletes `gidkit.*` log files older than the retention period.
///
/// Errors are logged at WARN level and never stop startup. Returns the
/// number of files removed.
pub fn cleanup_old_logs(log_dir: &Path) -> usize {
    let retention = Duration::from_secs(RETENTION_DAYS * 24 * 60 * 60);

    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "log_cleanup_read_dir_failed");
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut deleted = 0;

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if name.starts_with("gidkit.") => name.to_string(),
            _ => continue,
        };

        let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn!(file = %file_name, error = %e, "log_cleanup_metadata_failed");
                continue;
            }
        };

        // Files stamped in the future are left alone.
        let Ok(age) = now.duration_since(modified) else {
            continue;
        };

        if age > retention {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %file_name, age_days = age.as_secs() / 86400, "log_file_deleted");
                    deleted += 1;
                }
                Err(e) => warn!(file = %file_name, error = %e, "log_file_delete_failed"),
            }
        }
    }

    if deleted > 0 {
        debug!(count = deleted, "log_cleanup_completed");
    }
    deleted
}
