/// Logging configuration.
///
/// Always logs to stderr. When a log directory is given, logs are also
/// appended to `{log_dir}/heatmap.log`, each session starting with a
/// separator line.
use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "heatmap.log";

/// Initializes logging for one CLI session.
///
/// # Arguments
///
/// * `log_dir` - Optional directory for the persistent log file
/// * `session` - Label written into the session separator (usually the command name)
pub fn init_logging(log_dir: Option<&Path>, session: &str) -> Result<()> {
    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            write_separator(dir, session);

            let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false) // No ANSI codes in log files
                    .with_target(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // Default to INFO level, but allow override via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .ok(); // Ignore error if already initialized

    tracing::debug!("Logging initialized for session: {}", session);

    Ok(())
}

fn write_separator(dir: &Path, session: &str) {
    let separator = format!(
        "\n{sep}\n[{ts}] New session: {session}\n{sep}\n",
        sep = "=".repeat(80),
        ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        session = session
    );

    use std::io::Write;
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    {
        let _ = writeln!(file, "{}", separator);
    }
}
