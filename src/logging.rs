use app_config::log_level_wrapper::LoggingConfigLevel;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_FILENAME_PREFIX: &str = "discordbot";
const LOG_FILENAME_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 5;

/// Crates that are too chatty to follow the requested level past `warn`.
const NOISY_TARGETS: [&str; 6] = ["serenity", "tungstenite", "hyper", "reqwest", "rustls", "h2"];

/// Logs to stdout and to a daily rolling file inside `logging_dir`.
pub fn setup_logging_config(
  log_level: LoggingConfigLevel,
  logging_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
  std::fs::create_dir_all(logging_dir)?;

  let file_appender = RollingFileAppender::builder()
    .rotation(Rotation::DAILY)
    .filename_prefix(LOG_FILENAME_PREFIX)
    .filename_suffix(LOG_FILENAME_SUFFIX)
    .max_log_files(MAX_LOG_FILES)
    .build(logging_dir)?;

  tracing_subscriber::fmt()
    .with_env_filter(build_env_filter(log_level))
    .with_ansi(false)
    .with_writer(std::io::stdout.and(file_appender))
    .init();

  Ok(())
}

fn build_env_filter(log_level: LoggingConfigLevel) -> EnvFilter {
  EnvFilter::new(filter_directives(log_level))
}

fn filter_directives(log_level: LoggingConfigLevel) -> String {
  let noisy_level = log_level.min(LoggingConfigLevel::Warn);

  NOISY_TARGETS
    .iter()
    .fold(log_level.to_string(), |directives, target| {
      format!("{directives},{target}={noisy_level}")
    })
}
