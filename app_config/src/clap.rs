use crate::log_level_wrapper::LoggingConfigLevel;
use clap::{Arg, Command};
use lazy_static::lazy_static;
use std::ffi::OsString;
use std::path::PathBuf;

lazy_static! {
  pub static ref CLAP_ARGS: ClapArgs = ClapArgs::new();
}

pub struct ClapArgs {
  args: clap::ArgMatches,
}

impl ClapArgs {
  const CONFIG_PATH: &'static str = "config";
  const LOG_LEVEL: &'static str = "loglevel";
  const LOG_DIR: &'static str = "log_dir";

  const DEFAULT_CONFIG_PATH: &'static str = "config.json";
  const DEFAULT_LOG_LEVEL: &'static str = "INFO";
  const DEFAULT_LOG_DIR: &'static str = "logs";

  pub fn new() -> Self {
    let args = Self::setup_args().get_matches();

    Self { args }
  }

  /// Parses the given arguments instead of the process arguments.
  pub fn parse_from<I, T>(arguments: I) -> Result<Self, clap::Error>
  where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
  {
    let args = Self::setup_args().try_get_matches_from(arguments)?;

    Ok(Self { args })
  }

  pub fn config_path(&self) -> PathBuf {
    self
      .args
      .get_one::<String>(Self::CONFIG_PATH)
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_PATH))
  }

  pub fn log_level(&self) -> LoggingConfigLevel {
    self
      .args
      .get_one::<String>(Self::LOG_LEVEL)
      .map(|log_level| LoggingConfigLevel::from(log_level.as_str()))
      .unwrap_or_default()
  }

  pub fn log_dir(&self) -> PathBuf {
    self
      .args
      .get_one::<String>(Self::LOG_DIR)
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_LOG_DIR))
  }

  fn setup_args() -> Command {
    Command::new("BackbeatBot's Discord Bot")
      .about("A simple Discord Bot")
      .after_help("by ChillFacToR032")
      .arg(
        Arg::new(Self::CONFIG_PATH)
          .short('c')
          .long("config")
          .action(clap::ArgAction::Set)
          .default_value(Self::DEFAULT_CONFIG_PATH)
          .help("Path to a config file. See the README for an example."),
      )
      .arg(
        Arg::new(Self::LOG_LEVEL)
          .short('L')
          .long("loglevel")
          .action(clap::ArgAction::Set)
          .default_value(Self::DEFAULT_LOG_LEVEL)
          .help("Sets the log level [INFO,ERROR,WARNING,DEBUG]"),
      )
      .arg(
        Arg::new(Self::LOG_DIR)
          .long("log-dir")
          .action(clap::ArgAction::Set)
          .default_value(Self::DEFAULT_LOG_DIR)
          .help("Directory the rolling log files are written to."),
      )
  }
}

impl Default for ClapArgs {
  fn default() -> Self {
    Self::new()
  }
}
