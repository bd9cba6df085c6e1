use crate::secret_string::Secret;
use anyhow::anyhow;
use schematic::{Config, ConfigLoader};
use std::path::{Path, PathBuf};

const DEFAULT_RECORD_REACTIONS_FILE: &str = "reactions.json";
const DEFAULT_TIKTOK_ALERT_FILE: &str = "last_tiktok_alert.txt";

/// A message whose reactions get recorded by the reaction snapshotter.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReactionTarget {
  pub channel: u64,
  pub message: u64,
}

#[derive(Debug, Config, serde::Serialize, serde::Deserialize)]
#[config(rename_all = "snake_case")]
pub struct AppConfig {
  #[setting(required, env = "DISCORD_TOKEN")]
  discord_token: Option<Secret>,
  #[setting(required)]
  clock_channel_id: Option<u64>,

  live_channel_id: Option<u64>,
  /// `0` means no administrator is configured.
  #[setting(default = 0)]
  admin_user_id: u64,

  record_reactions: Vec<ReactionTarget>,
  #[setting(default = "reactions.json")]
  record_reactions_file: String,

  tiktok_username: Option<String>,
  tiktok_channel_id: Option<u64>,
  /// Holds the start time of the last announced TikTok livestream.
  #[setting(default = "last_tiktok_alert.txt")]
  tiktok_alert_file: String,
}

impl AppConfig {
  /// Loads the JSON config at `config_path`.
  ///
  /// # Errors
  /// - The file doesn't exist or isn't valid JSON.
  /// - `discord_token` or `clock_channel_id` are missing or empty.
  pub fn load<P: AsRef<Path>>(config_path: P) -> anyhow::Result<Self> {
    let config_path = config_path.as_ref();

    if !config_path.is_file() {
      return Err(anyhow!(
        "Config file {:?} doesn't exist. Specify a valid config file.",
        config_path
      ));
    }

    let config = ConfigLoader::<AppConfig>::new()
      .file(config_path.to_path_buf())?
      .load()?
      .config;

    config.validate_required_fields()?;

    Ok(config)
  }

  fn validate_required_fields(&self) -> anyhow::Result<()> {
    if self.discord_token.as_ref().map_or(true, Secret::is_empty) {
      return Err(anyhow!("Config file missing required field: [discord_token]."));
    }

    if self.clock_channel_id.unwrap_or_default() == 0 {
      return Err(anyhow!("Config file missing required field: [clock_channel_id]."));
    }

    if self.tiktok_username.is_some() != self.tiktok_channel_id.is_some() {
      tracing::warn!(
        "Both tiktok_username and tiktok_channel_id are needed for livestream alerts. Alerts are disabled."
      );
    }

    Ok(())
  }

  pub fn discord_token(&self) -> &str {
    self
      .discord_token
      .as_ref()
      .map(|token| Secret::read_secret_string(token.read_value()))
      .unwrap_or_default()
  }

  pub fn clock_channel_id(&self) -> u64 {
    self.clock_channel_id.unwrap_or_default()
  }

  pub fn live_channel_id(&self) -> Option<u64> {
    self.live_channel_id.filter(|channel_id| *channel_id != 0)
  }

  pub fn admin_user_id(&self) -> Option<u64> {
    (self.admin_user_id != 0).then_some(self.admin_user_id)
  }

  pub fn record_reactions(&self) -> &[ReactionTarget] {
    &self.record_reactions
  }

  pub fn record_reactions_file(&self) -> PathBuf {
    if self.record_reactions_file.trim().is_empty() {
      return PathBuf::from(DEFAULT_RECORD_REACTIONS_FILE);
    }

    PathBuf::from(&self.record_reactions_file)
  }

  /// Returns the username and announcement channel when TikTok alerts are fully configured.
  pub fn tiktok_alert_target(&self) -> Option<(&str, u64)> {
    let username = self.tiktok_username.as_deref()?.trim();
    let channel_id = self.tiktok_channel_id.filter(|channel_id| *channel_id != 0)?;

    (!username.is_empty()).then_some((username, channel_id))
  }

  pub fn tiktok_alert_file(&self) -> PathBuf {
    if self.tiktok_alert_file.trim().is_empty() {
      return PathBuf::from(DEFAULT_TIKTOK_ALERT_FILE);
    }

    PathBuf::from(&self.tiktok_alert_file)
  }
}
