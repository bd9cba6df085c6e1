use crate::discord::DiscordApi;
use crate::errors::AppError;
use crate::live_status::endpoints::{LivestreamObservation, StatusEndpoint};
use crate::processes::periodic_task::PeriodicTask;
use serenity::all::ChannelId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The start time of the last announced livestream, kept on disk so a
/// restart doesn't announce the same stream again.
#[derive(Debug, Clone)]
pub struct AlertMarkerFile {
  path: PathBuf,
}

impl AlertMarkerFile {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Returns `None` when nothing was announced yet.
  pub async fn load(&self) -> Result<Option<i64>, AppError> {
    let contents = match tokio::fs::read_to_string(&self.path).await {
      Ok(contents) => contents,
      Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
      Err(error) => return Err(error.into()),
    };
    let contents = contents.trim();

    if contents.is_empty() {
      return Ok(None);
    }

    contents
      .parse::<i64>()
      .map(Some)
      .map_err(|_| AppError::InvalidAlertMarker {
        path: self.path.clone(),
        value: contents.to_string(),
      })
  }

  pub async fn store(&self, start_time: i64) -> Result<(), AppError> {
    tokio::fs::write(&self.path, start_time.to_string())
      .await
      .map_err(Into::into)
  }
}

/// Announces third party livestream starts.
///
/// Only "became live" can be observed, so nothing is ever announced when a stream ends.
#[derive(Debug)]
pub struct LivestreamAlert<E, D> {
  endpoint: E,
  discord: D,
  username: String,
  channel_id: ChannelId,
  marker_file: AlertMarkerFile,
  last_marker: Option<i64>,
}

impl<E, D> LivestreamAlert<E, D>
where
  E: StatusEndpoint<Observation = LivestreamObservation>,
  D: DiscordApi,
{
  /// Reads the persisted marker. An unreadable marker file is logged and treated as empty.
  pub async fn new(
    endpoint: E,
    discord: D,
    username: &str,
    channel_id: ChannelId,
    marker_file: AlertMarkerFile,
  ) -> Self {
    let last_marker = match marker_file.load().await {
      Ok(last_marker) => last_marker,
      Err(error) => {
        tracing::error!("Failed to read the last livestream alert. Reason: {}", error);

        None
      }
    };

    tracing::info!(
      "Watching {:?} for livestreams. Last alerted start time: {:?}",
      username,
      last_marker
    );

    Self {
      endpoint,
      discord,
      username: username.to_string(),
      channel_id,
      marker_file,
      last_marker,
    }
  }

  pub fn last_marker(&self) -> Option<i64> {
    self.last_marker
  }

  /// Announces the stream when its start time hasn't been announced yet.
  ///
  /// The marker only advances once the announcement was sent, so a failed
  /// send is retried on the next observation.
  /// Returns whether an announcement was sent.
  pub async fn observe(&mut self, observation: LivestreamObservation) -> Result<bool, AppError> {
    let LivestreamObservation::Live { start_time } = observation else {
      return Ok(false);
    };

    if self.last_marker == Some(start_time) {
      return Ok(false);
    }

    tracing::info!(
      "{} started a livestream at {}. Sending an alert.",
      self.username,
      start_time
    );

    self
      .discord
      .send_message(self.channel_id, &announcement(&self.username))
      .await?;

    self.last_marker = Some(start_time);

    if let Err(error) = self.marker_file.store(start_time).await {
      tracing::error!(
        "Failed to persist the livestream alert to {:?}. Reason: {}",
        self.marker_file.path(),
        error
      );
    }

    Ok(true)
  }
}

impl<E, D> PeriodicTask for LivestreamAlert<E, D>
where
  E: StatusEndpoint<Observation = LivestreamObservation> + 'static,
  D: DiscordApi + 'static,
{
  fn name(&self) -> &'static str {
    "tiktok live alert"
  }

  async fn tick(&mut self) {
    let observation = match self.endpoint.fetch().await {
      Ok(observation) => observation,
      Err(error) => {
        tracing::error!("Failed to check the TikTok live status. Reason: {}", error);

        return;
      }
    };

    if let Err(error) = self.observe(observation).await {
      tracing::error!("Failed to send the livestream alert. Reason: {}", error);
    }
  }
}

pub fn announcement(username: &str) -> String {
  format!(
    "{} is now live on TikTok! https://www.tiktok.com/@{}/live",
    username, username
  )
}
