use crate::discord::DiscordApi;
use crate::errors::AppError;
use crate::processes::periodic_task::PeriodicTask;
use chrono::{DateTime, Timelike, Utc};
use serenity::all::ChannelId;

const CLOCK_UPDATE_MINUTE_STEP: u32 = 10;

/// Keeps a text channel named after the current UTC time, e.g. `(Now: Mon 9:05am UTC)`.
#[derive(Debug)]
pub struct ClockUpdater<D> {
  discord: D,
  channel_id: ChannelId,
}

impl<D: DiscordApi> ClockUpdater<D> {
  pub fn new(discord: D, channel_id: ChannelId) -> Self {
    Self {
      discord,
      channel_id,
    }
  }

  /// Renames the channel when `now` falls on a ten minute mark.
  ///
  /// Returns the name that was applied, if any.
  pub async fn update_at(&self, now: DateTime<Utc>) -> Result<Option<String>, AppError> {
    if now.minute() % CLOCK_UPDATE_MINUTE_STEP != 0 {
      return Ok(None);
    }

    let channel_name = clock_channel_name(now);

    tracing::info!(
      "Edit channel: Id[{}] Name[{}]",
      self.channel_id,
      channel_name
    );

    self
      .discord
      .rename_channel(self.channel_id, &channel_name)
      .await?;

    Ok(Some(channel_name))
  }
}

impl<D: DiscordApi + 'static> PeriodicTask for ClockUpdater<D> {
  fn name(&self) -> &'static str {
    "clock update"
  }

  async fn tick(&mut self) {
    match self.update_at(Utc::now()).await {
      Ok(Some(_)) => tracing::info!("Channel edit successful"),
      Ok(None) => (),
      Err(error) => tracing::error!("Channel edit failed. Reason: {}", error),
    }
  }
}

pub fn clock_channel_name(now: DateTime<Utc>) -> String {
  format!("(Now: {} UTC)", now.format("%a %-I:%M%P"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing_helper_methods::{DiscordCall, FakeDiscord};

  const CLOCK_CHANNEL: u64 = 7;

  fn at(timestamp: &str) -> DateTime<Utc> {
    timestamp.parse().unwrap()
  }

  #[test]
  fn morning_hours_drop_the_leading_zero() {
    assert_eq!(
      clock_channel_name(at("2024-01-01T09:05:00Z")),
      "(Now: Mon 9:05am UTC)"
    );
  }

  #[test]
  fn afternoon_hours_use_the_twelve_hour_clock() {
    assert_eq!(
      clock_channel_name(at("2024-01-01T13:00:00Z")),
      "(Now: Mon 1:00pm UTC)"
    );
    assert_eq!(
      clock_channel_name(at("2024-01-06T00:40:00Z")),
      "(Now: Sat 12:40am UTC)"
    );
    assert_eq!(
      clock_channel_name(at("2024-01-06T12:10:00Z")),
      "(Now: Sat 12:10pm UTC)"
    );
  }

  #[tokio::test]
  async fn off_mark_minutes_do_nothing() {
    let discord = FakeDiscord::default();
    let clock = ClockUpdater::new(discord.clone(), ChannelId::new(CLOCK_CHANNEL));

    let applied = clock.update_at(at("2024-01-01T13:37:00Z")).await.unwrap();

    assert_eq!(applied, None);
    assert!(discord.calls().is_empty());
  }

  #[tokio::test]
  async fn ten_minute_marks_rename_the_channel() {
    let discord = FakeDiscord::default();
    let clock = ClockUpdater::new(discord.clone(), ChannelId::new(CLOCK_CHANNEL));

    let applied = clock.update_at(at("2024-01-01T13:00:00Z")).await.unwrap();

    assert_eq!(applied.as_deref(), Some("(Now: Mon 1:00pm UTC)"));
    assert_eq!(
      discord.calls(),
      vec![DiscordCall::Rename {
        channel_id: CLOCK_CHANNEL,
        name: "(Now: Mon 1:00pm UTC)".to_string(),
      }]
    );
  }

  #[tokio::test]
  async fn rename_failures_are_returned() {
    let discord = FakeDiscord::default().failing_renames();
    let clock = ClockUpdater::new(discord.clone(), ChannelId::new(CLOCK_CHANNEL));

    assert!(clock.update_at(at("2024-01-01T13:20:00Z")).await.is_err());
  }
}
