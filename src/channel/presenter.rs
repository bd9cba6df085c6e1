use crate::channel::live_status::LiveIntent;
use crate::discord::DiscordApi;
use crate::errors::AppError;
use serenity::all::ChannelId;
use std::future::Future;

pub trait LivePresenter: Send + Sync {
  fn present(&self, intent: LiveIntent) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Renames the live voice channel and toggles its visibility for `@everyone`.
#[derive(Debug, Clone)]
pub struct LiveChannelPresenter<D> {
  discord: D,
  channel_id: ChannelId,
}

impl<D: DiscordApi> LiveChannelPresenter<D> {
  pub fn new(discord: D, channel_id: ChannelId) -> Self {
    Self {
      discord,
      channel_id,
    }
  }
}

impl<D: DiscordApi> LivePresenter for LiveChannelPresenter<D> {
  /// The rename isn't undone when the permission step fails.
  async fn present(&self, intent: LiveIntent) -> Result<(), AppError> {
    tracing::info!(
      "Presenting channel {} as {:?}.",
      self.channel_id,
      intent
    );

    self
      .discord
      .rename_channel(self.channel_id, intent.channel_name())
      .await?;

    let Some(everyone_role) = self.discord.everyone_role(self.channel_id).await? else {
      tracing::error!(
        "Could not locate @everyone role for channel {}. Could not change its visibility.",
        self.channel_id
      );

      return Err(AppError::EveryoneRoleMissing(self.channel_id.get()));
    };

    self
      .discord
      .set_role_visibility(self.channel_id, everyone_role, intent.is_visible())
      .await
  }
}
