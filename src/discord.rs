//! The narrow set of Discord operations the bot performs.
//!
//! Everything the periodic tasks and the admin commands do against Discord
//! goes through [`DiscordApi`], so the reconciliation logic runs without a
//! gateway connection in tests.

use crate::errors::AppError;
use serenity::all::{
  Channel, ChannelId, EditChannel, GuildChannel, Http, MessageId, PermissionOverwrite,
  PermissionOverwriteType, Permissions, RoleId, UserId,
};
use std::future::Future;
use std::sync::Arc;

const EVERYONE_ROLE_NAME: &str = "@everyone";
const REACTION_USERS_PAGE_SIZE: u8 = 100;

/// Every user that reacted with one emoji on a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRoster {
  pub emoji: String,
  pub users: Vec<String>,
}

pub trait DiscordApi: Send + Sync {
  /// The current name of a guild channel.
  fn channel_name(
    &self,
    channel_id: ChannelId,
  ) -> impl Future<Output = Result<String, AppError>> + Send;

  fn rename_channel(
    &self,
    channel_id: ChannelId,
    name: &str,
  ) -> impl Future<Output = Result<(), AppError>> + Send;

  /// The `@everyone` role of the guild the channel belongs to, if it could be found.
  fn everyone_role(
    &self,
    channel_id: ChannelId,
  ) -> impl Future<Output = Result<Option<RoleId>, AppError>> + Send;

  /// Clears (`visible`) or denies (`!visible`) `VIEW_CHANNEL` for the role on the channel.
  /// Other bits of the role's existing overwrite are kept.
  fn set_role_visibility(
    &self,
    channel_id: ChannelId,
    role_id: RoleId,
    visible: bool,
  ) -> impl Future<Output = Result<(), AppError>> + Send;

  fn send_message(
    &self,
    channel_id: ChannelId,
    content: &str,
  ) -> impl Future<Output = Result<(), AppError>> + Send;

  /// Fetches the channel, then the message, then every user of every reaction on it.
  fn message_reactions(
    &self,
    channel_id: ChannelId,
    message_id: MessageId,
  ) -> impl Future<Output = Result<Vec<ReactionRoster>, AppError>> + Send;
}

/// [`DiscordApi`] backed by serenity's REST client.
#[derive(Debug, Clone)]
pub struct DiscordChannels {
  http: Arc<Http>,
}

impl DiscordChannels {
  pub fn new(http: Arc<Http>) -> Self {
    Self { http }
  }

  fn http(&self) -> &Http {
    &self.http
  }

  async fn guild_channel(&self, channel_id: ChannelId) -> Result<GuildChannel, AppError> {
    channel_id
      .to_channel(self.http())
      .await?
      .guild()
      .ok_or(AppError::ChannelIsNotInAGuild(channel_id.get()))
  }

  async fn reaction_users(
    &self,
    channel_id: ChannelId,
    message_id: MessageId,
    reaction_type: &serenity::all::ReactionType,
  ) -> Result<Vec<String>, AppError> {
    let mut user_names = vec![];
    let mut after: Option<UserId> = None;

    loop {
      let page = channel_id
        .reaction_users(
          self.http(),
          message_id,
          reaction_type.clone(),
          Some(REACTION_USERS_PAGE_SIZE),
          after,
        )
        .await?;
      let page_length = page.len();

      after = page.last().map(|user| user.id);
      user_names.extend(
        page
          .into_iter()
          .map(|user| user.global_name.unwrap_or(user.name)),
      );

      if page_length < REACTION_USERS_PAGE_SIZE as usize || after.is_none() {
        break;
      }
    }

    Ok(user_names)
  }
}

impl DiscordApi for DiscordChannels {
  async fn channel_name(&self, channel_id: ChannelId) -> Result<String, AppError> {
    Ok(self.guild_channel(channel_id).await?.name)
  }

  async fn rename_channel(&self, channel_id: ChannelId, name: &str) -> Result<(), AppError> {
    channel_id
      .edit(self.http(), EditChannel::new().name(name))
      .await?;

    Ok(())
  }

  async fn everyone_role(&self, channel_id: ChannelId) -> Result<Option<RoleId>, AppError> {
    let channel = self.guild_channel(channel_id).await?;
    let roles = channel.guild_id.roles(self.http()).await?;

    Ok(
      roles
        .into_values()
        .find(|role| role.name == EVERYONE_ROLE_NAME)
        .map(|role| role.id),
    )
  }

  async fn set_role_visibility(
    &self,
    channel_id: ChannelId,
    role_id: RoleId,
    visible: bool,
  ) -> Result<(), AppError> {
    let channel = self.guild_channel(channel_id).await?;
    let kind = PermissionOverwriteType::Role(role_id);
    let (allow, deny) = channel
      .permission_overwrites
      .iter()
      .find(|overwrite| overwrite.kind == kind)
      .map(|overwrite| (overwrite.allow, overwrite.deny))
      .unwrap_or((Permissions::empty(), Permissions::empty()));
    let (allow, deny) = apply_view_channel(allow, deny, visible);

    channel_id
      .create_permission(self.http(), PermissionOverwrite { allow, deny, kind })
      .await?;

    Ok(())
  }

  async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<(), AppError> {
    channel_id.say(self.http(), content).await?;

    Ok(())
  }

  async fn message_reactions(
    &self,
    channel_id: ChannelId,
    message_id: MessageId,
  ) -> Result<Vec<ReactionRoster>, AppError> {
    let channel: Channel = channel_id.to_channel(self.http()).await?;
    let message = channel
      .id()
      .message(self.http(), message_id)
      .await
      .map_err(|error| AppError::MessageUnavailable {
        channel_id: channel_id.get(),
        message_id: message_id.get(),
        reason: error.to_string(),
      })?;
    let mut rosters = Vec::with_capacity(message.reactions.len());

    for reaction in &message.reactions {
      let users = self
        .reaction_users(channel_id, message_id, &reaction.reaction_type)
        .await?;

      rosters.push(ReactionRoster {
        emoji: reaction.reaction_type.to_string(),
        users,
      });
    }

    Ok(rosters)
  }
}

/// Returns the `(allow, deny)` pair of an overwrite after showing or hiding the channel.
pub fn apply_view_channel(
  mut allow: Permissions,
  mut deny: Permissions,
  visible: bool,
) -> (Permissions, Permissions) {
  allow.remove(Permissions::VIEW_CHANNEL);

  if visible {
    deny.remove(Permissions::VIEW_CHANNEL);
  } else {
    deny.insert(Permissions::VIEW_CHANNEL);
  }

  (allow, deny)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hiding_denies_view_channel_and_keeps_other_bits() {
    let allow = Permissions::VIEW_CHANNEL | Permissions::CONNECT;
    let deny = Permissions::SPEAK;

    let (allow, deny) = apply_view_channel(allow, deny, false);

    assert_eq!(allow, Permissions::CONNECT);
    assert_eq!(deny, Permissions::SPEAK | Permissions::VIEW_CHANNEL);
  }

  #[test]
  fn showing_clears_view_channel_from_both_sides() {
    let (allow, deny) = apply_view_channel(
      Permissions::empty(),
      Permissions::VIEW_CHANNEL | Permissions::SPEAK,
      true,
    );

    assert_eq!(allow, Permissions::empty());
    assert_eq!(deny, Permissions::SPEAK);
  }

  #[test]
  fn applying_the_same_visibility_twice_is_stable() {
    let once = apply_view_channel(Permissions::empty(), Permissions::empty(), false);
    let twice = apply_view_channel(once.0, once.1, false);

    assert_eq!(once, twice);
  }
}
