use crate::channel::{LiveIntent, LivePresenter};
use crate::errors::AppError;
use serenity::all::{ChannelId, Message, UserId};

/// The commands the administrator can send the bot in a direct message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
  HideLiveChannel,
  ShowLiveChannel,
  Unknown,
}

impl AdminCommand {
  const HIDE_LIVE_CHANNEL: &'static str = "!hide_live_channel";
  const SHOW_LIVE_CHANNEL: &'static str = "!show_live_channel";

  pub fn parse(content: &str) -> Self {
    match content {
      Self::HIDE_LIVE_CHANNEL => Self::HideLiveChannel,
      Self::SHOW_LIVE_CHANNEL => Self::ShowLiveChannel,
      _ => Self::Unknown,
    }
  }

  pub fn reply(&self) -> &'static str {
    match self {
      Self::HideLiveChannel => "Hiding the live channel.",
      Self::ShowLiveChannel => "Making the live channel visible.",
      Self::Unknown => "I'm not sure what you want.",
    }
  }

  pub fn intent(&self) -> Option<LiveIntent> {
    match self {
      Self::HideLiveChannel => Some(LiveIntent::NotLive),
      Self::ShowLiveChannel => Some(LiveIntent::Live),
      Self::Unknown => None,
    }
  }
}

/// The parts of a received message the command filter looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
  pub author_id: UserId,
  pub author_name: String,
  pub channel_id: ChannelId,
  pub is_private: bool,
  pub content: String,
}

impl From<&Message> for IncomingMessage {
  fn from(message: &Message) -> Self {
    Self {
      author_id: message.author.id,
      author_name: message.author.name.clone(),
      channel_id: message.channel_id,
      is_private: message.guild_id.is_none(),
      content: message.content.clone(),
    }
  }
}

/// Decides which messages are admin commands.
#[derive(Debug, Clone, Copy)]
pub struct AdminCommandChannel {
  bot_user_id: UserId,
  admin_user_id: Option<UserId>,
}

impl AdminCommandChannel {
  pub fn new(bot_user_id: UserId, admin_user_id: Option<UserId>) -> Self {
    Self {
      bot_user_id,
      admin_user_id,
    }
  }

  /// Only direct messages from the administrator are commands. The bot's own messages never are.
  pub fn command_for(&self, message: &IncomingMessage) -> Option<AdminCommand> {
    if message.author_id == self.bot_user_id {
      return None;
    }

    if !message.is_private || Some(message.author_id) != self.admin_user_id {
      return None;
    }

    Some(AdminCommand::parse(&message.content))
  }
}

/// Applies the command's presentation, if it has one.
///
/// This is a manual override. The live status reconciler keeps its own cached
/// state, so its next observed change can undo it.
pub async fn apply_command<P: LivePresenter>(
  command: AdminCommand,
  presenter: Option<&P>,
) -> Result<(), AppError> {
  let Some(intent) = command.intent() else {
    return Ok(());
  };

  let Some(presenter) = presenter else {
    tracing::warn!(
      "Received {:?} but no live channel is configured.",
      command
    );

    return Ok(());
  };

  presenter.present(intent).await
}
