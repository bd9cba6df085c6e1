use crate::admin_commands::{apply_command, AdminCommand, AdminCommandChannel, IncomingMessage};
use crate::channel::{ClockUpdater, LiveChannelPresenter, LiveIntent};
use crate::discord::{DiscordApi, DiscordChannels};
use crate::errors::AppError;
use crate::live_status::{
  AlertMarkerFile, BackbeatStatusEndpoint, LiveStatusReconciler, LivestreamAlert,
  TikTokLiveEndpoint,
};
use crate::processes::periodic_task::{TaskRegistry, TICK_INTERVAL};
use crate::processes::runner::{Lifecycle, LifecycleState};
use crate::reactions::ReactionSnapshotter;
use app_config::AppConfig;
use serenity::all::{ChannelId, Context, EventHandler, Message, Ready, UserId};
use serenity::async_trait;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;

pub struct BotEventHandler {
  config: Arc<AppConfig>,
  tasks: Arc<Mutex<TaskRegistry>>,
  lifecycle: Lifecycle,
  bot_user_id: OnceLock<UserId>,
}

impl BotEventHandler {
  pub fn new(config: Arc<AppConfig>, tasks: Arc<Mutex<TaskRegistry>>, lifecycle: Lifecycle) -> Self {
    Self {
      config,
      tasks,
      lifecycle,
      bot_user_id: OnceLock::new(),
    }
  }
}

#[async_trait]
impl EventHandler for BotEventHandler {
  async fn ready(&self, context: Context, ready: Ready) {
    tracing::info!("Logged in as {} (ID: {})", ready.user.name, ready.user.id);

    let _ = self.bot_user_id.set(ready.user.id);

    let started = start_periodic_tasks(
      &self.tasks,
      &self.lifecycle,
      &self.config,
      DiscordChannels::new(context.http.clone()),
    )
    .await;

    if started {
      tracing::info!("=== BackbeatBot Discord Bot Ready ===");
    }
  }

  async fn message(&self, context: Context, message: Message) {
    handle_message(
      &IncomingMessage::from(&message),
      self.bot_user_id.get().copied(),
      &self.config,
      DiscordChannels::new(context.http.clone()),
    )
    .await;
  }
}

/// Registers the periodic tasks unless they're already running or the bot is stopping.
///
/// Returns whether the tasks were started.
async fn start_periodic_tasks<D>(
  tasks: &Mutex<TaskRegistry>,
  lifecycle: &Lifecycle,
  config: &AppConfig,
  discord: D,
) -> bool
where
  D: DiscordApi + Clone + 'static,
{
  let mut tasks = tasks.lock().await;

  // Checked under the lock so a shutdown that already emptied the registry isn't undone.
  if lifecycle.is_stopping() {
    return false;
  }

  // A resumed or reconnected gateway sends `ready` again.
  if !tasks.is_empty() {
    tracing::info!("Periodic tasks are already running.");

    return false;
  }

  if let Err(error) = register_tasks(&mut tasks, config, discord).await {
    tracing::error!("Failed to register every periodic task. Reason: {}", error);
  }

  lifecycle.transition(LifecycleState::Ready);

  true
}

/// Replies to and applies an admin command. Messages that arrive before `ready` are ignored.
///
/// Returns the command the message carried, if any.
async fn handle_message<D: DiscordApi>(
  message: &IncomingMessage,
  bot_user_id: Option<UserId>,
  config: &AppConfig,
  discord: D,
) -> Option<AdminCommand> {
  let admin_user_id = config.admin_user_id().map(UserId::new);
  let command = AdminCommandChannel::new(bot_user_id?, admin_user_id).command_for(message)?;

  tracing::info!("Recv DM From [{}]: {}", message.author_name, message.content);

  if let Err(error) = discord.send_message(message.channel_id, command.reply()).await {
    tracing::error!("Failed to reply to an admin command. Reason: {}", error);
  }

  let presenter = config
    .live_channel_id()
    .map(|channel_id| LiveChannelPresenter::new(discord, ChannelId::new(channel_id)));

  if let Err(error) = apply_command(command, presenter.as_ref()).await {
    tracing::error!("Failed to apply {:?}. Reason: {}", command, error);
  }

  Some(command)
}

/// Registers every periodic task the config enables.
async fn register_tasks<D>(
  tasks: &mut TaskRegistry,
  config: &AppConfig,
  discord: D,
) -> Result<(), AppError>
where
  D: DiscordApi + Clone + 'static,
{
  tasks.spawn(
    ClockUpdater::new(discord.clone(), ChannelId::new(config.clock_channel_id())),
    TICK_INTERVAL,
  );

  if let Some(live_channel_id) = config.live_channel_id().map(ChannelId::new) {
    let initial_live_status = initial_live_status(&discord, live_channel_id).await;
    let presenter = LiveChannelPresenter::new(discord.clone(), live_channel_id);

    tasks.spawn(
      LiveStatusReconciler::new(BackbeatStatusEndpoint::new()?, presenter, initial_live_status),
      TICK_INTERVAL,
    );
  } else {
    tracing::warn!("No live_channel_id configured. Live status mirroring is disabled.");
  }

  if let Some((username, channel_id)) = config.tiktok_alert_target() {
    let livestream_alert = LivestreamAlert::new(
      TikTokLiveEndpoint::new(username)?,
      discord.clone(),
      username,
      ChannelId::new(channel_id),
      AlertMarkerFile::new(config.tiktok_alert_file()),
    )
    .await;

    tasks.spawn(livestream_alert, TICK_INTERVAL);
  }

  if !config.record_reactions().is_empty() {
    tasks.spawn(
      ReactionSnapshotter::new(
        discord,
        config.record_reactions().to_vec(),
        config.record_reactions_file(),
      ),
      TICK_INTERVAL,
    );
  }

  Ok(())
}

/// Recovers the last presented state from the live channel's name.
async fn initial_live_status<D: DiscordApi>(discord: &D, live_channel_id: ChannelId) -> bool {
  match discord.channel_name(live_channel_id).await {
    Ok(channel_name) => LiveIntent::from_channel_name(&channel_name) == LiveIntent::Live,
    Err(error) => {
      tracing::error!(
        "Failed to read the live channel {}. Assuming it's not live. Reason: {}",
        live_channel_id,
        error
      );

      false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing_helper_methods::{DiscordCall, FakeDiscord, EVERYONE_ROLE_ID};
  use tempfile::TempDir;

  const LIVE_CHANNEL: u64 = 42;
  const BOT: u64 = 1;
  const ADMIN: u64 = 2;
  const DM_CHANNEL: u64 = 900;

  async fn load_config(directory: &TempDir, contents: &str) -> AppConfig {
    let config_path = directory.path().join("config.json");

    tokio::fs::write(&config_path, contents).await.unwrap();

    AppConfig::load(&config_path).unwrap()
  }

  async fn admin_config(directory: &TempDir) -> AppConfig {
    load_config(
      directory,
      &format!(
        r#"{{
          "discord_token": "token",
          "clock_channel_id": 1,
          "live_channel_id": {LIVE_CHANNEL},
          "admin_user_id": {ADMIN}
        }}"#
      ),
    )
    .await
  }

  fn direct_message(author: u64, content: &str) -> IncomingMessage {
    IncomingMessage {
      author_id: UserId::new(author),
      author_name: "mitch".to_string(),
      channel_id: ChannelId::new(DM_CHANNEL),
      is_private: true,
      content: content.to_string(),
    }
  }

  #[tokio::test]
  async fn live_channel_name_sets_the_initial_status() {
    let discord = FakeDiscord::default().with_channel_name(LIVE_CHANNEL, LiveIntent::LIVE_CHANNEL_NAME);

    assert!(initial_live_status(&discord, ChannelId::new(LIVE_CHANNEL)).await);
  }

  #[tokio::test]
  async fn unreadable_live_channel_starts_not_live() {
    let discord = FakeDiscord::default();

    assert!(!initial_live_status(&discord, ChannelId::new(LIVE_CHANNEL)).await);
  }

  #[tokio::test(start_paused = true)]
  async fn disabled_features_are_not_registered() {
    let directory = tempfile::tempdir().unwrap();
    let config = load_config(
      &directory,
      &format!(
        r#"{{
          "discord_token": "token",
          "clock_channel_id": 1,
          "record_reactions": [{{ "channel": 2, "message": 3 }}],
          "record_reactions_file": {:?}
        }}"#,
        directory.path().join("reactions.json")
      ),
    )
    .await;
    let mut tasks = TaskRegistry::default();

    register_tasks(&mut tasks, &config, FakeDiscord::default())
      .await
      .unwrap();

    assert_eq!(
      tasks.task_names(),
      vec!["clock update", "reaction recording"]
    );

    tasks.shutdown(TICK_INTERVAL).await;
  }

  #[tokio::test(start_paused = true)]
  async fn repeated_ready_registers_tasks_once() {
    let directory = tempfile::tempdir().unwrap();
    let config = load_config(
      &directory,
      r#"{ "discord_token": "token", "clock_channel_id": 1 }"#,
    )
    .await;
    let tasks = Mutex::new(TaskRegistry::default());
    let lifecycle = Lifecycle::new();

    lifecycle.transition(LifecycleState::Connecting);

    assert!(start_periodic_tasks(&tasks, &lifecycle, &config, FakeDiscord::default()).await);
    assert!(!start_periodic_tasks(&tasks, &lifecycle, &config, FakeDiscord::default()).await);

    assert_eq!(tasks.lock().await.task_names(), vec!["clock update"]);
    assert_eq!(lifecycle.state(), LifecycleState::Ready);

    tasks.lock().await.shutdown(TICK_INTERVAL).await;
  }

  #[tokio::test(start_paused = true)]
  async fn ready_during_shutdown_registers_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let config = load_config(
      &directory,
      r#"{ "discord_token": "token", "clock_channel_id": 1 }"#,
    )
    .await;
    let tasks = Mutex::new(TaskRegistry::default());
    let lifecycle = Lifecycle::new();

    lifecycle.transition(LifecycleState::ShuttingDown);

    assert!(!start_periodic_tasks(&tasks, &lifecycle, &config, FakeDiscord::default()).await);

    assert!(tasks.lock().await.is_empty());
    assert_eq!(lifecycle.state(), LifecycleState::ShuttingDown);
  }

  #[tokio::test]
  async fn messages_before_ready_are_ignored() {
    let directory = tempfile::tempdir().unwrap();
    let config = admin_config(&directory).await;
    let discord = FakeDiscord::default();

    let command = handle_message(
      &direct_message(ADMIN, "!hide_live_channel"),
      None,
      &config,
      discord.clone(),
    )
    .await;

    assert_eq!(command, None);
    assert!(discord.calls().is_empty());
  }

  #[tokio::test]
  async fn admin_hide_command_replies_then_hides_the_live_channel() {
    let directory = tempfile::tempdir().unwrap();
    let config = admin_config(&directory).await;
    let discord = FakeDiscord::default();

    let command = handle_message(
      &direct_message(ADMIN, "!hide_live_channel"),
      Some(UserId::new(BOT)),
      &config,
      discord.clone(),
    )
    .await;

    assert_eq!(command, Some(AdminCommand::HideLiveChannel));
    assert_eq!(
      discord.calls(),
      vec![
        DiscordCall::SendMessage {
          channel_id: DM_CHANNEL,
          content: "Hiding the live channel.".to_string(),
        },
        DiscordCall::Rename {
          channel_id: LIVE_CHANNEL,
          name: LiveIntent::NOT_LIVE_CHANNEL_NAME.to_string(),
        },
        DiscordCall::SetVisibility {
          channel_id: LIVE_CHANNEL,
          role_id: EVERYONE_ROLE_ID,
          visible: false,
        },
      ]
    );
  }

  #[tokio::test]
  async fn messages_from_other_users_change_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let config = admin_config(&directory).await;
    let discord = FakeDiscord::default();

    let command = handle_message(
      &direct_message(3, "!show_live_channel"),
      Some(UserId::new(BOT)),
      &config,
      discord.clone(),
    )
    .await;

    assert_eq!(command, None);
    assert!(discord.calls().is_empty());
  }
}
