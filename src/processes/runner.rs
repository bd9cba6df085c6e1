use crate::errors::AppError;
use crate::processes::event_handler::BotEventHandler;
use crate::processes::periodic_task::TaskRegistry;
use app_config::AppConfig;
use serenity::all::{Client, GatewayIntents};
use serenity::gateway::ShardManager;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

/// How long shutdown waits for the gateway to disconnect before giving up.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Ordered so that the lifecycle only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
  Created,
  Connecting,
  Ready,
  ShuttingDown,
  Closed,
}

/// Shared view of where the bot is in its lifecycle.
#[derive(Debug, Clone)]
pub struct Lifecycle {
  state: Arc<watch::Sender<LifecycleState>>,
}

impl Lifecycle {
  pub fn new() -> Self {
    let (state, _) = watch::channel(LifecycleState::Created);

    Self {
      state: Arc::new(state),
    }
  }

  pub fn state(&self) -> LifecycleState {
    *self.state.borrow()
  }

  /// Moves to `next_state` if it's later than the current state. Returns whether it moved.
  pub fn transition(&self, next_state: LifecycleState) -> bool {
    let mut previous_state = next_state;
    let moved = self.state.send_if_modified(|state| {
      previous_state = *state;

      if next_state <= *state {
        return false;
      }

      *state = next_state;

      true
    });

    if moved {
      tracing::debug!("Lifecycle: {:?} -> {:?}", previous_state, next_state);
    } else {
      tracing::debug!(
        "Ignored lifecycle transition {:?} -> {:?}",
        previous_state,
        next_state
      );
    }

    moved
  }

  pub fn is_stopping(&self) -> bool {
    matches!(
      self.state(),
      LifecycleState::ShuttingDown | LifecycleState::Closed
    )
  }
}

impl Default for Lifecycle {
  fn default() -> Self {
    Self::new()
  }
}

/// The connection to the chat platform's gateway.
pub trait GatewayConnection: Send + Sync {
  fn disconnect(&self) -> impl Future<Output = ()> + Send;
}

impl GatewayConnection for Arc<ShardManager> {
  async fn disconnect(&self) {
    self.shutdown_all().await;
  }
}

/// Stops every periodic task, then asks the gateway to disconnect. Both steps share `timeout`.
///
/// A timeout is logged and otherwise ignored. Calling this more than once is a no-op.
pub async fn shutdown<G: GatewayConnection>(
  lifecycle: &Lifecycle,
  tasks: &Mutex<TaskRegistry>,
  gateway: &G,
  timeout: Duration,
) {
  if !lifecycle.transition(LifecycleState::ShuttingDown) {
    return;
  }

  tracing::info!("Shutting down bot.");

  let deadline = Instant::now() + timeout;

  match tokio::time::timeout_at(deadline, tasks.lock()).await {
    Ok(mut tasks) => {
      tasks
        .shutdown(deadline.saturating_duration_since(Instant::now()))
        .await
    }
    Err(_) => tracing::error!(
      "Couldn't reach the periodic tasks within {:?}. Leaving them to the runtime.",
      timeout
    ),
  }

  match tokio::time::timeout_at(deadline, gateway.disconnect()).await {
    Ok(()) => tracing::info!("Disconnected successfully."),
    Err(_) => tracing::error!(
      "The gateway didn't disconnect within {:?}. Continuing the shutdown.",
      timeout
    ),
  }
}

fn gateway_intents() -> GatewayIntents {
  GatewayIntents::GUILDS
    | GatewayIntents::GUILD_MESSAGE_REACTIONS
    | GatewayIntents::DIRECT_MESSAGES
    | GatewayIntents::MESSAGE_CONTENT
}

/// Connects to Discord and runs until a shutdown signal arrives or the client stops on its own.
pub async fn run_bot(config: Arc<AppConfig>) -> Result<(), AppError> {
  tracing::info!("Starting BackbeatBot Discord Bot");

  let lifecycle = Lifecycle::new();
  let tasks = Arc::new(Mutex::new(TaskRegistry::default()));
  let event_handler = BotEventHandler::new(config.clone(), tasks.clone(), lifecycle.clone());

  lifecycle.transition(LifecycleState::Connecting);

  let mut client = Client::builder(config.discord_token(), gateway_intents())
    .event_handler(event_handler)
    .await?;
  let shard_manager = client.shard_manager.clone();

  let signal_process = {
    let lifecycle = lifecycle.clone();
    let tasks = tasks.clone();
    let shard_manager = shard_manager.clone();

    tokio::spawn(async move {
      wait_for_shutdown_signal().await;
      tracing::info!("Shutdown signal detected.");

      shutdown(&lifecycle, &tasks, &shard_manager, SHUTDOWN_TIMEOUT).await;
    })
  };

  let client_result = client.start().await;

  if lifecycle.is_stopping() {
    if let Err(error) = signal_process.await {
      tracing::error!("The shutdown process ended with an error: {}", error);
    }
  } else {
    signal_process.abort();

    if let Err(error) = &client_result {
      tracing::error!("The Discord client stopped unexpectedly. Reason: {}", error);
    }

    shutdown(&lifecycle, &tasks, &shard_manager, SHUTDOWN_TIMEOUT).await;
  }

  lifecycle.transition(LifecycleState::Closed);

  client_result.map_err(Into::into)
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
  use tokio::signal::unix::{signal, SignalKind};

  let mut terminate_signal = match signal(SignalKind::terminate()) {
    Ok(terminate_signal) => terminate_signal,
    Err(error) => {
      tracing::error!("Failed to listen for SIGTERM. Reason: {}", error);

      wait_for_ctrl_c().await;

      return;
    }
  };

  tokio::select! {
    _ = wait_for_ctrl_c() => tracing::debug!("Caught Signal SIGINT"),
    _ = terminate_signal.recv() => tracing::debug!("Caught Signal SIGTERM"),
  }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
  wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
  if let Err(error) = tokio::signal::ctrl_c().await {
    tracing::error!("Failed to listen for ctrl-c. Reason: {}", error);

    std::future::pending::<()>().await;
  }
}
