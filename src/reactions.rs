use crate::discord::DiscordApi;
use crate::errors::AppError;
use crate::processes::periodic_task::PeriodicTask;
use app_config::ReactionTarget;
use serenity::all::{ChannelId, MessageId};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Message ID to the names of everyone that reacted to it.
pub type ReactionSnapshot = BTreeMap<String, Vec<String>>;

/// Records who reacted to a fixed list of messages.
///
/// Each cycle rebuilds the whole snapshot and overwrites the output file.
/// Messages that couldn't be fetched are left out instead of carrying over
/// the previous cycle's entry.
#[derive(Debug)]
pub struct ReactionSnapshotter<D> {
  discord: D,
  targets: Vec<ReactionTarget>,
  output_path: PathBuf,
}

impl<D: DiscordApi> ReactionSnapshotter<D> {
  pub fn new(discord: D, targets: Vec<ReactionTarget>, output_path: PathBuf) -> Self {
    Self {
      discord,
      targets,
      output_path,
    }
  }

  pub async fn snapshot(&self) -> ReactionSnapshot {
    let mut snapshot = ReactionSnapshot::new();

    for target in &self.targets {
      let (Some(channel_id), Some(message_id)) =
        (non_zero(target.channel), non_zero(target.message))
      else {
        tracing::error!("Invalid reaction target: {:?}", target);

        continue;
      };

      let rosters = match self
        .discord
        .message_reactions(ChannelId::new(channel_id), MessageId::new(message_id))
        .await
      {
        Ok(rosters) => rosters,
        Err(error) => {
          tracing::error!(
            "Failed to get reactions for message {} in channel {}. Reason: {}",
            message_id,
            channel_id,
            error
          );

          continue;
        }
      };

      let mut user_names = BTreeSet::new();

      for roster in rosters {
        tracing::debug!(
          "Message {} has {} {} reactions.",
          message_id,
          roster.users.len(),
          roster.emoji
        );

        user_names.extend(roster.users);
      }

      snapshot.insert(message_id.to_string(), user_names.into_iter().collect());
    }

    snapshot
  }

  /// Overwrites the output file. The previous content stays when writing fails.
  pub async fn write_snapshot(&self, snapshot: &ReactionSnapshot) -> Result<(), AppError> {
    let contents = serde_json::to_string_pretty(snapshot)?;

    tokio::fs::write(&self.output_path, contents).await?;

    Ok(())
  }
}

impl<D: DiscordApi + 'static> PeriodicTask for ReactionSnapshotter<D> {
  fn name(&self) -> &'static str {
    "reaction recording"
  }

  async fn tick(&mut self) {
    let snapshot = self.snapshot().await;

    tracing::debug!("Recorded reactions for {} messages.", snapshot.len());

    if let Err(error) = self.write_snapshot(&snapshot).await {
      tracing::error!(
        "Failed to write reactions to {:?}. Reason: {}",
        self.output_path,
        error
      );
    }
  }
}

fn non_zero(id: u64) -> Option<u64> {
  (id != 0).then_some(id)
}
