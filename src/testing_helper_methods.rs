use crate::channel::{LiveIntent, LivePresenter};
use crate::discord::{DiscordApi, ReactionRoster};
use crate::errors::AppError;
use crate::live_status::endpoints::StatusEndpoint;
use serenity::all::{ChannelId, MessageId, RoleId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const EVERYONE_ROLE_ID: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscordCall {
  Rename {
    channel_id: u64,
    name: String,
  },
  SetVisibility {
    channel_id: u64,
    role_id: u64,
    visible: bool,
  },
  SendMessage {
    channel_id: u64,
    content: String,
  },
}

#[derive(Debug)]
struct FakeDiscordState {
  calls: Vec<DiscordCall>,
  everyone_role: Option<RoleId>,
  channel_names: HashMap<u64, String>,
  reactions: HashMap<u64, Vec<ReactionRoster>>,
  fail_renames: bool,
  fail_messages: bool,
}

impl Default for FakeDiscordState {
  fn default() -> Self {
    Self {
      calls: vec![],
      everyone_role: Some(RoleId::new(EVERYONE_ROLE_ID)),
      channel_names: HashMap::new(),
      reactions: HashMap::new(),
      fail_renames: false,
      fail_messages: false,
    }
  }
}

/// Records every mutating call instead of talking to Discord.
#[derive(Debug, Clone, Default)]
pub struct FakeDiscord {
  state: Arc<Mutex<FakeDiscordState>>,
}

impl FakeDiscord {
  pub fn with_everyone_role(self, role: Option<RoleId>) -> Self {
    self.state.lock().unwrap().everyone_role = role;
    self
  }

  pub fn with_channel_name(self, channel_id: u64, name: &str) -> Self {
    self
      .state
      .lock()
      .unwrap()
      .channel_names
      .insert(channel_id, name.to_string());
    self
  }

  /// Reactions are keyed by message ID. Messages without an entry fail to fetch.
  pub fn with_reactions(self, message_id: u64, rosters: Vec<ReactionRoster>) -> Self {
    self
      .state
      .lock()
      .unwrap()
      .reactions
      .insert(message_id, rosters);
    self
  }

  pub fn failing_renames(self) -> Self {
    self.state.lock().unwrap().fail_renames = true;
    self
  }

  pub fn failing_messages(self) -> Self {
    self.state.lock().unwrap().fail_messages = true;
    self
  }

  pub fn remove_message(&self, message_id: u64) {
    self.state.lock().unwrap().reactions.remove(&message_id);
  }

  pub fn calls(&self) -> Vec<DiscordCall> {
    self.state.lock().unwrap().calls.clone()
  }
}

fn fake_failure(location: &'static str) -> AppError {
  AppError::FailedResponse {
    location,
    code: 500,
  }
}

impl DiscordApi for FakeDiscord {
  async fn channel_name(&self, channel_id: ChannelId) -> Result<String, AppError> {
    self
      .state
      .lock()
      .unwrap()
      .channel_names
      .get(&channel_id.get())
      .cloned()
      .ok_or(AppError::ChannelIsNotInAGuild(channel_id.get()))
  }

  async fn rename_channel(&self, channel_id: ChannelId, name: &str) -> Result<(), AppError> {
    let mut state = self.state.lock().unwrap();

    if state.fail_renames {
      return Err(fake_failure("fake rename"));
    }

    state.calls.push(DiscordCall::Rename {
      channel_id: channel_id.get(),
      name: name.to_string(),
    });

    Ok(())
  }

  async fn everyone_role(&self, _channel_id: ChannelId) -> Result<Option<RoleId>, AppError> {
    Ok(self.state.lock().unwrap().everyone_role)
  }

  async fn set_role_visibility(
    &self,
    channel_id: ChannelId,
    role_id: RoleId,
    visible: bool,
  ) -> Result<(), AppError> {
    self
      .state
      .lock()
      .unwrap()
      .calls
      .push(DiscordCall::SetVisibility {
        channel_id: channel_id.get(),
        role_id: role_id.get(),
        visible,
      });

    Ok(())
  }

  async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<(), AppError> {
    let mut state = self.state.lock().unwrap();

    if state.fail_messages {
      return Err(fake_failure("fake send message"));
    }

    state.calls.push(DiscordCall::SendMessage {
      channel_id: channel_id.get(),
      content: content.to_string(),
    });

    Ok(())
  }

  async fn message_reactions(
    &self,
    channel_id: ChannelId,
    message_id: MessageId,
  ) -> Result<Vec<ReactionRoster>, AppError> {
    self
      .state
      .lock()
      .unwrap()
      .reactions
      .get(&message_id.get())
      .cloned()
      .ok_or(AppError::MessageUnavailable {
        channel_id: channel_id.get(),
        message_id: message_id.get(),
        reason: "Unknown Message".to_string(),
      })
  }
}

/// Records every intent it's asked to present.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
  intents: Arc<Mutex<Vec<LiveIntent>>>,
  fail: bool,
}

impl RecordingPresenter {
  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Default::default()
    }
  }

  pub fn intents(&self) -> Vec<LiveIntent> {
    self.intents.lock().unwrap().clone()
  }
}

impl LivePresenter for RecordingPresenter {
  async fn present(&self, intent: LiveIntent) -> Result<(), AppError> {
    self.intents.lock().unwrap().push(intent);

    if self.fail {
      return Err(AppError::EveryoneRoleMissing(0));
    }

    Ok(())
  }
}

/// Hands out the queued results in order, then fails.
#[derive(Debug)]
pub struct ScriptedEndpoint<T> {
  results: Mutex<VecDeque<Result<T, AppError>>>,
}

impl<T> ScriptedEndpoint<T> {
  pub fn new(results: Vec<Result<T, AppError>>) -> Self {
    Self {
      results: Mutex::new(results.into()),
    }
  }
}

impl<T> Default for ScriptedEndpoint<T> {
  fn default() -> Self {
    Self::new(vec![])
  }
}

impl<T: Send> StatusEndpoint for ScriptedEndpoint<T> {
  type Observation = T;

  async fn fetch(&self) -> Result<T, AppError> {
    self
      .results
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(Err(fake_failure("scripted endpoint")))
  }
}
