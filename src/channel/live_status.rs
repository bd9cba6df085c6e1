/// Whether the live channel should present the stream as running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveIntent {
  Live,
  NotLive,
}

impl LiveIntent {
  pub const LIVE_CHANNEL_NAME: &'static str = "🟢 Mitch is live!";
  pub const NOT_LIVE_CHANNEL_NAME: &'static str = "🔴 Mitch isn't live";

  /// Part of the live name used to recover the last presented state from the channel name on startup.
  const LIVE_NAME_MARKER: &'static str = "Mitch is live!";

  pub fn channel_name(&self) -> &'static str {
    match self {
      Self::Live => Self::LIVE_CHANNEL_NAME,
      Self::NotLive => Self::NOT_LIVE_CHANNEL_NAME,
    }
  }

  /// `@everyone` sees the channel only while live.
  pub fn is_visible(&self) -> bool {
    matches!(self, Self::Live)
  }

  pub fn from_channel_name(channel_name: &str) -> Self {
    if channel_name.contains(Self::LIVE_NAME_MARKER) {
      Self::Live
    } else {
      Self::NotLive
    }
  }
}

impl From<bool> for LiveIntent {
  fn from(is_live: bool) -> Self {
    if is_live {
      Self::Live
    } else {
      Self::NotLive
    }
  }
}
