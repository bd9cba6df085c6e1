use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("{}", .0)]
  UrlParseError(#[from] url::ParseError),

  #[error("{}", .0)]
  ReqwestError(#[from] reqwest::Error),

  #[error("{}", .0)]
  SerdeError(#[from] serde_json::Error),

  #[error("Received an error from Discord: `{}`", .0)]
  SerenityError(#[from] serenity::Error),

  #[error("Encountered a Tokio IO error: `{:?}`", .0)]
  TokioIOError(#[from] tokio::io::Error),

  #[error("Received a failed response from {}. Code: {}", location, code)]
  FailedResponse { location: &'static str, code: u16 },

  #[error(
    "Received an unknown response body structure when querying. Body location: {:?}\n{}",
    location,
    response
  )]
  UnknownResponseBody {
    location: &'static str,
    response: String,
  },

  #[error("Could not locate the @everyone role for the guild of channel {:?}", .0)]
  EveryoneRoleMissing(u64),

  #[error("Channel {:?} is not a guild channel.", .0)]
  ChannelIsNotInAGuild(u64),

  #[error(
    "Failed to fetch message {} in channel {}. Reason: `{}`",
    message_id,
    channel_id,
    reason
  )]
  MessageUnavailable {
    channel_id: u64,
    message_id: u64,
    reason: String,
  },

  #[error("The alert marker file {:?} contains an invalid start time: {:?}", path, value)]
  InvalidAlertMarker { path: PathBuf, value: String },
}
