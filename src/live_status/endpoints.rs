use crate::errors::AppError;
use crate::helper_methods::get_json;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use url::Url;

const BACKBEAT_LIVE_STATUS_URL: &str = "https://backbeatbot.com/live_status.php";
const TIKTOK_ROOM_URL: &str = "https://www.tiktok.com/api-live/user/room/";
/// `liveRoom.status` value TikTok reports for a user that isn't streaming.
const TIKTOK_NOT_LIVE_STATUS: i64 = 4;
/// Keeps a stalled request from outliving its tick.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub trait StatusEndpoint: Send + Sync {
  type Observation: Send;

  fn fetch(&self) -> impl Future<Output = Result<Self::Observation, AppError>> + Send;
}

/// What the TikTok room endpoint reported for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivestreamObservation {
  NotLive,
  /// `start_time` identifies the stream and is used as the alert marker.
  Live { start_time: i64 },
}

/// The streaming source. Reports `{"live": 0|1}`.
#[derive(Debug, Clone)]
pub struct BackbeatStatusEndpoint {
  client: reqwest::Client,
  url: Url,
}

impl BackbeatStatusEndpoint {
  pub fn new() -> Result<Self, AppError> {
    Self::with_url(BACKBEAT_LIVE_STATUS_URL)
  }

  pub fn with_url(url: &str) -> Result<Self, AppError> {
    Ok(Self {
      client: http_client(HTTP_REQUEST_TIMEOUT)?,
      url: Url::parse(url)?,
    })
  }
}

impl StatusEndpoint for BackbeatStatusEndpoint {
  type Observation = bool;

  async fn fetch(&self) -> Result<bool, AppError> {
    tracing::debug!("Checking online status from {}", self.url);

    let response_value = get_json(self.client.get(self.url.clone()), "live status").await?;

    Ok(parse_live_flag(&response_value))
  }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
  Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// `live` equal to one (`1`, `1.0` or `true`) is live. Any other shape counts as not live.
pub fn parse_live_flag(response_value: &Value) -> bool {
  match response_value.get("live") {
    Some(Value::Bool(live)) => *live,
    Some(Value::Number(live)) => live.as_f64() == Some(1.0),
    _ => false,
  }
}

/// The third party livestream source.
#[derive(Debug, Clone)]
pub struct TikTokLiveEndpoint {
  client: reqwest::Client,
  url: Url,
}

impl TikTokLiveEndpoint {
  pub fn new(username: &str) -> Result<Self, AppError> {
    Self::with_base_url(TIKTOK_ROOM_URL, username)
  }

  pub fn with_base_url(base_url: &str, username: &str) -> Result<Self, AppError> {
    let mut url = Url::parse(base_url)?;

    url
      .query_pairs_mut()
      .append_pair("aid", "1988")
      .append_pair("sourceType", "54")
      .append_pair("uniqueId", username);

    Ok(Self {
      client: http_client(HTTP_REQUEST_TIMEOUT)?,
      url,
    })
  }
}

impl StatusEndpoint for TikTokLiveEndpoint {
  type Observation = LivestreamObservation;

  async fn fetch(&self) -> Result<LivestreamObservation, AppError> {
    let response_value = get_json(self.client.get(self.url.clone()), "tiktok live status").await?;

    parse_tiktok_room(&response_value)
  }
}

/// Reads `data.liveRoom.status` and `data.liveRoom.startTime`.
///
/// The endpoint can't tell when a stream ended, only that one is running.
pub fn parse_tiktok_room(response_value: &Value) -> Result<LivestreamObservation, AppError> {
  let live_room = response_value.pointer("/data/liveRoom");
  let Some(status) = live_room
    .and_then(|live_room| live_room.get("status"))
    .and_then(Value::as_i64)
  else {
    return Ok(LivestreamObservation::NotLive);
  };

  if status == TIKTOK_NOT_LIVE_STATUS {
    return Ok(LivestreamObservation::NotLive);
  }

  let Some(start_time) = live_room
    .and_then(|live_room| live_room.get("startTime"))
    .and_then(Value::as_i64)
  else {
    return Err(AppError::UnknownResponseBody {
      location: "tiktok live room start time",
      response: response_value.to_string(),
    });
  };

  Ok(LivestreamObservation::Live { start_time })
}
