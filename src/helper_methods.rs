use crate::errors::AppError;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

/// Sends a GET request and parses the body as JSON.
///
/// There is no retry. Anything but a 200 is an error so the caller can skip the cycle.
///
/// # Errors
/// - The request couldn't be sent or the body couldn't be read.
/// - The response status wasn't 200.
/// - The body wasn't valid JSON.
pub async fn get_json(request: RequestBuilder, location: &'static str) -> Result<Value, AppError> {
  let response = request.send().await?;
  let status = response.status();

  tracing::debug!("{} HTTP Code: {}", location, status.as_u16());

  if status != StatusCode::OK {
    return Err(AppError::FailedResponse {
      location,
      code: status.as_u16(),
    });
  }

  let response_body = response.text().await?;

  tracing::debug!("{} body: {}", location, response_body);

  serde_json::from_str(&response_body).map_err(Into::into)
}
