use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::session::Session;

pub const USER_HEADER: &str = "x-user-id";

/// Identity is asserted by the auth proxy in front of the server.
impl<S: Send + Sync> FromRequestParts<S> for Session {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let session = parts
      .headers
      .get(USER_HEADER)
      .and_then(|value| value.to_str().ok())
      .map(Session::user)
      .unwrap_or_default();
    Ok(session)
  }
}
