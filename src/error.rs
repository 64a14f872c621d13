//! Error types for the challenge server

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Catalog error: {0}")]
  Catalog(#[from] reqwest::Error),

  #[error("Movie catalog is not configured")]
  CatalogDisabled,

  #[error("Session has no user")]
  Unauthorized,

  #[error("Profile not found")]
  ProfileNotFound,

  #[error("Challenge not found")]
  ChallengeNotFound,

  #[error("Not enrolled in challenge")]
  NotEnrolled,

  #[error("Already enrolled in challenge")]
  AlreadyEnrolled,

  #[error("Movie is not part of the challenge")]
  MovieNotInChallenge,

  #[error("{0}")]
  Invalid(Invalid),

  #[error("Progress data unavailable: {0}")]
  Unavailable(String),

  #[error("Superseded by a newer request")]
  Superseded,

  #[allow(dead_code)]
  #[error("Internal error: {0}")]
  Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Invalid {
  #[error("Challenge name is required")]
  Name,
  #[error("Challenge description is required")]
  Description,
  #[error("At least one movie is required")]
  NoMovies,
  #[error("Username must not be empty")]
  Username,
  #[error("Picture url must not be empty")]
  Picture,
}

impl From<Invalid> for Error {
  fn from(invalid: Invalid) -> Self {
    Error::Invalid(invalid)
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Database(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      Error::Catalog(_) => StatusCode::BAD_GATEWAY,
      Error::CatalogDisabled | Error::Unavailable(_) => {
        StatusCode::SERVICE_UNAVAILABLE
      }
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::ProfileNotFound
      | Error::ChallengeNotFound
      | Error::NotEnrolled => StatusCode::NOT_FOUND,
      Error::AlreadyEnrolled | Error::Superseded => StatusCode::CONFLICT,
      Error::MovieNotInChallenge | Error::Invalid(_) => StatusCode::BAD_REQUEST,
    };

    // don't leak driver details
    let message = match &self {
      Error::Database(err) => {
        tracing::error!("Database error: {err}");
        "Database error".to_string()
      }
      Error::Catalog(err) => {
        tracing::warn!("Catalog request failed: {err}");
        "Movie catalog request failed".to_string()
      }
      other => other.to_string(),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes() {
    let cases = [
      (Error::Unauthorized, StatusCode::UNAUTHORIZED),
      (Error::ChallengeNotFound, StatusCode::NOT_FOUND),
      (Error::AlreadyEnrolled, StatusCode::CONFLICT),
      (Error::Superseded, StatusCode::CONFLICT),
      (Invalid::NoMovies.into(), StatusCode::BAD_REQUEST),
      (Error::Unavailable("timeout".into()), StatusCode::SERVICE_UNAVAILABLE),
    ];

    for (err, status) in cases {
      assert_eq!(err.into_response().status(), status);
    }
  }

  #[test]
  fn invalid_message_is_flat() {
    let err: Error = Invalid::Username.into();
    assert_eq!(err.to_string(), "Username must not be empty");
  }
}
