use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{challenge, profile, user_challenge},
  prelude::*,
  session::Session,
  state::AppState,
  sv::{
    badge::{self, Badge},
    challenge::{Filter, NewChallenge},
    profile::ProfileUpdate,
    progress::{Entry, Report},
    tmdb::Movie,
    watched::Toggle,
  },
};

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
  pub creator: Option<String>,
}

pub async fn list_challenges(
  State(app): State<Arc<AppState>>,
  Query(query): Query<ListQuery>,
) -> Result<Json<Vec<challenge::Model>>> {
  let filter = match query.creator {
    Some(creator) => Filter::CreatedBy(creator),
    None => Filter::All,
  };
  Ok(Json(app.sv().challenge.list(filter).await?))
}

pub async fn create_challenge(
  State(app): State<Arc<AppState>>,
  session: Session,
  Json(req): Json<NewChallenge>,
) -> Result<(StatusCode, Json<challenge::Model>)> {
  let user_id = session.require()?;
  let challenge = app.sv().challenge.create(user_id, req).await?;
  Ok((StatusCode::CREATED, Json(challenge)))
}

pub async fn get_challenge(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i32>,
) -> Result<Json<challenge::Model>> {
  Ok(Json(app.sv().challenge.get(id).await?))
}

pub async fn join(
  State(app): State<Arc<AppState>>,
  session: Session,
  Path(id): Path<i32>,
) -> Result<(StatusCode, Json<user_challenge::Model>)> {
  let enrollment = app.sv().enrollment.join(session.require()?, id).await?;
  Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn leave(
  State(app): State<Arc<AppState>>,
  session: Session,
  Path(id): Path<i32>,
) -> Result<StatusCode> {
  app.sv().enrollment.leave(session.require()?, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

pub async fn watched(
  State(app): State<Arc<AppState>>,
  session: Session,
  Path(id): Path<i32>,
) -> Result<Json<Vec<i64>>> {
  Ok(Json(app.sv().watched.list(session.require()?, id).await?))
}

pub async fn toggle_watched(
  State(app): State<Arc<AppState>>,
  session: Session,
  Path((id, tmdb_id)): Path<(i32, i64)>,
) -> Result<Json<Toggle>> {
  let toggle =
    app.sv().watched.toggle(session.require()?, id, tmdb_id).await?;
  Ok(Json(toggle))
}

#[derive(Debug, Serialize)]
pub struct EntryRes {
  pub challenge_id: i32,
  pub name: String,
  pub image: Option<String>,
  pub watched: u32,
  pub required: u32,
  pub percent: u8,
  pub started_at: DateTime,
  pub ended_at: Option<DateTime>,
}

impl From<&Entry> for EntryRes {
  fn from(entry: &Entry) -> Self {
    Self {
      challenge_id: entry.challenge.id,
      name: entry.challenge.name.clone(),
      image: entry.challenge.image.clone(),
      watched: entry.watched,
      required: entry.required(),
      percent: entry.percent(),
      started_at: entry.started_at,
      ended_at: entry.ended_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct BadgeRes {
  pub id: Badge,
  pub title: &'static str,
  pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProgressRes {
  pub current: Vec<EntryRes>,
  pub completed: Vec<EntryRes>,
  pub xp: i64,
  pub partial: bool,
  pub badges: Vec<BadgeRes>,
}

pub async fn progress(
  State(app): State<Arc<AppState>>,
  session: Session,
) -> Result<Json<ProgressRes>> {
  let progress = match app.progress(&session).await {
    Report::Ready(progress) => progress,
    Report::Unavailable(unavailable) => {
      return Err(Error::Unavailable(unavailable.to_string()));
    }
    Report::Superseded => return Err(Error::Superseded),
  };

  if let Some(user_id) = session.user_id() {
    app.persist_xp(user_id, progress.xp);
  }

  let badges = badge::earned(&progress)
    .into_iter()
    .map(|badge| BadgeRes {
      id: badge,
      title: badge.title(),
      description: badge.description(),
    })
    .collect();

  Ok(Json(ProgressRes {
    current: progress.current.iter().map(EntryRes::from).collect(),
    completed: progress.completed.iter().map(EntryRes::from).collect(),
    xp: progress.xp,
    partial: progress.partial,
    badges,
  }))
}

#[derive(Debug, Serialize)]
pub struct ProfileRes {
  #[serde(flatten)]
  pub profile: profile::Model,
  pub favorite_film_ids: Vec<i64>,
  pub enrolled_challenges: Vec<challenge::Model>,
}

pub async fn get_profile(
  State(app): State<Arc<AppState>>,
  session: Session,
) -> Result<Json<ProfileRes>> {
  let user_id = session.require()?;
  let sv = app.sv();

  let profile = sv.profile.get_or_create(user_id).await?;
  let enrolled_challenges = sv.profile.enrolled_challenges(user_id).await?;

  Ok(Json(ProfileRes {
    favorite_film_ids: profile.favorite_films(),
    profile,
    enrolled_challenges,
  }))
}

pub async fn update_profile(
  State(app): State<Arc<AppState>>,
  session: Session,
  Json(update): Json<ProfileUpdate>,
) -> Result<Json<profile::Model>> {
  let profile = app.sv().profile.update(session.require()?, update).await?;
  Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  pub q: String,
}

#[derive(Debug, Serialize)]
pub struct MovieRes {
  #[serde(flatten)]
  pub movie: Movie,
  pub poster_url: Option<String>,
}

pub async fn search_movies(
  State(app): State<Arc<AppState>>,
  Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<MovieRes>>> {
  let movies = app.tmdb()?.search(&query.q).await?;

  let movies = movies
    .into_iter()
    .map(|movie| MovieRes { poster_url: movie.poster_url(), movie })
    .collect();
  Ok(Json(movies))
}
