use serde::Serialize;

use crate::{
  entity::{challenge, user_challenge, watched_movie},
  prelude::*,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
  /// Whether the film is marked watched after the toggle
  pub watched: bool,
  pub watched_count: u32,
  pub completed: bool,
}

pub struct Watched<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Watched<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn list(&self, user_id: &str, challenge_id: i32) -> Result<Vec<i64>> {
    let rows = watched_movie::Entity::find()
      .filter(watched_movie::Column::UserId.eq(user_id))
      .filter(watched_movie::Column::ChallengeId.eq(challenge_id))
      .order_by_asc(watched_movie::Column::WatchedAt)
      .all(self.db)
      .await?;
    Ok(rows.into_iter().map(|row| row.tmdb_id).collect())
  }

  /// Flips the watched mark and re-syncs the enrollment counter from the
  /// watched rows.
  pub async fn toggle(
    &self,
    user_id: &str,
    challenge_id: i32,
    tmdb_id: i64,
  ) -> Result<Toggle> {
    let txn = self.db.begin().await?;

    let challenge = challenge::Entity::find_by_id(challenge_id)
      .one(&txn)
      .await?
      .ok_or(Error::ChallengeNotFound)?;

    if !challenge.accepts_movie(tmdb_id) {
      return Err(Error::MovieNotInChallenge);
    }

    let enrollment = user_challenge::Entity::find()
      .filter(user_challenge::Column::UserId.eq(user_id))
      .filter(user_challenge::Column::ChallengeId.eq(challenge_id))
      .one(&txn)
      .await?
      .ok_or(Error::NotEnrolled)?;

    let now = Utc::now().naive_utc();
    let key = (user_id.to_string(), challenge_id, tmdb_id);

    let watched = match watched_movie::Entity::find_by_id(key).one(&txn).await? {
      Some(row) => {
        row.delete(&txn).await?;
        false
      }
      None => {
        watched_movie::ActiveModel {
          user_id: Set(user_id.to_string()),
          challenge_id: Set(challenge_id),
          tmdb_id: Set(tmdb_id),
          watched_at: Set(now),
        }
        .insert(&txn)
        .await?;
        true
      }
    };

    let count = watched_movie::Entity::find()
      .filter(watched_movie::Column::UserId.eq(user_id))
      .filter(watched_movie::Column::ChallengeId.eq(challenge_id))
      .count(&txn)
      .await? as u32;

    let completed = count >= challenge.required();
    let ended_at = match (completed, enrollment.ended_at) {
      (true, Some(ended)) => Some(ended),
      (true, None) => Some(now),
      (false, _) => None,
    };

    user_challenge::ActiveModel {
      watched_count: Set(Some(count as i32)),
      ended_at: Set(ended_at),
      ..enrollment.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    debug!(
      "{user_id} toggled film {tmdb_id} in #{challenge_id}: {count}/{}",
      challenge.required()
    );
    Ok(Toggle { watched, watched_count: count, completed })
  }
}
