use sea_orm::SqlErr;

use crate::{
  entity::{user_challenge, watched_movie},
  prelude::*,
  sv,
};

pub struct Enrollment<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Enrollment<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn find(
    &self,
    user_id: &str,
    challenge_id: i32,
  ) -> Result<Option<user_challenge::Model>> {
    let enrollment = user_challenge::Entity::find()
      .filter(user_challenge::Column::UserId.eq(user_id))
      .filter(user_challenge::Column::ChallengeId.eq(challenge_id))
      .one(self.db)
      .await?;
    Ok(enrollment)
  }

  pub async fn by_user(
    &self,
    user_id: &str,
  ) -> Result<Vec<user_challenge::Model>> {
    let enrollments = user_challenge::Entity::find()
      .filter(user_challenge::Column::UserId.eq(user_id))
      .order_by_asc(user_challenge::Column::StartedAt)
      .order_by_asc(user_challenge::Column::Id)
      .all(self.db)
      .await?;
    Ok(enrollments)
  }

  pub async fn join(
    &self,
    user_id: &str,
    challenge_id: i32,
  ) -> Result<user_challenge::Model> {
    sv::Challenge::new(self.db).get(challenge_id).await?;
    sv::Profile::new(self.db).get_or_create(user_id).await?;

    if self.find(user_id, challenge_id).await?.is_some() {
      return Err(Error::AlreadyEnrolled);
    }

    let now = Utc::now().naive_utc();
    let enrollment = user_challenge::ActiveModel {
      id: NotSet,
      user_id: Set(user_id.to_string()),
      challenge_id: Set(challenge_id),
      watched_count: Set(Some(0)),
      started_at: Set(now),
      ended_at: Set(None),
    };

    // the unique index settles two joins racing past the check above
    let enrollment = match enrollment.insert(self.db).await {
      Ok(enrollment) => enrollment,
      Err(err) => {
        return Err(match err.sql_err() {
          Some(SqlErr::UniqueConstraintViolation(_)) => Error::AlreadyEnrolled,
          _ => err.into(),
        });
      }
    };
    info!("{user_id} joined challenge #{challenge_id}");
    Ok(enrollment)
  }

  /// Drops the enrollment together with every film marked for it.
  pub async fn leave(&self, user_id: &str, challenge_id: i32) -> Result<()> {
    let txn = self.db.begin().await?;

    let removed = user_challenge::Entity::delete_many()
      .filter(user_challenge::Column::UserId.eq(user_id))
      .filter(user_challenge::Column::ChallengeId.eq(challenge_id))
      .exec(&txn)
      .await?;

    if removed.rows_affected == 0 {
      return Err(Error::NotEnrolled);
    }

    watched_movie::Entity::delete_many()
      .filter(watched_movie::Column::UserId.eq(user_id))
      .filter(watched_movie::Column::ChallengeId.eq(challenge_id))
      .exec(&txn)
      .await?;

    txn.commit().await?;
    info!("{user_id} left challenge #{challenge_id}");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    Challenge, Watched, challenge::NewChallenge, testing::setup_test_db,
  };

  async fn seed(db: &DatabaseConnection) -> i32 {
    Challenge::new(db)
      .create("creator", NewChallenge::new("Oscars", "Best pictures", vec![1, 2]))
      .await
      .unwrap()
      .id
  }

  #[tokio::test]
  async fn test_join_challenge() {
    let db = setup_test_db().await;
    let id = seed(&db).await;

    let enrollment = Enrollment::new(&db).join("u1", id).await.unwrap();

    assert_eq!(enrollment.challenge_id, id);
    assert_eq!(enrollment.watched_count, Some(0));
    assert_eq!(enrollment.ended_at, None);
  }

  #[tokio::test]
  async fn test_join_twice() {
    let db = setup_test_db().await;
    let id = seed(&db).await;
    let sv = Enrollment::new(&db);

    sv.join("u1", id).await.unwrap();
    assert!(matches!(sv.join("u1", id).await, Err(Error::AlreadyEnrolled)));
  }

  #[tokio::test]
  async fn test_join_unknown_challenge() {
    let db = setup_test_db().await;
    assert!(matches!(
      Enrollment::new(&db).join("u1", 404).await,
      Err(Error::ChallengeNotFound)
    ));
  }

  #[tokio::test]
  async fn test_leave_drops_watched() {
    let db = setup_test_db().await;
    let id = seed(&db).await;
    let sv = Enrollment::new(&db);

    sv.join("u1", id).await.unwrap();
    Watched::new(&db).toggle("u1", id, 1).await.unwrap();

    sv.leave("u1", id).await.unwrap();

    assert!(sv.find("u1", id).await.unwrap().is_none());
    assert!(Watched::new(&db).list("u1", id).await.unwrap().is_empty());
    assert!(matches!(sv.leave("u1", id).await, Err(Error::NotEnrolled)));
  }
}
