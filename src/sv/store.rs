//! Data access used by progress aggregation
//!
//! [`Gateway`] is the narrow surface the aggregator depends on; [`Store`]
//! backs it with the database.

use crate::{
  entity::{challenge, profile, user_challenge, watched_movie},
  prelude::*,
  sv::{self, challenge::Filter},
};

#[async_trait]
pub trait Gateway: Send + Sync {
  async fn user_challenges(
    &self,
    user_id: &str,
  ) -> Result<Vec<user_challenge::Model>>;

  async fn challenges(&self, filter: Filter) -> Result<Vec<challenge::Model>>;

  async fn count_watched(&self, user_id: &str, challenge_id: i32) -> Result<u64>;

  async fn write_xp(&self, user_id: &str, xp: i64) -> Result<()>;
}

pub struct Store<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Store<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }
}

#[async_trait]
impl Gateway for Store<'_> {
  async fn user_challenges(
    &self,
    user_id: &str,
  ) -> Result<Vec<user_challenge::Model>> {
    sv::Enrollment::new(self.db).by_user(user_id).await
  }

  async fn challenges(&self, filter: Filter) -> Result<Vec<challenge::Model>> {
    sv::Challenge::new(self.db).list(filter).await
  }

  async fn count_watched(&self, user_id: &str, challenge_id: i32) -> Result<u64> {
    let count = watched_movie::Entity::find()
      .filter(watched_movie::Column::UserId.eq(user_id))
      .filter(watched_movie::Column::ChallengeId.eq(challenge_id))
      .count(self.db)
      .await?;
    Ok(count)
  }

  async fn write_xp(&self, user_id: &str, xp: i64) -> Result<()> {
    use sea_orm::sea_query::Expr;

    let updated = profile::Entity::update_many()
      .col_expr(profile::Column::Xp, Expr::value(xp))
      .filter(profile::Column::Id.eq(user_id))
      .exec(self.db)
      .await?;

    if updated.rows_affected == 0 {
      return Err(Error::ProfileNotFound);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    Challenge, Enrollment, Profile, Watched, challenge::NewChallenge,
    testing::setup_test_db,
  };

  #[tokio::test]
  async fn test_count_watched() {
    let db = setup_test_db().await;
    let id = Challenge::new(&db)
      .create("u1", NewChallenge::new("Pixar", "Toys", vec![862, 863, 10193]))
      .await
      .unwrap()
      .id;
    Enrollment::new(&db).join("u1", id).await.unwrap();
    Watched::new(&db).toggle("u1", id, 862).await.unwrap();
    Watched::new(&db).toggle("u1", id, 863).await.unwrap();

    let store = Store::new(&db);
    assert_eq!(store.count_watched("u1", id).await.unwrap(), 2);
    assert_eq!(store.count_watched("u2", id).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_write_xp() {
    let db = setup_test_db().await;
    Profile::new(&db).get_or_create("u1").await.unwrap();

    let store = Store::new(&db);
    store.write_xp("u1", 13).await.unwrap();

    let profile = Profile::new(&db).by_id("u1").await.unwrap().unwrap();
    assert_eq!(profile.xp, 13);

    assert!(matches!(
      store.write_xp("ghost", 1).await,
      Err(Error::ProfileNotFound)
    ));
  }
}
