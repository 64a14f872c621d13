use sea_orm::sea_query::OnConflict;
use serde::Deserialize;

use crate::{
  entity::{challenge, profile, user_challenge},
  prelude::*,
};

/// Partial profile edit; absent fields stay untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
  pub username: Option<String>,
  pub profile_picture: Option<String>,
  pub header_picture: Option<String>,
  pub favorite_films: Option<Vec<i64>>,
}

pub struct Profile<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Profile<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn get_or_create(&self, user_id: &str) -> Result<profile::Model> {
    if let Some(profile) =
      profile::Entity::find_by_id(user_id).one(self.db).await?
    {
      return Ok(profile);
    }

    let now = Utc::now().naive_utc();
    let profile = profile::ActiveModel {
      id: Set(user_id.to_string()),
      username: Set(None),
      profile_picture: Set(None),
      header_picture: Set(None),
      xp: Set(0),
      favorite_films: Set(None),
      created_at: Set(now),
    };

    // a concurrent request may create the same profile first
    let inserted = profile::Entity::insert(profile)
      .on_conflict(
        OnConflict::column(profile::Column::Id).do_nothing().to_owned(),
      )
      .exec_without_returning(self.db)
      .await?;
    if inserted > 0 {
      debug!("Created profile for {user_id}");
    }

    profile::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)
  }

  #[allow(dead_code)]
  pub async fn by_id(&self, user_id: &str) -> Result<Option<profile::Model>> {
    Ok(profile::Entity::find_by_id(user_id).one(self.db).await?)
  }

  pub async fn update(
    &self,
    user_id: &str,
    update: ProfileUpdate,
  ) -> Result<profile::Model> {
    let profile = self.get_or_create(user_id).await?;
    let mut model: profile::ActiveModel = profile.clone().into();

    if let Some(username) = update.username {
      let username = utils::trimmed(&username).ok_or(Invalid::Username)?;
      model.username = Set(Some(username));
    }
    if let Some(url) = update.profile_picture {
      let url = utils::trimmed(&url).ok_or(Invalid::Picture)?;
      model.profile_picture = Set(Some(url));
    }
    if let Some(url) = update.header_picture {
      let url = utils::trimmed(&url).ok_or(Invalid::Picture)?;
      model.header_picture = Set(Some(url));
    }
    if let Some(films) = update.favorite_films {
      let films = utils::dedup_ids(films);
      model.favorite_films = Set(Some(json::json!(films)));
    }

    if !model.is_changed() {
      return Ok(profile);
    }
    Ok(model.update(self.db).await?)
  }

  /// Every challenge the user is enrolled in, oldest enrollment first.
  /// Finished challenges stay in the list until the user leaves them.
  pub async fn enrolled_challenges(
    &self,
    user_id: &str,
  ) -> Result<Vec<challenge::Model>> {
    let challenges = challenge::Entity::find()
      .inner_join(user_challenge::Entity)
      .filter(user_challenge::Column::UserId.eq(user_id))
      .order_by_asc(user_challenge::Column::StartedAt)
      .order_by_asc(user_challenge::Column::Id)
      .all(self.db)
      .await?;
    Ok(challenges)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    Challenge, Enrollment, Watched, challenge::NewChallenge,
    testing::setup_test_db,
  };

  #[tokio::test]
  async fn test_get_or_create_is_stable() {
    let db = setup_test_db().await;
    let sv = Profile::new(&db);

    let first = sv.get_or_create("u1").await.unwrap();
    let second = sv.get_or_create("u1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.xp, 0);
  }

  #[tokio::test]
  async fn test_update_profile() {
    let db = setup_test_db().await;
    let sv = Profile::new(&db);

    let profile = sv
      .update("u1", ProfileUpdate {
        username: Some("  cinephile ".into()),
        header_picture: Some("headers/header2.jpg".into()),
        favorite_films: Some(vec![550, 13, 550]),
        ..Default::default()
      })
      .await
      .unwrap();

    assert_eq!(profile.username.as_deref(), Some("cinephile"));
    assert_eq!(profile.header_picture.as_deref(), Some("headers/header2.jpg"));
    assert_eq!(profile.profile_picture, None);
    assert_eq!(profile.favorite_films(), vec![550, 13]);
  }

  #[tokio::test]
  async fn test_blank_username_rejected() {
    let db = setup_test_db().await;
    let sv = Profile::new(&db);

    let result = sv
      .update("u1", ProfileUpdate {
        username: Some("   ".into()),
        ..Default::default()
      })
      .await;

    assert!(matches!(result, Err(Error::Invalid(Invalid::Username))));
  }

  #[tokio::test]
  async fn test_enrolled_challenges() {
    let db = setup_test_db().await;

    let challenges = Challenge::new(&db);
    let marvel = challenges
      .create("creator", NewChallenge::new("Marvel", "MCU", vec![1, 2]))
      .await
      .unwrap();
    challenges
      .create("creator", NewChallenge::new("Noir", "Classics", vec![4]))
      .await
      .unwrap();
    let ghibli = challenges
      .create("creator", NewChallenge::new("Ghibli", "Anime", vec![3]))
      .await
      .unwrap();

    Enrollment::new(&db).join("u1", marvel.id).await.unwrap();
    Enrollment::new(&db).join("u1", ghibli.id).await.unwrap();
    Watched::new(&db).toggle("u1", ghibli.id, 3).await.unwrap();

    let enrolled = Profile::new(&db).enrolled_challenges("u1").await.unwrap();
    let ids: Vec<i32> = enrolled.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![marvel.id, ghibli.id]);
  }

  #[tokio::test]
  async fn test_get_or_create_keeps_existing_profile() {
    let db = setup_test_db().await;
    let sv = Profile::new(&db);

    sv.update("u1", ProfileUpdate {
      username: Some("first".into()),
      ..Default::default()
    })
    .await
    .unwrap();

    let profile = sv.get_or_create("u1").await.unwrap();
    assert_eq!(profile.username.as_deref(), Some("first"));
  }
}
