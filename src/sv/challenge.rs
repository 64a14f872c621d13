use serde::Deserialize;

use crate::{entity::challenge, prelude::*, sv};

/// Which challenges to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  All,
  Ids(Vec<i32>),
  CreatedBy(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChallenge {
  pub name: String,
  pub description: String,
  #[serde(default)]
  pub image: Option<String>,
  pub tmdb_movie_ids: Vec<i64>,
}

impl NewChallenge {
  #[allow(dead_code)]
  pub fn new(
    name: impl Into<String>,
    description: impl Into<String>,
    tmdb_movie_ids: Vec<i64>,
  ) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
      image: None,
      tmdb_movie_ids,
    }
  }
}

pub struct Challenge<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Challenge<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    user_id: &str,
    new: NewChallenge,
  ) -> Result<challenge::Model> {
    let name = utils::trimmed(&new.name).ok_or(Invalid::Name)?;
    let description =
      utils::trimmed(&new.description).ok_or(Invalid::Description)?;

    let movies = utils::dedup_ids(new.tmdb_movie_ids);
    if movies.is_empty() {
      return Err(Invalid::NoMovies.into());
    }

    // ensure exists
    sv::Profile::new(self.db).get_or_create(user_id).await?;

    let now = Utc::now().naive_utc();
    let challenge = challenge::ActiveModel {
      id: NotSet,
      name: Set(name),
      description: Set(description),
      image: Set(new.image.as_deref().and_then(utils::trimmed)),
      number_films: Set(movies.len() as i32),
      tmdb_movie_ids: Set(Some(json::json!(movies))),
      user_id: Set(Some(user_id.to_string())),
      created_at: Set(now),
    };

    let challenge = challenge.insert(self.db).await?;
    info!(
      "Challenge #{} `{}` created by {user_id} with {} films",
      challenge.id, challenge.name, challenge.number_films
    );
    Ok(challenge)
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<challenge::Model>> {
    Ok(challenge::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn get(&self, id: i32) -> Result<challenge::Model> {
    self.by_id(id).await?.ok_or(Error::ChallengeNotFound)
  }

  pub async fn list(&self, filter: Filter) -> Result<Vec<challenge::Model>> {
    let query = match filter {
      Filter::All => challenge::Entity::find(),
      Filter::Ids(ids) if ids.is_empty() => return Ok(Vec::new()),
      Filter::Ids(ids) => {
        challenge::Entity::find().filter(challenge::Column::Id.is_in(ids))
      }
      Filter::CreatedBy(user_id) => challenge::Entity::find()
        .filter(challenge::Column::UserId.eq(user_id)),
    };

    Ok(query.order_by_asc(challenge::Column::Id).all(self.db).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::testing::setup_test_db;

  #[tokio::test]
  async fn test_create_challenge() {
    let db = setup_test_db().await;

    let challenge = Challenge::new(&db)
      .create(
        "u1",
        NewChallenge::new(" Harry Potter ", "All eight", vec![671, 672, 671]),
      )
      .await
      .unwrap();

    assert_eq!(challenge.name, "Harry Potter");
    assert_eq!(challenge.number_films, 2);
    assert_eq!(challenge.movie_ids(), vec![671, 672]);
    assert_eq!(challenge.user_id.as_deref(), Some("u1"));
  }

  #[tokio::test]
  async fn test_create_requires_fields() {
    let db = setup_test_db().await;
    let sv = Challenge::new(&db);

    let cases = [
      (NewChallenge::new("", "desc", vec![1]), Invalid::Name),
      (NewChallenge::new("name", "  ", vec![1]), Invalid::Description),
      (NewChallenge::new("name", "desc", vec![]), Invalid::NoMovies),
    ];

    for (new, expected) in cases {
      match sv.create("u1", new).await {
        Err(Error::Invalid(invalid)) => assert_eq!(invalid, expected),
        other => panic!("expected {expected:?}, got {other:?}"),
      }
    }
  }

  #[tokio::test]
  async fn test_list_filters() {
    let db = setup_test_db().await;
    let sv = Challenge::new(&db);

    let a = sv.create("u1", NewChallenge::new("A", "a", vec![1])).await.unwrap();
    let b = sv.create("u2", NewChallenge::new("B", "b", vec![2])).await.unwrap();

    assert_eq!(sv.list(Filter::All).await.unwrap().len(), 2);

    let by_ids = sv.list(Filter::Ids(vec![b.id, 999])).await.unwrap();
    assert_eq!(by_ids, vec![b.clone()]);

    let mine = sv.list(Filter::CreatedBy("u1".into())).await.unwrap();
    assert_eq!(mine, vec![a]);

    assert!(sv.list(Filter::Ids(vec![])).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_get_missing() {
    let db = setup_test_db().await;
    assert!(matches!(
      Challenge::new(&db).get(42).await,
      Err(Error::ChallengeNotFound)
    ));
  }
}
