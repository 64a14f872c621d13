use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{profile, user_challenge};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challenges")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub description: String,
  pub image: Option<String>,
  /// Films required to finish the challenge
  pub number_films: i32,
  /// json array of TMDB ids, absent for pre-seeded challenges
  pub tmdb_movie_ids: Option<Json>,
  /// Creator, absent for pre-seeded challenges
  pub user_id: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::UserId",
    to = "profile::Column::Id",
    on_delete = "SetNull"
  )]
  Creator,
  #[sea_orm(has_many = "user_challenge::Entity")]
  UserChallenges,
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Creator.def()
  }
}

impl Related<user_challenge::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::UserChallenges.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
  pub fn required(&self) -> u32 {
    self.number_films.max(0) as u32
  }

  pub fn movie_ids(&self) -> Vec<i64> {
    film_ids(self.tmdb_movie_ids.as_ref())
  }

  /// Challenges without a film list accept any film.
  pub fn accepts_movie(&self, tmdb_id: i64) -> bool {
    match self.tmdb_movie_ids {
      Some(_) => self.movie_ids().contains(&tmdb_id),
      None => true,
    }
  }
}

pub(crate) fn film_ids(value: Option<&Json>) -> Vec<i64> {
  value.and_then(|v| json::from_value(v.clone()).ok()).unwrap_or_default()
}
