use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
  /// Opaque user id issued by the auth provider
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub username: Option<String>,
  pub profile_picture: Option<String>,
  pub header_picture: Option<String>,
  /// Derived from completed challenges, rewritten on every progress read
  pub xp: i64,
  /// json array of external film ids
  pub favorite_films: Option<Json>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
  pub fn favorite_films(&self) -> Vec<i64> {
    super::challenge::film_ids(self.favorite_films.as_ref())
  }
}
