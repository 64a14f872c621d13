use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{challenge, profile};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watched_movies")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub user_id: String,
  #[sea_orm(primary_key, auto_increment = false)]
  pub challenge_id: i32,
  #[sea_orm(primary_key, auto_increment = false)]
  pub tmdb_id: i64,
  pub watched_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::UserId",
    to = "profile::Column::Id",
    on_delete = "Cascade"
  )]
  Profile,
  #[sea_orm(
    belongs_to = "challenge::Entity",
    from = "Column::ChallengeId",
    to = "challenge::Column::Id",
    on_delete = "Cascade"
  )]
  Challenge,
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl Related<challenge::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Challenge.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
