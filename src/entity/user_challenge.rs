//! Enrollment of a user in a challenge

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{challenge, profile};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_challenges")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: String,
  pub challenge_id: i32,
  /// Stored watched counter. `None` means no counter was kept and the
  /// watched rows have to be counted.
  pub watched_count: Option<i32>,
  pub started_at: DateTime,
  pub ended_at: Option<DateTime>,
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
