use sea_orm_migration::prelude::*;

use super::{
  m20250412_000001_create_profiles::Profiles,
  m20250412_000002_create_challenges::Challenges,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(UserChallenges::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(UserChallenges::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(UserChallenges::UserId).string().not_null())
          .col(ColumnDef::new(UserChallenges::ChallengeId).integer().not_null())
          .col(ColumnDef::new(UserChallenges::WatchedCount).integer().null())
          .col(ColumnDef::new(UserChallenges::StartedAt).date_time().not_null())
          .col(ColumnDef::new(UserChallenges::EndedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_challenges_profile")
              .from(UserChallenges::Table, UserChallenges::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_challenges_challenge")
              .from(UserChallenges::Table, UserChallenges::ChallengeId)
              .to(Challenges::Table, Challenges::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_user_challenges_enrollment")
          .table(UserChallenges::Table)
          .col(UserChallenges::UserId)
          .col(UserChallenges::ChallengeId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(UserChallenges::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum UserChallenges {
  Table,
  Id,
  UserId,
  ChallengeId,
  WatchedCount,
  StartedAt,
  EndedAt,
}
