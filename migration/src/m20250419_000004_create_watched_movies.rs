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
          .table(WatchedMovies::Table)
          .if_not_exists()
          .col(ColumnDef::new(WatchedMovies::UserId).string().not_null())
          .col(ColumnDef::new(WatchedMovies::ChallengeId).integer().not_null())
          .col(ColumnDef::new(WatchedMovies::TmdbId).big_integer().not_null())
          .col(ColumnDef::new(WatchedMovies::WatchedAt).date_time().not_null())
          .primary_key(
            Index::create()
              .col(WatchedMovies::UserId)
              .col(WatchedMovies::ChallengeId)
              .col(WatchedMovies::TmdbId),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_watched_movies_profile")
              .from(WatchedMovies::Table, WatchedMovies::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_watched_movies_challenge")
              .from(WatchedMovies::Table, WatchedMovies::ChallengeId)
              .to(Challenges::Table, Challenges::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(WatchedMovies::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum WatchedMovies {
  Table,
  UserId,
  ChallengeId,
  TmdbId,
  WatchedAt,
}
