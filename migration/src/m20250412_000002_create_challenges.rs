use sea_orm_migration::prelude::*;

use super::m20250412_000001_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Challenges::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Challenges::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Challenges::Name).string().not_null())
          .col(ColumnDef::new(Challenges::Description).string().not_null())
          .col(ColumnDef::new(Challenges::Image).string().null())
          .col(
            ColumnDef::new(Challenges::NumberFilms)
              .integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Challenges::TmdbMovieIds).json().null())
          .col(ColumnDef::new(Challenges::UserId).string().null())
          .col(ColumnDef::new(Challenges::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_challenges_creator")
              .from(Challenges::Table, Challenges::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_challenges_creator")
          .table(Challenges::Table)
          .col(Challenges::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Challenges::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Challenges {
  Table,
  Id,
  Name,
  Description,
  Image,
  NumberFilms,
  TmdbMovieIds,
  UserId,
  CreatedAt,
}
