use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Profiles::Table)
          .if_not_exists()
          .col(ColumnDef::new(Profiles::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Profiles::Username).string().null())
          .col(ColumnDef::new(Profiles::ProfilePicture).string().null())
          .col(ColumnDef::new(Profiles::HeaderPicture).string().null())
          .col(
            ColumnDef::new(Profiles::Xp).big_integer().not_null().default(0),
          )
          .col(ColumnDef::new(Profiles::FavoriteFilms).json().null())
          .col(ColumnDef::new(Profiles::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Profiles {
  Table,
  Id,
  Username,
  ProfilePicture,
  HeaderPicture,
  Xp,
  FavoriteFilms,
  CreatedAt,
}
