pub use sea_orm_migration::prelude::*;

mod m20250412_000001_create_profiles;
mod m20250412_000002_create_challenges;
mod m20250412_000003_create_user_challenges;
mod m20250419_000004_create_watched_movies;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20250412_000001_create_profiles::Migration),
      Box::new(m20250412_000002_create_challenges::Migration),
      Box::new(m20250412_000003_create_user_challenges::Migration),
      Box::new(m20250419_000004_create_watched_movies::Migration),
    ]
  }
}
