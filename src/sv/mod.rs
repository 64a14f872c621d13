pub mod badge;
pub mod challenge;
pub mod enrollment;
pub mod profile;
pub mod progress;
pub mod store;
pub mod tmdb;
pub mod watched;

pub use challenge::Challenge;
pub use enrollment::Enrollment;
pub use profile::Profile;
pub use store::Store;
pub use tmdb::Tmdb;
pub use watched::Watched;

#[cfg(test)]
pub(crate) mod testing {
  use sea_orm::{ConnectOptions, ConnectionTrait, DbBackend, Schema};

  use crate::{entity::*, prelude::*};

  pub async fn setup_test_db() -> DatabaseConnection {
    // one connection, or every pooled connection gets its own database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let stmts = [
      schema.create_table_from_entity(profile::Entity),
      schema.create_table_from_entity(challenge::Entity),
      schema.create_table_from_entity(user_challenge::Entity),
      schema.create_table_from_entity(watched_movie::Entity),
    ];

    for stmt in stmts {
      db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
    }

    db
  }
}
