use migration::Migrator;

use crate::{
  prelude::*,
  session::Session,
  sv::{
    self,
    progress::{Report, Tracker, XpWriter},
  },
};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  /// Upper bound for each read issued while aggregating progress
  pub store_timeout: Duration,
  pub tmdb_api_key: Option<String>,
  pub tmdb_language: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: String::from("sqlite:cinechallenge.db?mode=rwc"),
      port: 3000,
      store_timeout: Duration::from_secs(5),
      tmdb_api_key: None,
      tmdb_language: String::from("es-ES"),
    }
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub fn from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
  ) -> anyhow::Result<Self> {
    let mut config = Self::default();
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var("DATABASE_URL") {
      config.database_url = url;
    }
    if let Some(port) = var("PORT") {
      config.port =
        port.trim().parse().with_context(|| format!("Invalid PORT `{port}`"))?;
    }
    if let Some(timeout) = var("STORE_TIMEOUT") {
      config.store_timeout = humantime::parse_duration(timeout.trim())
        .with_context(|| format!("Invalid STORE_TIMEOUT `{timeout}`"))?;
    }
    if let Some(language) = var("TMDB_LANGUAGE") {
      config.tmdb_language = language;
    }
    config.tmdb_api_key = var("TMDB_API_KEY");

    Ok(config)
  }
}

pub struct Services<'a> {
  pub profile: sv::Profile<'a>,
  pub challenge: sv::Challenge<'a>,
  pub enrollment: sv::Enrollment<'a>,
  pub watched: sv::Watched<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub tmdb: Option<sv::Tmdb>,
  pub tracker: Tracker,
  pub xp: XpWriter,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let tmdb = match &config.tmdb_api_key {
      Some(key) => Some(
        sv::Tmdb::new(key, &config.tmdb_language, config.store_timeout)
          .context("Failed to build TMDB client")?,
      ),
      None => {
        warn!("TMDB_API_KEY not set, movie search disabled");
        None
      }
    };

    Ok(Self {
      db,
      config,
      tmdb,
      tracker: Tracker::default(),
      xp: XpWriter::default(),
    })
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      profile: sv::Profile::new(&self.db),
      challenge: sv::Challenge::new(&self.db),
      enrollment: sv::Enrollment::new(&self.db),
      watched: sv::Watched::new(&self.db),
    }
  }

  pub async fn progress(&self, session: &Session) -> Report {
    let store = sv::Store::new(&self.db);
    self.tracker.refresh(&store, session, self.config.store_timeout).await
  }

  /// Stores the XP in the background; the caller never waits on it.
  /// Writes land in call order per user.
  pub fn persist_xp(&self, user_id: &str, xp: i64) {
    let stamp = self.xp.stamp();
    let writer = self.xp.clone();
    let db = self.db.clone();
    let user_id = user_id.to_string();

    tokio::spawn(async move {
      writer.write(&sv::Store::new(&db), &user_id, xp, stamp).await;
    });
  }

  pub fn tmdb(&self) -> Result<&sv::Tmdb> {
    self.tmdb.as_ref().ok_or(Error::CatalogDisabled)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::challenge::NewChallenge;

  fn lookup(
    vars: &[(&'static str, &'static str)],
  ) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<&str, &str> = vars.iter().copied().collect();
    move |key| vars.get(key).map(|v| v.to_string())
  }

  #[test]
  fn config_defaults() {
    let config = Config::from_lookup(lookup(&[])).unwrap();

    assert_eq!(config.port, 3000);
    assert_eq!(config.store_timeout, Duration::from_secs(5));
    assert_eq!(config.tmdb_language, "es-ES");
    assert!(config.tmdb_api_key.is_none());
  }

  #[test]
  fn config_overrides() {
    let config = Config::from_lookup(lookup(&[
      ("PORT", "8080"),
      ("STORE_TIMEOUT", "1500ms"),
      ("TMDB_API_KEY", "abc"),
      ("TMDB_LANGUAGE", "ca-ES"),
      ("DATABASE_URL", "sqlite::memory:"),
    ]))
    .unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.store_timeout, Duration::from_millis(1500));
    assert_eq!(config.tmdb_api_key.as_deref(), Some("abc"));
    assert_eq!(config.tmdb_language, "ca-ES");
    assert_eq!(config.database_url, "sqlite::memory:");
  }

  #[test]
  fn config_rejects_garbage() {
    assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
    assert!(Config::from_lookup(lookup(&[("STORE_TIMEOUT", "soon")])).is_err());
  }

  #[tokio::test]
  async fn test_migrated_database_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cinechallenge.db");
    let config = Config {
      database_url: format!("sqlite:{}?mode=rwc", path.display()),
      ..Config::default()
    };

    let app = AppState::new(config).await.unwrap();
    assert!(matches!(app.tmdb(), Err(Error::CatalogDisabled)));

    let sv = app.sv();
    let challenge = sv
      .challenge
      .create("u1", NewChallenge::new("Nolan", "Every Nolan film", vec![1, 2]))
      .await
      .unwrap();
    sv.enrollment.join("u1", challenge.id).await.unwrap();
    sv.watched.toggle("u1", challenge.id, 1).await.unwrap();
    sv.watched.toggle("u1", challenge.id, 2).await.unwrap();

    let progress = match app.progress(&Session::user("u1")).await {
      Report::Ready(progress) => progress,
      other => panic!("expected ready progress, got {other:?}"),
    };
    assert_eq!(progress.xp, 2);
    assert_eq!(progress.completed.len(), 1);

    sv::progress::persist_xp(&sv::Store::new(&app.db), "u1", progress.xp)
      .await;
    let profile = sv.profile.by_id("u1").await.unwrap().unwrap();
    assert_eq!(profile.xp, 2);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_concurrent_joins_conflict_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cinechallenge.db");
    let config = Config {
      database_url: format!("sqlite:{}?mode=rwc", path.display()),
      ..Config::default()
    };
    let app = AppState::new(config).await.unwrap();

    let challenge = app
      .sv()
      .challenge
      .create("creator", NewChallenge::new("Kubrick", "All of it", vec![1]))
      .await
      .unwrap();

    for n in 0..10 {
      // fresh user each round: profile creation races as well
      let user = format!("racer{n}");
      let (a, b) = (app.sv(), app.sv());
      let (first, second) = tokio::join!(
        a.enrollment.join(&user, challenge.id),
        b.enrollment.join(&user, challenge.id),
      );

      let mut joined = 0;
      for result in [first, second] {
        match result {
          Ok(_) => joined += 1,
          Err(Error::AlreadyEnrolled) => {}
          Err(err) => panic!("join for {user} failed: {err}"),
        }
      }
      assert_eq!(joined, 1, "{user} enrolled {joined} times");
      assert!(app.sv().profile.by_id(&user).await.unwrap().is_some());
    }
  }
}
