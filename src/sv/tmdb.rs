//! TMDB film search used when building a challenge

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const BASE_URL: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Movie {
  pub id: i64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub poster_path: Option<String>,
  #[serde(default)]
  pub release_date: String,
}

impl Movie {
  pub fn poster_url(&self) -> Option<String> {
    self.poster_path.as_ref().map(|path| format!("{IMAGE_BASE_URL}{path}"))
  }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  results: Vec<Movie>,
}

#[derive(Debug, Clone)]
pub struct Tmdb {
  client: Client,
  base_url: String,
  api_key: String,
  language: String,
}

impl Tmdb {
  pub fn new(
    api_key: impl Into<String>,
    language: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;

    Ok(Self {
      client,
      base_url: BASE_URL.to_string(),
      api_key: api_key.into(),
      language: language.into(),
    })
  }

  #[allow(dead_code)]
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// First result page for `query`. A blank query makes no request.
  pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
    let query = query.trim();
    if query.is_empty() {
      return Ok(Vec::new());
    }

    let url = format!("{}/search/movie", self.base_url);
    let response: SearchResponse = self
      .client
      .get(&url)
      .query(&[
        ("api_key", self.api_key.as_str()),
        ("language", self.language.as_str()),
        ("query", query),
        ("page", "1"),
      ])
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    debug!("TMDB search `{query}` returned {} movies", response.results.len());
    Ok(response.results)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_search_page() {
    let body = r#"{
      "page": 1,
      "results": [
        {"id": 120, "title": "The Fellowship of the Ring",
         "poster_path": "/6oom5QYQ2yQTMJIbnvbkBL9cHo6.jpg",
         "release_date": "2001-12-18", "vote_average": 8.4},
        {"id": 9999, "title": "Unreleased", "poster_path": null}
      ]
    }"#;

    let page: SearchResponse = json::from_str(body).unwrap();

    assert_eq!(page.results.len(), 2);
    assert_eq!(
      page.results[0].poster_url().as_deref(),
      Some("https://image.tmdb.org/t/p/w500/6oom5QYQ2yQTMJIbnvbkBL9cHo6.jpg")
    );
    assert_eq!(page.results[1].poster_url(), None);
    assert_eq!(page.results[1].release_date, "");
  }

  #[test]
  fn missing_results_is_empty() {
    let page: SearchResponse = json::from_str(r#"{"page": 1}"#).unwrap();
    assert!(page.results.is_empty());
  }

  #[tokio::test]
  async fn blank_query_skips_request() {
    // unroutable base url: any request would fail
    let tmdb = Tmdb::new("key", "es-ES", Duration::from_millis(50))
      .unwrap()
      .with_base_url("http://127.0.0.1:9");

    assert!(tmdb.search("   ").await.unwrap().is_empty());
  }
}
