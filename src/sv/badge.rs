use serde::Serialize;

use crate::sv::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
  NewbieViewer,
  SeventhArtLover,
  AspiringCinephile,
  SupportingActor,
}

impl Badge {
  pub const ALL: [Badge; 4] = [
    Badge::NewbieViewer,
    Badge::SeventhArtLover,
    Badge::AspiringCinephile,
    Badge::SupportingActor,
  ];

  pub fn title(self) -> &'static str {
    match self {
      Badge::NewbieViewer => "Newbie Viewer",
      Badge::SeventhArtLover => "Lover of the Seventh Art",
      Badge::AspiringCinephile => "Aspiring Cinephile",
      Badge::SupportingActor => "Supporting Actor",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Badge::NewbieViewer => "Watching your first film",
      Badge::SeventhArtLover => "Watching +10 films",
      Badge::AspiringCinephile => "Completing your first challenge",
      Badge::SupportingActor => "Completing +5 challenges",
    }
  }

  fn is_earned(self, films: u32, completed: usize) -> bool {
    match self {
      Badge::NewbieViewer => films >= 1,
      Badge::SeventhArtLover => films >= 10,
      Badge::AspiringCinephile => completed >= 1,
      Badge::SupportingActor => completed >= 5,
    }
  }
}

pub fn earned(progress: &Progress) -> Vec<Badge> {
  let films = progress.films_watched();
  let completed = progress.completed.len();

  Badge::ALL
    .into_iter()
    .filter(|badge| badge.is_earned(films, completed))
    .collect()
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use chrono::NaiveDateTime;

  use super::*;
  use crate::{
    entity::{challenge, user_challenge},
    sv::progress::partition,
  };

  fn progress(watched: &[(i32, i32)]) -> Progress {
    let now = NaiveDateTime::default();
    let mut enrollments = Vec::new();
    let mut challenges = Vec::new();

    for (id, &(required, count)) in (1..).zip(watched) {
      challenges.push(challenge::Model {
        id,
        name: format!("#{id}"),
        description: String::new(),
        image: None,
        number_films: required,
        tmdb_movie_ids: None,
        user_id: None,
        created_at: now,
      });
      enrollments.push(user_challenge::Model {
        id,
        user_id: "u1".into(),
        challenge_id: id,
        watched_count: Some(count),
        started_at: now,
        ended_at: None,
      });
    }

    partition(enrollments, challenges, &HashMap::new())
  }

  #[test]
  fn nothing_watched_earns_nothing() {
    assert!(earned(&progress(&[(3, 0)])).is_empty());
  }

  #[test]
  fn first_film_and_first_challenge() {
    assert_eq!(earned(&progress(&[(5, 1)])), vec![Badge::NewbieViewer]);
    assert_eq!(earned(&progress(&[(1, 1)])), vec![
      Badge::NewbieViewer,
      Badge::AspiringCinephile
    ]);
  }

  #[test]
  fn thresholds_count_across_challenges() {
    let badges = earned(&progress(&[
      (2, 2),
      (2, 2),
      (2, 2),
      (2, 2),
      (2, 2),
      (20, 0),
    ]));

    assert_eq!(badges, Badge::ALL.to_vec());
  }
}
