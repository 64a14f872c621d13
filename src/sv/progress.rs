//! Challenge progress aggregation
//!
//! Joins a user's enrollments with their challenges and watched counts,
//! splits them into current and completed challenges and derives the XP
//! total. [`compute`] only reads; storing the XP is the separate
//! [`persist_xp`] step.

use std::{
  collections::HashSet,
  fmt,
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use futures::future::join_all;
use serde::Serialize;

use crate::{
  entity::{challenge, user_challenge},
  prelude::*,
  session::Session,
  sv::{challenge::Filter, store::Gateway},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
  pub enrollment_id: i32,
  pub challenge: challenge::Model,
  pub watched: u32,
  pub started_at: DateTime,
  pub ended_at: Option<DateTime>,
}

impl Entry {
  pub fn required(&self) -> u32 {
    self.challenge.required()
  }

  pub fn is_complete(&self) -> bool {
    self.watched >= self.required()
  }

  pub fn percent(&self) -> u8 {
    utils::percent(self.watched, self.required())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Progress {
  pub current: Vec<Entry>,
  pub completed: Vec<Entry>,
  pub xp: i64,
  /// Some watched counts could not be read and were taken as zero.
  pub partial: bool,
}

impl Progress {
  pub fn entries(&self) -> impl Iterator<Item = &Entry> {
    self.current.iter().chain(&self.completed)
  }

  pub fn films_watched(&self) -> u32 {
    self.entries().map(|entry| entry.watched).sum()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
  Enrollments,
  Challenges,
}

impl fmt::Display for Fetch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Fetch::Enrollments => f.write_str("enrollments"),
      Fetch::Challenges => f.write_str("challenges"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{fetch} fetch failed: {reason}")]
pub struct Unavailable {
  pub fetch: Fetch,
  pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
  Ready(Progress),
  /// Backing data could not be read. Never reported as an empty progress.
  Unavailable(Unavailable),
  /// A newer refresh for the same user started before this one finished.
  Superseded,
}

/// Pure join of the three record sets.
///
/// Enrollments whose challenge is missing are skipped. The stored counter
/// wins over `counts`; an enrollment with neither reads as zero.
pub fn partition(
  enrollments: Vec<user_challenge::Model>,
  challenges: Vec<challenge::Model>,
  counts: &HashMap<i32, u32>,
) -> Progress {
  let index: HashMap<i32, challenge::Model> =
    challenges.into_iter().map(|challenge| (challenge.id, challenge)).collect();

  let mut progress = Progress::default();

  for enrollment in enrollments {
    let Some(challenge) = index.get(&enrollment.challenge_id) else {
      debug!(
        "Skipping enrollment #{}: challenge #{} is gone",
        enrollment.id, enrollment.challenge_id
      );
      continue;
    };

    let watched = match enrollment.watched_count {
      Some(count) => count.max(0) as u32,
      None => counts.get(&enrollment.challenge_id).copied().unwrap_or(0),
    };

    let entry = Entry {
      enrollment_id: enrollment.id,
      challenge: challenge.clone(),
      watched,
      started_at: enrollment.started_at,
      ended_at: enrollment.ended_at,
    };

    if entry.is_complete() {
      progress.xp += i64::from(entry.required());
      progress.completed.push(entry);
    } else {
      progress.current.push(entry);
    }
  }

  progress
}

async fn fetch<T>(
  what: Fetch,
  timeout: Duration,
  request: impl Future<Output = Result<T>>,
) -> Result<T, Unavailable> {
  let reason = match time::timeout(timeout, request).await {
    Ok(Ok(rows)) => return Ok(rows),
    Ok(Err(err)) => err.to_string(),
    Err(_) => {
      format!("timed out after {}", humantime::format_duration(timeout))
    }
  };

  warn!("Progress {what} fetch failed: {reason}");
  Err(Unavailable { fetch: what, reason })
}

/// Fans out one count per challenge and waits for all of them. A failed
/// count reads as zero and marks the result partial.
async fn count_watched<G>(
  gateway: &G,
  user_id: &str,
  challenge_ids: &[i32],
  timeout: Duration,
) -> (HashMap<i32, u32>, bool)
where
  G: Gateway + ?Sized,
{
  let requests = challenge_ids.iter().map(|&id| async move {
    (id, time::timeout(timeout, gateway.count_watched(user_id, id)).await)
  });

  let mut partial = false;
  let counts = join_all(requests)
    .await
    .into_iter()
    .map(|(id, result)| {
      let count = match result {
        Ok(Ok(count)) => u32::try_from(count).unwrap_or(u32::MAX),
        Ok(Err(err)) => {
          warn!("Watched count for #{id} failed, using 0: {err}");
          partial = true;
          0
        }
        Err(_) => {
          warn!("Watched count for #{id} timed out, using 0");
          partial = true;
          0
        }
      };
      (id, count)
    })
    .collect();

  (counts, partial)
}

pub async fn compute<G>(
  gateway: &G,
  session: &Session,
  timeout: Duration,
) -> Report
where
  G: Gateway + ?Sized,
{
  let Some(user_id) = session.user_id() else {
    return Report::Ready(Progress::default());
  };

  let enrollments = match fetch(
    Fetch::Enrollments,
    timeout,
    gateway.user_challenges(user_id),
  )
  .await
  {
    Ok(rows) => rows,
    Err(unavailable) => return Report::Unavailable(unavailable),
  };

  if enrollments.is_empty() {
    return Report::Ready(Progress::default());
  }

  let mut ids: Vec<i32> = enrollments.iter().map(|e| e.challenge_id).collect();
  ids.sort_unstable();
  ids.dedup();

  let challenges =
    match fetch(Fetch::Challenges, timeout, gateway.challenges(Filter::Ids(ids)))
      .await
    {
      Ok(rows) => rows,
      Err(unavailable) => return Report::Unavailable(unavailable),
    };

  let known: HashSet<i32> = challenges.iter().map(|c| c.id).collect();
  let mut uncounted: Vec<i32> = enrollments
    .iter()
    .filter(|e| e.watched_count.is_none() && known.contains(&e.challenge_id))
    .map(|e| e.challenge_id)
    .collect();
  uncounted.sort_unstable();
  uncounted.dedup();

  let (counts, partial) =
    count_watched(gateway, user_id, &uncounted, timeout).await;

  let mut progress = partition(enrollments, challenges, &counts);
  progress.partial = partial;

  debug!(
    "Progress for {user_id}: {} current, {} completed, {} xp",
    progress.current.len(),
    progress.completed.len(),
    progress.xp
  );
  Report::Ready(progress)
}

/// Stores the derived XP. Failures are logged only: the value is
/// recomputed on the next read.
pub async fn persist_xp<G>(gateway: &G, user_id: &str, xp: i64)
where
  G: Gateway + ?Sized,
{
  match gateway.write_xp(user_id, xp).await {
    Ok(()) => debug!("Stored {xp} xp for {user_id}"),
    Err(err) => warn!("Failed to store xp for {user_id}: {err}"),
  }
}

/// Orders detached XP writes per user. A write stamped before the last one
/// stored for that user is dropped, so an older total never lands last.
#[derive(Debug, Clone, Default)]
pub struct XpWriter {
  seq: Arc<AtomicU64>,
  stored: Arc<DashMap<String, Arc<tokio::sync::Mutex<u64>>>>,
}

impl XpWriter {
  pub fn stamp(&self) -> u64 {
    self.seq.fetch_add(1, Ordering::Relaxed) + 1
  }

  pub async fn write<G>(&self, gateway: &G, user_id: &str, xp: i64, stamp: u64)
  where
    G: Gateway + ?Sized,
  {
    let slot = self.stored.entry(user_id.to_string()).or_default().clone();
    let mut last = slot.lock().await;

    if *last > stamp {
      debug!("Dropping stale xp {xp} for {user_id}");
      return;
    }
    persist_xp(gateway, user_id, xp).await;
    *last = stamp;
  }
}

#[derive(Debug)]
pub struct Ticket {
  user_id: String,
  seq: u64,
}

/// Hands out per-user refresh tickets so a slow refresh that was overtaken
/// by a newer one gets discarded instead of overwriting fresher state.
#[derive(Debug, Default)]
pub struct Tracker {
  seq: AtomicU64,
  latest: DashMap<String, u64>,
}

impl Tracker {
  pub fn begin(&self, user_id: &str) -> Ticket {
    let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
    self.latest.insert(user_id.to_string(), seq);
    Ticket { user_id: user_id.to_string(), seq }
  }

  pub fn is_current(&self, ticket: &Ticket) -> bool {
    self.latest.get(&ticket.user_id).is_some_and(|seq| *seq == ticket.seq)
  }

  fn finish(&self, ticket: &Ticket) {
    self.latest.remove_if(&ticket.user_id, |_, seq| *seq == ticket.seq);
  }

  pub async fn refresh<G>(
    &self,
    gateway: &G,
    session: &Session,
    timeout: Duration,
  ) -> Report
  where
    G: Gateway + ?Sized,
  {
    let Some(user_id) = session.user_id() else {
      return compute(gateway, session, timeout).await;
    };

    let ticket = self.begin(user_id);
    let report = compute(gateway, session, timeout).await;
    let current = self.is_current(&ticket);
    self.finish(&ticket);

    if current {
      report
    } else {
      debug!("Discarding superseded progress for {user_id}");
      Report::Superseded
    }
  }
}
