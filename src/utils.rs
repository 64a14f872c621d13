/// Completion percentage, capped at 100. Nothing required reads as done.
pub fn percent(watched: u32, required: u32) -> u8 {
  if required == 0 {
    return 100;
  }
  (u64::from(watched) * 100 / u64::from(required)).min(100) as u8
}

pub fn trimmed(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_string())
}

/// Drops repeated ids, keeping first occurrences in order.
pub fn dedup_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
  let mut seen = std::collections::HashSet::new();
  ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
