//! Explicit session context
//!
//! Services never look up "the current user" themselves; callers pass a
//! [`Session`] built at the edge (the HTTP extractor, or a test).

use crate::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
  user_id: Option<String>,
}

impl Session {
  pub fn anonymous() -> Self {
    Self { user_id: None }
  }

  pub fn user(user_id: impl Into<String>) -> Self {
    let user_id = user_id.into();
    let user_id = user_id.trim();

    if user_id.is_empty() {
      Self::anonymous()
    } else {
      Self { user_id: Some(user_id.to_string()) }
    }
  }

  pub fn user_id(&self) -> Option<&str> {
    self.user_id.as_deref()
  }

  pub fn require(&self) -> Result<&str> {
    self.user_id().ok_or(Error::Unauthorized)
  }
}
