//! SeaORM entity definitions
//!
//! Tables are created by the `migration` crate; these mirror its schema.

pub mod challenge;
pub mod profile;
pub mod user_challenge;
pub mod watched_movie;
