mod matchmaker;
mod reaper;

pub use matchmaker::{MatchRequest, Matchmaker};
pub use reaper::Reaper;
