//! Stage progression.
//!
//! A user's stage is derived from three persisted facts and is never stored
//! as truth of its own. The `users.current_stage` column is a cache that the
//! tracker refreshes after every mutation that can move it.

mod models;
mod tracker;

pub use models::{Stage, StageFacts};
pub use tracker::{StageInfo, StageTracker};
