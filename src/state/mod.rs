//! State module for tracking poll progress
//!
//! # Components
//!
//! - `SeenSet`: URLs already accounted for downstream during this process lifetime
//! - `PollState`: The poll loop's state machine

mod poll_state;
mod seen_set;

// Re-export main types
pub use poll_state::PollState;
pub use seen_set::SeenSet;
