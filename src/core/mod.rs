//! Core business logic - framework-agnostic voting operations.
//!
//! Every operation takes the [`crate::context::AppContext`] explicitly and consults
//! the schedule gate before touching storage.

/// Eligibility check
pub mod eligibility;
/// Clock and schedule gate
pub mod schedule;
/// Poll status projection
pub mod status;
/// Tally engine
pub mod tally;
/// The voting transaction
pub mod voting;

pub use eligibility::has_voted;
pub use schedule::{Clock, PollSchedule, SystemClock};
pub use status::{PollStatus, poll_status};
pub use tally::{ResultsView, Tally, tally};
pub use voting::submit_vote;
