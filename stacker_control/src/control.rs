//! Feedback primitives: PID step, loops, settling and the drive link.

pub mod feedback;
pub mod link;
pub mod pid;
pub mod settle;

pub use feedback::{FeedbackLoop, Sink, Source};
pub use link::{ArcadeCommand, LinkMode, MutualExclusionLink};
pub use settle::{SettleCriteria, SettleTracker};
