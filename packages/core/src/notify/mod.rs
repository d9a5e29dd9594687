//! Slack notifications for newly available locations.

pub mod compose;
pub mod slack;
pub mod timestamp;

pub use compose::{compose, Block, SlackMessage};
pub use slack::{Notifier, SlackNotifier};
pub use timestamp::LocalClock;
