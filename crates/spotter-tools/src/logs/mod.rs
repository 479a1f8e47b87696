//! Queue-write capabilities.
//!
//! These build a [`spotter_core::log_event::LogEvent`], hand it to the
//! [`EventSink`](crate::traits::EventSink), and confirm immediately. The
//! confirmation is independent of eventual persistence: durability is the
//! background worker's problem, never the voice interaction's.

mod log_meal;
mod log_set;

pub use log_meal::LogMealTool;
pub use log_set::LogSetTool;
