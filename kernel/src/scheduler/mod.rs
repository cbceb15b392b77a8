//! Scheduler subsystem
//!
//! 3-level MLFQ with aging and burst-time aware preemption

pub mod config;
pub mod core;
pub mod prediction;
pub mod switch;
pub mod thread;

// Re-exports
pub use self::config::SchedConfig;
pub use self::core::{Mlfq, Scheduler, SchedulerError, SchedulerResult, SchedulerStats};
pub use self::switch::ContextSwitch;
pub use thread::{Level, Priority, Thread, ThreadBuilder, ThreadId, ThreadState, ThreadTable};
