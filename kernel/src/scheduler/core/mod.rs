//! Scheduler core module
//!
//! - `mlfq`: the three-tier ready list
//! - `policy`: ordering, aging and preemption rules
//! - `scheduler`: admission, dispatch and deferred destruction

pub mod error;
pub mod mlfq;
pub mod policy;
pub mod scheduler;

pub use error::{fatal, SchedulerError, SchedulerResult};
pub use mlfq::Mlfq;
pub use scheduler::{Scheduler, SchedulerStats};
