//! Scheduler configuration
//!
//! Tier boundaries are fixed; aging, quantum and estimation knobs are tunable.

use static_assertions::{assert_impl_all, const_assert};

use super::core::error::{SchedulerError, SchedulerResult};

/// Highest priority a thread can hold
pub const PRIORITY_MAX: u8 = 149;

/// Lowest priority of the L1 (SRTF) tier
pub const L1_PRIORITY_FLOOR: u8 = 100;

/// Lowest priority of the L2 (priority) tier
pub const L2_PRIORITY_FLOOR: u8 = 50;

/// Waiting time after which a ready thread is boosted (ticks)
pub const DEFAULT_AGING_THRESHOLD: u64 = 1500;

/// Priority added per boost
pub const DEFAULT_AGING_STEP: u8 = 10;

/// L3 round-robin time quantum (ticks)
pub const DEFAULT_TIME_QUANTUM: u64 = 100;

/// Ticks between two timer interrupts
pub const DEFAULT_TIMER_TICKS: u64 = 100;

/// Weight of the last observed burst in the estimate
pub const DEFAULT_BURST_WEIGHT: f64 = 0.5;

const_assert!(L2_PRIORITY_FLOOR < L1_PRIORITY_FLOOR);
const_assert!(L1_PRIORITY_FLOOR <= PRIORITY_MAX);
const_assert!(DEFAULT_AGING_STEP > 0);

/// Scheduler tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedConfig {
    /// A ready thread waiting strictly longer than this is boosted
    pub aging_threshold: u64,
    /// Priority added per boost, result capped at [`PRIORITY_MAX`]
    pub aging_step: u8,
    /// L3 threads running strictly longer than this are preempted
    pub time_quantum: u64,
    /// Clock advance per timer interrupt
    pub timer_ticks: u64,
    /// `apx = w * observed + (1 - w) * apx`
    pub burst_weight: f64,
}

impl SchedConfig {
    pub const fn new() -> Self {
        Self {
            aging_threshold: DEFAULT_AGING_THRESHOLD,
            aging_step: DEFAULT_AGING_STEP,
            time_quantum: DEFAULT_TIME_QUANTUM,
            timer_ticks: DEFAULT_TIMER_TICKS,
            burst_weight: DEFAULT_BURST_WEIGHT,
        }
    }

    pub const fn with_aging(mut self, threshold: u64, step: u8) -> Self {
        self.aging_threshold = threshold;
        self.aging_step = step;
        self
    }

    pub const fn with_time_quantum(mut self, ticks: u64) -> Self {
        self.time_quantum = ticks;
        self
    }

    pub const fn with_timer_ticks(mut self, ticks: u64) -> Self {
        self.timer_ticks = ticks;
        self
    }

    pub const fn with_burst_weight(mut self, weight: f64) -> Self {
        self.burst_weight = weight;
        self
    }

    /// Reject values the policy cannot work with
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.aging_step == 0 {
            return Err(SchedulerError::InvalidConfig { reason: "aging step must be non-zero" });
        }
        if self.time_quantum == 0 {
            return Err(SchedulerError::InvalidConfig { reason: "time quantum must be non-zero" });
        }
        if self.timer_ticks == 0 {
            return Err(SchedulerError::InvalidConfig { reason: "timer interval must be non-zero" });
        }
        if !(0.0..=1.0).contains(&self.burst_weight) {
            return Err(SchedulerError::InvalidConfig { reason: "burst weight must lie in [0, 1]" });
        }
        Ok(())
    }
}

assert_impl_all!(SchedConfig: Copy, Send, Sync);

impl Default for SchedConfig {
    fn default() -> Self {
        Self::new()
    }
}
