//! Thread Control Block
//!
//! Besides identity and state, a thread carries the burst-time bookkeeping the
//! MLFQ policy works from: an estimate of the CPU time it needs, the time it
//! already consumed, and the tick stamps of its current span and its last
//! admission to the ready queue.

use super::stack::{ThreadStack, DEFAULT_STACK_WORDS};
use super::state::{validate_transition, ThreadState};
use crate::scheduler::config::{L1_PRIORITY_FLOOR, L2_PRIORITY_FLOOR, PRIORITY_MAX};
use crate::scheduler::core::error::{SchedulerError, SchedulerResult};
use alloc::boxed::Box;
use core::fmt;

/// Thread ID type
pub type ThreadId = u64;

/// Thread priority, always within `0..=PRIORITY_MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(u8);

impl Priority {
    pub const MAX: Priority = Priority(PRIORITY_MAX);

    pub fn new(value: u32) -> Option<Self> {
        if value <= PRIORITY_MAX as u32 {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Tier this priority maps to
    pub fn level(self) -> Level {
        Level::of(self)
    }

    /// Priority raised by `step`, capped at [`Priority::MAX`]
    pub fn boosted(self, step: u8) -> Self {
        Self(self.0.saturating_add(step).min(PRIORITY_MAX))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ready-queue tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Shortest remaining time first
    L1,
    /// Highest priority first
    L2,
    /// Round robin
    L3,
}

impl Level {
    /// Tiers in dispatch order
    pub const ALL: [Level; 3] = [Level::L1, Level::L2, Level::L3];

    pub fn of(priority: Priority) -> Self {
        match priority.value() {
            p if p >= L1_PRIORITY_FLOOR => Level::L1,
            p if p >= L2_PRIORITY_FLOOR => Level::L2,
            _ => Level::L3,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Level::L1 => 1,
            Level::L2 => 2,
            Level::L3 => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L{}", self.number())
    }
}

/// User-mode execution state of a thread
///
/// Covers both the user registers and the address space. Saved when the
/// thread is switched out, restored when it runs again.
pub trait UserContext {
    fn save_state(&mut self);
    fn restore_state(&mut self);
}

/// Thread Control Block (TCB)
pub struct Thread {
    /// Unique thread ID, also the ordering tie-breaker
    id: ThreadId,

    /// Thread name (for debugging)
    name: Box<str>,

    /// Current state
    state: ThreadState,

    /// Priority, selects the tier on every insertion
    priority: Priority,

    /// Predicted total CPU time
    apx_burst_time: f64,

    /// CPU time consumed by finished spans
    cpu_burst_time: u64,

    /// Tick at which the current span began
    cache_burst_time: u64,

    /// Tick at which the thread last became ready
    be_ready_time: u64,

    /// Execution stack
    stack: ThreadStack,

    /// Present for threads running a user program
    user: Option<Box<dyn UserContext>>,
}

impl Thread {
    /// Thread ID
    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ThreadState {
        self.state
    }

    pub fn set_state(&mut self, state: ThreadState) {
        debug_assert!(
            validate_transition(self.state, state),
            "thread {}: {} -> {}",
            self.id,
            self.state,
            state
        );
        self.state = state;
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Tier derived from the current priority
    pub fn level(&self) -> Level {
        self.priority.level()
    }

    pub fn apx_burst_time(&self) -> f64 {
        self.apx_burst_time
    }

    pub fn set_apx_burst_time(&mut self, ticks: f64) {
        self.apx_burst_time = ticks;
    }

    pub fn cpu_burst_time(&self) -> u64 {
        self.cpu_burst_time
    }

    pub fn cache_burst_time(&self) -> u64 {
        self.cache_burst_time
    }

    pub fn be_ready_time(&self) -> u64 {
        self.be_ready_time
    }

    pub fn set_be_ready_time(&mut self, now: u64) {
        self.be_ready_time = now;
    }

    /// Record the start of an execution span
    pub fn begin_span(&mut self, now: u64) {
        self.cache_burst_time = now;
    }

    /// Close the current span, returning its length
    pub fn end_span(&mut self, now: u64) -> u64 {
        let span = now.saturating_sub(self.cache_burst_time);
        self.cpu_burst_time += span;
        self.cache_burst_time = now;
        span
    }

    /// Forget consumed time, once it has been folded into the estimate
    pub fn reset_cpu_burst_time(&mut self) {
        self.cpu_burst_time = 0;
    }

    /// Estimated CPU time still needed
    ///
    /// A running thread also counts its in-progress span. The result is not
    /// clamped and goes negative once the estimate is exceeded.
    pub fn remaining_time(&self, now: u64) -> f64 {
        if self.state == ThreadState::Running {
            self.apx_burst_time
                - (self.cpu_burst_time as f64 + now as f64 - self.cache_burst_time as f64)
        } else {
            self.apx_burst_time - self.cpu_burst_time as f64
        }
    }

    /// Ticks spent in the current span
    pub fn running_time(&self, now: u64) -> u64 {
        now.saturating_sub(self.cache_burst_time)
    }

    /// Did the stack fencepost survive?
    pub fn check_overflow(&self) -> bool {
        self.stack.check_overflow()
    }

    pub fn stack_mut(&mut self) -> &mut ThreadStack {
        &mut self.stack
    }

    pub fn has_user_context(&self) -> bool {
        self.user.is_some()
    }

    /// Save user registers and address space, if any
    pub fn save_user_state(&mut self) {
        if let Some(user) = self.user.as_deref_mut() {
            user.save_state();
        }
    }

    /// Restore user registers and address space, if any
    pub fn restore_user_state(&mut self) {
        if let Some(user) = self.user.as_deref_mut() {
            user.restore_state();
        }
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("priority", &self.priority)
            .field("apx_burst_time", &self.apx_burst_time)
            .field("cpu_burst_time", &self.cpu_burst_time)
            .field("user", &self.user.is_some())
            .finish()
    }
}

/// Thread factory
pub struct ThreadBuilder {
    name: Box<str>,
    priority: u32,
    apx_burst_time: f64,
    stack_words: usize,
    user: Option<Box<dyn UserContext>>,
}

impl ThreadBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            apx_burst_time: 0.0,
            stack_words: DEFAULT_STACK_WORDS,
            user: None,
        }
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Initial burst estimate
    pub fn apx_burst_time(mut self, ticks: f64) -> Self {
        self.apx_burst_time = ticks;
        self
    }

    pub fn stack_words(mut self, words: usize) -> Self {
        self.stack_words = words;
        self
    }

    pub fn user_context(mut self, user: Box<dyn UserContext>) -> Self {
        self.user = Some(user);
        self
    }

    /// Build a READY thread that is not queued yet
    pub fn build(self, id: ThreadId) -> SchedulerResult<Thread> {
        let priority = Priority::new(self.priority).ok_or(SchedulerError::InvalidPriority {
            value: self.priority,
            max: PRIORITY_MAX,
        })?;

        Ok(Thread {
            id,
            name: self.name,
            state: ThreadState::Ready,
            priority,
            apx_burst_time: self.apx_burst_time,
            cpu_burst_time: 0,
            cache_burst_time: 0,
            be_ready_time: 0,
            stack: ThreadStack::new(self.stack_words),
            user: self.user,
        })
    }
}
