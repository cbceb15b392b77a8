//! Scheduler Error Handling
//!
//! Invariant violations inside the core are fatal: they go through [`fatal`]
//! and stop execution. The few fallible entry points used from outside the
//! core (thread creation, wake-up by handle) return [`SchedulerResult`].

use core::fmt;

use crate::logger;
use crate::scheduler::thread::{ThreadId, ThreadState};

/// Scheduler error types with detailed context
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerError {
    // ═══════════════════════════════════════════════════════════════
    // Exclusion Errors
    // ═══════════════════════════════════════════════════════════════

    /// A gate-requiring operation ran with interrupts enabled
    InterruptsEnabled { operation: &'static str },

    // ═══════════════════════════════════════════════════════════════
    // Dispatch Errors
    // ═══════════════════════════════════════════════════════════════

    /// A finishing thread was handed over while another awaits destruction
    AlreadyPendingDestruction { pending: ThreadId, requested: ThreadId },

    /// A thread was handed to the ready list while already on it
    AlreadyQueued { thread_id: ThreadId },

    /// Stack fencepost of the outgoing thread was overwritten
    StackOverflow { thread_id: ThreadId },

    /// Nothing is ready and the platform has nothing left to wait for
    NoRunnableThread,

    // ═══════════════════════════════════════════════════════════════
    // Thread Errors
    // ═══════════════════════════════════════════════════════════════

    /// Thread not found in the thread table
    ThreadNotFound { thread_id: ThreadId },

    /// Invalid thread state transition
    InvalidStateTransition {
        thread_id: ThreadId,
        from: ThreadState,
        to: ThreadState,
    },

    /// Priority outside `0..=max`
    InvalidPriority { value: u32, max: u8 },

    // ═══════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════

    /// Rejected by `SchedConfig::validate`
    InvalidConfig { reason: &'static str },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InterruptsEnabled { operation } => {
                write!(f, "interrupts must be disabled for {}", operation)
            }
            Self::AlreadyPendingDestruction { pending, requested } => {
                write!(
                    f,
                    "thread {} is already pending destruction (requested for thread {})",
                    pending, requested
                )
            }
            Self::AlreadyQueued { thread_id } => {
                write!(f, "thread {} is already on the ready list", thread_id)
            }
            Self::StackOverflow { thread_id } => {
                write!(f, "stack overflow detected on thread {}", thread_id)
            }
            Self::NoRunnableThread => write!(f, "no runnable thread and nothing pending"),
            Self::ThreadNotFound { thread_id } => {
                write!(f, "thread {} not found", thread_id)
            }
            Self::InvalidStateTransition { thread_id, from, to } => {
                write!(f, "thread {}: invalid transition {} -> {}", thread_id, from, to)
            }
            Self::InvalidPriority { value, max } => {
                write!(f, "priority {} out of range 0..={}", value, max)
            }
            Self::InvalidConfig { reason } => write!(f, "invalid config: {}", reason),
        }
    }
}

impl SchedulerError {
    /// Get recovery hint for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InterruptsEnabled { .. } => "Disable interrupts before touching scheduler state",
            Self::AlreadyPendingDestruction { .. } => "Let the pending thread be reaped before finishing another",
            Self::AlreadyQueued { .. } => "Dequeue the thread before readying it again",
            Self::StackOverflow { .. } => "Reduce stack usage or enlarge the thread stack",
            Self::ThreadNotFound { .. } => "Thread may have already been destroyed",
            Self::InvalidStateTransition { .. } => "Check thread lifecycle management",
            Self::InvalidPriority { .. } => "Use a priority between 0 and 149",
            _ => "Check scheduler configuration",
        }
    }

    /// Is this a recoverable error?
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InterruptsEnabled { .. } => false,
            Self::AlreadyPendingDestruction { .. } => false,
            Self::AlreadyQueued { .. } => false,
            Self::StackOverflow { .. } => false,
            Self::NoRunnableThread => false,
            _ => true,
        }
    }

    /// Get error severity (0-3)
    pub fn severity(&self) -> u8 {
        match self {
            Self::StackOverflow { .. } => 3,
            Self::AlreadyPendingDestruction { .. } => 3,
            Self::AlreadyQueued { .. } => 3,
            Self::InterruptsEnabled { .. } => 3,
            Self::NoRunnableThread => 2,
            Self::InvalidStateTransition { .. } => 1,
            _ => 0,
        }
    }
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Stop on an invariant violation
#[cold]
#[track_caller]
pub fn fatal(err: SchedulerError) -> ! {
    logger::error(&alloc::format!("[SCHED] Error: {} (hint: {})", err, err.recovery_hint()));
    panic!("[SCHED CRITICAL] Invariant violated: {}", err);
}

/// Macro for critical scheduler assertions
#[macro_export]
macro_rules! sched_assert {
    ($cond:expr, $err:expr) => {
        if !$cond {
            $crate::scheduler::core::error::fatal($err);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_are_not_recoverable() {
        let err = SchedulerError::AlreadyPendingDestruction { pending: 1, requested: 2 };
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), 3);
        assert!(SchedulerError::ThreadNotFound { thread_id: 4 }.is_recoverable());
    }

    #[test]
    #[should_panic(expected = "stack overflow detected on thread 7")]
    fn test_sched_assert_panics_with_reason() {
        sched_assert!(1 + 1 == 3, SchedulerError::StackOverflow { thread_id: 7 });
    }
}
