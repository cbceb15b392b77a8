//! State - Thread state machine
//!
//! Manages thread lifecycle and state transitions

use core::fmt;

/// Thread state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Thread is ready to run (queued, or created and about to be queued)
    Ready,

    /// Thread owns the processor
    Running,

    /// Thread is waiting for an external event
    Blocked,

    /// Thread has terminated and awaits destruction
    Finished,
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "READY"),
            Self::Running => write!(f, "RUNNING"),
            Self::Blocked => write!(f, "BLOCKED"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}

/// Validate state transition
pub fn validate_transition(from: ThreadState, to: ThreadState) -> bool {
    use ThreadState::*;

    match (from, to) {
        // Created Ready, queued Ready
        (Ready, Ready) => true,

        // Ready -> Running (dispatch)
        (Ready, Running) => true,

        // Running -> Ready (yield / preemption)
        (Running, Ready) => true,

        // Running -> Blocked (sleep)
        (Running, Blocked) => true,

        // Running -> Finished
        (Running, Finished) => true,

        // Blocked -> Ready (wake-up)
        (Blocked, Ready) => true,

        // All other transitions invalid
        _ => false,
    }
}
