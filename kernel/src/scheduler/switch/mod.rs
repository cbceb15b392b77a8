//! Context switch binding
//!
//! The register save / stack swap is platform code. The scheduler only needs
//! "suspend `from`, resume `to`" and a way to wait when nothing is ready.

use crate::scheduler::core::Scheduler;
use crate::scheduler::thread::ThreadId;

/// Platform context switch
pub trait ContextSwitch {
    /// Suspend `from` and resume `to`
    ///
    /// Returns only once `from` is dispatched again, with interrupts still
    /// disabled. The scheduler is handed back so the resumed side can keep
    /// scheduling on the same state.
    fn switch(&mut self, scheduler: &mut Scheduler, from: ThreadId, to: ThreadId);

    /// Wait for an interrupt while the ready list is empty
    ///
    /// Returns `false` when nothing can ever become ready again.
    fn idle(&mut self, _scheduler: &mut Scheduler) -> bool {
        false
    }
}

/// Plain closures act as a switch that can never idle
impl<F> ContextSwitch for F
where
    F: FnMut(&mut Scheduler, ThreadId, ThreadId),
{
    fn switch(&mut self, scheduler: &mut Scheduler, from: ThreadId, to: ThreadId) {
        self(scheduler, from, to)
    }
}
