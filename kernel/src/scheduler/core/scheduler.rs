//! Uniprocessor MLFQ scheduler
//!
//! Admission, selection, dispatch and deferred destruction of threads, plus
//! the periodic aging / preemption checks driven by the timer. Every entry
//! point that touches the ready list requires interrupts to be disabled.

use super::error::{fatal, SchedulerError, SchedulerResult};
use super::mlfq::Mlfq;
use super::policy;
use crate::logger;
use crate::scheduler::config::SchedConfig;
use crate::scheduler::prediction::BurstPredictor;
use crate::scheduler::switch::ContextSwitch;
use crate::scheduler::thread::{Level, Thread, ThreadBuilder, ThreadId, ThreadState, ThreadTable};
use crate::sync::{IntStatus, InterruptGate};
use alloc::format;
use alloc::string::String;
use core::fmt::{self, Write};
use static_assertions::assert_not_impl_any;

/// Scheduler statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub l1_len: usize,
    pub l2_len: usize,
    pub l3_len: usize,
    pub total_dispatches: u64,
    pub total_destroyed: u64,
    pub total_boosts: u64,
    pub total_ticks: u64,
}

impl SchedulerStats {
    pub fn ready_len(&self) -> usize {
        self.l1_len + self.l2_len + self.l3_len
    }
}

/// Scheduler context
///
/// Owns every thread through the [`ThreadTable`]; the ready list, the
/// current thread and the pending-destruction slot only hold IDs.
pub struct Scheduler {
    config: SchedConfig,
    threads: ThreadTable,
    ready_list: Mlfq,
    current: ThreadId,
    /// Finished thread whose stack is still in use
    to_be_destroyed: Option<ThreadId>,
    interrupt: InterruptGate,
    now: u64,
    predictor: BurstPredictor,

    // Statistics
    total_dispatches: u64,
    total_destroyed: u64,
    total_boosts: u64,
}

// Owned by the single processor, never shared
assert_not_impl_any!(Scheduler: Send, Sync);

impl Scheduler {
    /// Create a scheduler running a priority-0 "main" thread
    ///
    /// Interrupts start disabled, the way the machine boots.
    pub fn new(config: SchedConfig) -> SchedulerResult<Self> {
        Self::with_main_thread(config, ThreadBuilder::new("main"))
    }

    /// Create a scheduler whose running thread is built from `main`
    pub fn with_main_thread(config: SchedConfig, main: ThreadBuilder) -> SchedulerResult<Self> {
        config.validate()?;

        let mut threads = ThreadTable::new();
        let current = threads.spawn(main)?;
        let thread = threads.expect_mut(current);
        thread.set_state(ThreadState::Running);
        thread.begin_span(0);

        Ok(Self {
            config,
            threads,
            ready_list: Mlfq::new(),
            current,
            to_be_destroyed: None,
            interrupt: InterruptGate::new(IntStatus::IntOff),
            now: 0,
            predictor: BurstPredictor::new(config.burst_weight),
            total_dispatches: 0,
            total_destroyed: 0,
            total_boosts: 0,
        })
    }

    // ═══════════════════════════════════════════════════════════════
    // Clock & interrupt gate
    // ═══════════════════════════════════════════════════════════════

    /// Ticks since boot
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn advance_ticks(&mut self, ticks: u64) {
        self.now += ticks;
    }

    pub fn interrupt_level(&self) -> IntStatus {
        self.interrupt.level()
    }

    /// Change the interrupt level, returning the previous one
    pub fn set_interrupt_level(&mut self, level: IntStatus) -> IntStatus {
        self.interrupt.set_level(level)
    }

    /// Run `f` with interrupts disabled, then restore the previous level
    pub fn without_interrupts<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.interrupt.disable();
        let result = f(self);
        self.interrupt.set_level(previous);
        result
    }

    #[track_caller]
    fn require_interrupts_off(&self, operation: &'static str) {
        crate::sched_assert!(
            self.interrupt.is_held(),
            SchedulerError::InterruptsEnabled { operation }
        );
    }

    // ═══════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════

    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    pub fn threads(&self) -> &ThreadTable {
        &self.threads
    }

    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.get(id)
    }

    pub fn thread_mut(&mut self, id: ThreadId) -> Option<&mut Thread> {
        self.threads.get_mut(id)
    }

    /// ID of the RUNNING thread
    pub fn current(&self) -> ThreadId {
        self.current
    }

    pub fn current_thread(&self) -> &Thread {
        self.threads.expect(self.current)
    }

    pub fn pending_destruction(&self) -> Option<ThreadId> {
        self.to_be_destroyed
    }

    pub fn ready_list(&self) -> &Mlfq {
        &self.ready_list
    }

    pub fn stats(&self) -> SchedulerStats {
        let (l1_len, l2_len, l3_len) = self.ready_list.lengths();
        SchedulerStats {
            l1_len,
            l2_len,
            l3_len,
            total_dispatches: self.total_dispatches,
            total_destroyed: self.total_destroyed,
            total_boosts: self.total_boosts,
            total_ticks: self.now,
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Thread creation
    // ═══════════════════════════════════════════════════════════════

    /// Create a READY thread without queueing it
    pub fn spawn(&mut self, builder: ThreadBuilder) -> SchedulerResult<ThreadId> {
        self.threads.spawn(builder)
    }

    /// Create a thread and put it on the ready list
    pub fn fork(&mut self, builder: ThreadBuilder) -> SchedulerResult<ThreadId> {
        let id = self.spawn(builder)?;
        self.without_interrupts(|s| s.ready_to_run(id));
        Ok(id)
    }

    // ═══════════════════════════════════════════════════════════════
    // Core operations
    // ═══════════════════════════════════════════════════════════════

    /// Mark a thread READY and queue it in the tier its priority selects
    pub fn ready_to_run(&mut self, id: ThreadId) {
        self.require_interrupts_off("ready_to_run");
        crate::sched_assert!(
            !self.ready_list.contains(id),
            SchedulerError::AlreadyQueued { thread_id: id }
        );

        let now = self.now;
        let thread = self.threads.expect_mut(id);
        thread.set_state(ThreadState::Ready);
        thread.set_be_ready_time(now);

        let level = self.ready_list.append(id, &self.threads, now);
        logger::debug(&format!(
            "[A] Tick [{}]: Thread [{}] is inserted into queue L[{}]",
            now,
            id,
            level.number()
        ));
    }

    /// Dequeue the next thread to dispatch, if any
    ///
    /// The thread's state is left as READY.
    pub fn find_next_to_run(&mut self) -> Option<ThreadId> {
        self.require_interrupts_off("find_next_to_run");

        let (id, level) = self.ready_list.remove_front()?;
        logger::debug(&format!(
            "[B] Tick [{}]: Thread [{}] is removed from queue L[{}]",
            self.now,
            id,
            level.number()
        ));
        Some(id)
    }

    /// Dispatch the processor to `next`
    ///
    /// The outgoing thread must already be READY, BLOCKED or FINISHED. With
    /// `finishing` it is parked in the pending-destruction slot and freed by
    /// whichever thread runs after the switch.
    pub fn run<S: ContextSwitch + ?Sized>(&mut self, switch: &mut S, next: ThreadId, finishing: bool) {
        let old = self.current;
        self.require_interrupts_off("run");

        if finishing {
            if let Some(pending) = self.to_be_destroyed {
                fatal(SchedulerError::AlreadyPendingDestruction { pending, requested: old });
            }
            self.to_be_destroyed = Some(old);
        }

        let outgoing = self.threads.expect_mut(old);
        outgoing.save_user_state();
        let executed = outgoing.cpu_burst_time();
        crate::sched_assert!(
            outgoing.check_overflow(),
            SchedulerError::StackOverflow { thread_id: old }
        );

        let now = self.now;
        self.current = next;
        let incoming = self.threads.expect_mut(next);
        incoming.set_state(ThreadState::Running);
        incoming.begin_span(now);
        self.total_dispatches += 1;

        logger::debug(&format!(
            "[E] Tick [{}]: Thread [{}] is now selected for execution, thread [{}] is replaced, and it has executed [{}] ticks",
            now, next, old, executed
        ));

        switch.switch(self, old, next);

        // Back on `old`, interrupts must still be off
        self.require_interrupts_off("run");
        self.check_to_be_destroyed();

        if let Some(thread) = self.threads.get_mut(old) {
            thread.restore_user_state();
        }
    }

    /// Free the thread left in the pending-destruction slot
    pub fn check_to_be_destroyed(&mut self) {
        if let Some(id) = self.to_be_destroyed.take() {
            self.threads.remove(id);
            self.total_destroyed += 1;
        }
    }

    /// First code run by a freshly dispatched thread
    pub fn begin_thread(&mut self) {
        self.check_to_be_destroyed();
        self.interrupt.set_level(IntStatus::IntOn);
    }

    // ═══════════════════════════════════════════════════════════════
    // Aging & preemption
    // ═══════════════════════════════════════════════════════════════

    /// Age every READY thread that waited too long
    pub fn update_priority(&mut self) {
        self.require_interrupts_off("update_priority");

        let now = self.now;
        let config = self.config;
        let mut boosts = 0;
        self.ready_list.apply(&mut self.threads, |thread| {
            if let Some((old, new)) = policy::age(thread, now, &config) {
                logger::debug(&format!(
                    "[C] Tick [{}]: Thread [{}] changes its priority from [{}] to [{}]",
                    now,
                    thread.id(),
                    old,
                    new
                ));
                boosts += 1;
            }
        });
        self.total_boosts += boosts;
    }

    /// Must the running thread yield now?
    pub fn should_preempt(&self) -> bool {
        self.require_interrupts_off("should_preempt");
        policy::should_preempt(
            self.threads.expect(self.current),
            &self.ready_list,
            &self.threads,
            self.now,
            &self.config,
        )
    }

    /// Timer interrupt: advance the clock, age, report whether to yield
    pub fn on_timer_tick(&mut self) -> bool {
        self.now += self.config.timer_ticks;
        self.update_priority();
        self.should_preempt()
    }

    // ═══════════════════════════════════════════════════════════════
    // Thread-side paths
    // ═══════════════════════════════════════════════════════════════

    /// Hand the processor to the next ready thread, if there is one
    pub fn yield_current<S: ContextSwitch + ?Sized>(&mut self, switch: &mut S) {
        let previous = self.interrupt.disable();

        if let Some(next) = self.find_next_to_run() {
            let current = self.current;
            let now = self.now;
            self.threads.expect_mut(current).end_span(now);
            self.ready_to_run(current);
            self.run(switch, next, false);
        }

        self.interrupt.set_level(previous);
    }

    /// Block (or finish) the current thread and dispatch the next one
    ///
    /// Blocking folds the consumed time into the burst estimate. Idles while
    /// the ready list is empty.
    pub fn sleep_current<S: ContextSwitch + ?Sized>(&mut self, switch: &mut S, finishing: bool) {
        self.require_interrupts_off("sleep_current");

        let current = self.current;
        let now = self.now;
        let thread = self.threads.expect_mut(current);
        thread.end_span(now);

        if finishing {
            thread.set_state(ThreadState::Finished);
        } else {
            thread.set_state(ThreadState::Blocked);
            let previous = thread.apx_burst_time();
            let observed = thread.cpu_burst_time();
            let estimate = self.predictor.predict(previous, observed);
            thread.set_apx_burst_time(estimate);
            thread.reset_cpu_burst_time();
            logger::debug(&format!(
                "[D] Tick [{}]: Thread [{}] update approximate burst time, from: [{}], add [{}], to [{}]",
                now, current, previous, observed, estimate
            ));
        }

        let next = loop {
            if let Some(next) = self.find_next_to_run() {
                break next;
            }
            if !switch.idle(self) {
                fatal(SchedulerError::NoRunnableThread);
            }
        };

        self.run(switch, next, finishing);
    }

    /// Terminate the current thread
    pub fn finish_current<S: ContextSwitch + ?Sized>(&mut self, switch: &mut S) {
        self.interrupt.disable();
        self.sleep_current(switch, true);
    }

    /// Move a BLOCKED thread back to the ready list
    pub fn wake(&mut self, id: ThreadId) -> SchedulerResult<()> {
        self.require_interrupts_off("wake");

        let state = self
            .threads
            .get(id)
            .ok_or(SchedulerError::ThreadNotFound { thread_id: id })?
            .state();
        if state != ThreadState::Blocked {
            return Err(SchedulerError::InvalidStateTransition {
                thread_id: id,
                from: state,
                to: ThreadState::Ready,
            });
        }

        self.ready_to_run(id);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════

    /// Write the ready list, one tier per line
    pub fn dump<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Ready list contents:")?;
        for level in Level::ALL {
            write!(out, "{}:", level)?;
            for (_, id) in self.ready_list.iter().filter(|&(l, _)| l == level) {
                let thread = self.threads.expect(id);
                write!(out, " {}({})", thread.name(), id)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Log the ready list at INFO
    pub fn print(&self) {
        let mut text = String::new();
        let _ = self.dump(&mut text);
        for line in text.lines() {
            logger::info(line);
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("current", &self.current)
            .field("to_be_destroyed", &self.to_be_destroyed)
            .field("interrupt", &self.interrupt.level())
            .field("now", &self.now)
            .field("stats", &self.stats())
            .finish()
    }
}
