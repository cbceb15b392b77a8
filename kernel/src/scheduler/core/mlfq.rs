//! Tiered ready queue (3-level MLFQ)
//!
//! Holds the IDs of READY threads, the threads themselves stay in the
//! [`ThreadTable`]. Tier is computed from the priority on every append;
//! mutating a queued thread's priority does not move it.
//!
//! - L1 (priority >= 100): ascending remaining time, ties by ID
//! - L2 (50..100): descending priority, ties by ID
//! - L3 (< 50): FIFO

use super::policy;
use crate::scheduler::thread::{Level, Thread, ThreadId, ThreadTable};
use alloc::collections::VecDeque;

/// Ready queues (3-tier)
pub struct Mlfq {
    l1: VecDeque<ThreadId>,
    l2: VecDeque<ThreadId>,
    l3: VecDeque<ThreadId>,
}

impl Mlfq {
    pub const fn new() -> Self {
        Self {
            l1: VecDeque::new(),
            l2: VecDeque::new(),
            l3: VecDeque::new(),
        }
    }

    fn tier(&self, level: Level) -> &VecDeque<ThreadId> {
        match level {
            Level::L1 => &self.l1,
            Level::L2 => &self.l2,
            Level::L3 => &self.l3,
        }
    }

    /// Insert before the first resident `r` with `cmp(r) < 0`, else at the tail
    fn sorted_insert(queue: &mut VecDeque<ThreadId>, id: ThreadId, mut cmp: impl FnMut(ThreadId) -> i64) {
        let pos = queue
            .iter()
            .position(|&resident| cmp(resident) < 0)
            .unwrap_or(queue.len());
        queue.insert(pos, id);
    }

    /// Insert a thread into the tier its priority maps to
    ///
    /// Returns that tier. Neither priority nor state is touched.
    pub fn append(&mut self, id: ThreadId, threads: &ThreadTable, now: u64) -> Level {
        let thread = threads.expect(id);
        let level = thread.level();

        match level {
            Level::L1 => Self::sorted_insert(&mut self.l1, id, |resident| {
                policy::compare_remaining_time(thread, threads.expect(resident), now)
            }),
            Level::L2 => Self::sorted_insert(&mut self.l2, id, |resident| {
                policy::compare_priority(thread, threads.expect(resident))
            }),
            Level::L3 => self.l3.push_back(id),
        }

        level
    }

    /// Take the head of the highest non-empty tier
    pub fn remove_front(&mut self) -> Option<(ThreadId, Level)> {
        self.l1
            .pop_front()
            .map(|id| (id, Level::L1))
            .or_else(|| self.l2.pop_front().map(|id| (id, Level::L2)))
            .or_else(|| self.l3.pop_front().map(|id| (id, Level::L3)))
    }

    /// Head of one tier
    pub fn front(&self, level: Level) -> Option<ThreadId> {
        self.tier(level).front().copied()
    }

    pub fn is_level_empty(&self, level: Level) -> bool {
        self.tier(level).is_empty()
    }

    /// Check if all queues are empty
    pub fn is_empty(&self) -> bool {
        self.l1.is_empty() && self.l2.is_empty() && self.l3.is_empty()
    }

    pub fn len(&self) -> usize {
        self.l1.len() + self.l2.len() + self.l3.len()
    }

    /// Get queue lengths (for stats)
    pub fn lengths(&self) -> (usize, usize, usize) {
        (self.l1.len(), self.l2.len(), self.l3.len())
    }

    pub fn contains(&self, id: ThreadId) -> bool {
        self.iter().any(|(_, resident)| resident == id)
    }

    /// Every resident, tier by tier, each tier in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = (Level, ThreadId)> + '_ {
        Level::ALL
            .into_iter()
            .flat_map(move |level| self.tier(level).iter().map(move |&id| (level, id)))
    }

    /// Visit every resident thread, tier by tier
    ///
    /// The visitor may mutate the thread; tier membership stays as it is
    /// until the thread is appended again.
    pub fn apply(&self, threads: &mut ThreadTable, mut visitor: impl FnMut(&mut Thread)) {
        for (_, id) in self.iter() {
            visitor(threads.expect_mut(id));
        }
    }
}

impl Default for Mlfq {
    fn default() -> Self {
        Self::new()
    }
}
