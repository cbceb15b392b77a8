//! Thread table
//!
//! Owns every live thread. The rest of the scheduler refers to threads by
//! [`ThreadId`]; removing an entry is what deallocates a thread.

use super::thread::{Thread, ThreadBuilder, ThreadId};
use crate::scheduler::core::error::{fatal, SchedulerError, SchedulerResult};
use alloc::collections::BTreeMap;

/// Arena of thread control blocks keyed by ID
pub struct ThreadTable {
    threads: BTreeMap<ThreadId, Thread>,
    next_id: ThreadId,
}

impl ThreadTable {
    pub const fn new() -> Self {
        Self {
            threads: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Allocate the next ID and insert the built thread
    pub fn spawn(&mut self, builder: ThreadBuilder) -> SchedulerResult<ThreadId> {
        let id = self.next_id;
        let thread = builder.build(id)?;
        self.next_id += 1;
        self.threads.insert(id, thread);
        Ok(id)
    }

    pub fn get(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.get(&id)
    }

    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut Thread> {
        self.threads.get_mut(&id)
    }

    /// Lookup for handles the core itself holds; a miss is fatal
    pub fn expect(&self, id: ThreadId) -> &Thread {
        match self.threads.get(&id) {
            Some(thread) => thread,
            None => fatal(SchedulerError::ThreadNotFound { thread_id: id }),
        }
    }

    /// Mutable variant of [`ThreadTable::expect`]
    pub fn expect_mut(&mut self, id: ThreadId) -> &mut Thread {
        match self.threads.get_mut(&id) {
            Some(thread) => thread,
            None => fatal(SchedulerError::ThreadNotFound { thread_id: id }),
        }
    }

    pub fn contains(&self, id: ThreadId) -> bool {
        self.threads.contains_key(&id)
    }

    /// Deallocate a thread
    pub fn remove(&mut self, id: ThreadId) -> Option<Thread> {
        self.threads.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Thread> {
        self.threads.values()
    }
}

impl Default for ThreadTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut table = ThreadTable::new();
        let a = table.spawn(ThreadBuilder::new("a")).unwrap();
        let b = table.spawn(ThreadBuilder::new("b")).unwrap();
        assert!(a < b);
        table.remove(b);
        let c = table.spawn(ThreadBuilder::new("c")).unwrap();
        assert!(c > b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_failed_build_consumes_no_id() {
        let mut table = ThreadTable::new();
        assert!(table.spawn(ThreadBuilder::new("bad").priority(200)).is_err());
        assert_eq!(table.spawn(ThreadBuilder::new("ok")).unwrap(), 0);
    }

    #[test]
    #[should_panic(expected = "thread 9 not found")]
    fn test_expect_unknown_is_fatal() {
        ThreadTable::new().expect(9);
    }
}
