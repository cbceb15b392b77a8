//! Scheduling Policy - ordering, aging and preemption rules
//!
//! Everything here is a pure function of thread fields and the current tick:
//! - L1 orders by estimated remaining time (SRTF)
//! - L2 orders by priority
//! - waiting threads are aged so L2/L3 cannot starve
//! - the running thread is preempted according to its current tier
//!
//! Comparators return a signed value in the C `qsort` sense: negative means
//! the first argument goes before the second.

use super::mlfq::Mlfq;
use crate::scheduler::config::SchedConfig;
use crate::scheduler::thread::{Level, Priority, Thread, ThreadTable};

/// Remaining-time comparator for L1
///
/// Exactly equal estimates fall back to the ID. Otherwise the difference is
/// truncated toward zero, so estimates less than one tick apart compare as
/// equal and keep insertion order.
pub fn compare_remaining_time(a: &Thread, b: &Thread, now: u64) -> i64 {
    let time_a = a.remaining_time(now);
    let time_b = b.remaining_time(now);
    if time_a == time_b {
        a.id() as i64 - b.id() as i64
    } else {
        (time_a - time_b) as i64
    }
}

/// Priority comparator for L2, higher priority first
pub fn compare_priority(a: &Thread, b: &Thread) -> i64 {
    if a.priority() == b.priority() {
        a.id() as i64 - b.id() as i64
    } else {
        b.priority().value() as i64 - a.priority().value() as i64
    }
}

/// Boost a thread that waited too long
///
/// Returns the old and new priority when the thread was boosted.
pub fn age(thread: &mut Thread, now: u64, config: &SchedConfig) -> Option<(Priority, Priority)> {
    if now.saturating_sub(thread.be_ready_time()) <= config.aging_threshold {
        return None;
    }
    let old = thread.priority();
    let new = old.boosted(config.aging_step);
    thread.set_priority(new);
    thread.set_be_ready_time(now);
    Some((old, new))
}

/// Must the running thread give up the processor?
///
/// The tier is read from the current priority of `current`, not from the
/// queue it was last dispatched from.
pub fn should_preempt(
    current: &Thread,
    ready: &Mlfq,
    threads: &ThreadTable,
    now: u64,
    config: &SchedConfig,
) -> bool {
    match current.level() {
        Level::L1 => match ready.front(Level::L1) {
            Some(head) => {
                threads.expect(head).remaining_time(now) < current.remaining_time(now)
            }
            None => false,
        },
        Level::L2 => !ready.is_level_empty(Level::L1),
        Level::L3 => {
            !ready.is_level_empty(Level::L1)
                || !ready.is_level_empty(Level::L2)
                || current.running_time(now) > config.time_quantum
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::thread::{ThreadBuilder, ThreadState};

    fn thread(id: u64, priority: u32, apx: f64) -> Thread {
        ThreadBuilder::new("t").priority(priority).apx_burst_time(apx).build(id).unwrap()
    }

    #[test]
    fn test_remaining_time_order() {
        let a = thread(1, 120, 50.0);
        let b = thread(2, 110, 30.0);
        assert!(compare_remaining_time(&b, &a, 0) < 0);
        assert!(compare_remaining_time(&a, &b, 0) > 0);
    }

    #[test]
    fn test_remaining_time_tie_uses_id() {
        let a = thread(3, 120, 40.0);
        let b = thread(5, 101, 40.0);
        assert_eq!(compare_remaining_time(&a, &b, 0), -2);
    }

    #[test]
    fn test_remaining_time_difference_is_truncated() {
        let a = thread(1, 120, 30.5);
        let b = thread(2, 120, 30.0);
        assert_eq!(compare_remaining_time(&a, &b, 0), 0);
        assert_eq!(compare_remaining_time(&b, &a, 0), 0);
    }

    #[test]
    fn test_priority_order() {
        let high = thread(9, 90, 0.0);
        let low = thread(1, 60, 0.0);
        assert!(compare_priority(&high, &low) < 0);
        let twin = thread(4, 90, 0.0);
        assert!(compare_priority(&twin, &high) < 0);
    }

    #[test]
    fn test_age_threshold_is_strict() {
        let config = SchedConfig::default();
        let mut t = thread(1, 40, 0.0);
        t.set_be_ready_time(0);
        assert_eq!(age(&mut t, 1500, &config), None);
        let boosted = age(&mut t, 1501, &config);
        assert_eq!(boosted.map(|(o, n)| (o.value(), n.value())), Some((40, 50)));
        assert_eq!(t.be_ready_time(), 1501);
    }

    #[test]
    fn test_age_caps_priority() {
        let config = SchedConfig::default();
        let mut t = thread(1, 145, 0.0);
        age(&mut t, 2000, &config);
        assert_eq!(t.priority(), Priority::MAX);
    }

    #[test]
    fn test_l3_quantum_boundary() {
        let config = SchedConfig::default();
        let ready = Mlfq::new();
        let threads = ThreadTable::new();
        let mut cur = thread(1, 10, 500.0);
        cur.set_state(ThreadState::Running);
        cur.begin_span(1000);
        assert!(!should_preempt(&cur, &ready, &threads, 1100, &config));
        assert!(should_preempt(&cur, &ready, &threads, 1101, &config));
    }
}
