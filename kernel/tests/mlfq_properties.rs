//! Property tests for the ready list and the aging / preemption policy

use mlfq_kernel::scheduler::{Level, Mlfq, ThreadBuilder, ThreadId, ThreadTable};
use mlfq_kernel::{IntStatus, SchedConfig, Scheduler, ThreadState};
use proptest::prelude::*;

fn fill(specs: &[(u32, u16)]) -> (ThreadTable, Mlfq, Vec<ThreadId>) {
    let mut table = ThreadTable::new();
    let mut queue = Mlfq::new();
    let mut ids = Vec::new();
    for &(priority, apx) in specs {
        let id = table
            .spawn(ThreadBuilder::new("p").priority(priority).apx_burst_time(apx as f64))
            .unwrap();
        queue.append(id, &table, 0);
        ids.push(id);
    }
    (table, queue, ids)
}

fn drain(queue: &mut Mlfq) -> Vec<(ThreadId, Level)> {
    std::iter::from_fn(|| queue.remove_front()).collect()
}

proptest! {
    #[test]
    fn remove_front_respects_tier_dominance(specs in prop::collection::vec((0u32..150, 0u16..1000), 0..40)) {
        let (table, mut queue, ids) = fill(&specs);
        prop_assert_eq!(queue.len(), ids.len());

        let drained = drain(&mut queue);
        prop_assert!(queue.is_empty());
        prop_assert_eq!(drained.len(), ids.len());
        for pair in drained.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].1);
        }
        for (id, level) in drained {
            prop_assert_eq!(table.get(id).unwrap().level(), level);
        }
    }

    #[test]
    fn l1_is_shortest_remaining_first(apx in prop::collection::vec(0u16..500, 1..30)) {
        let specs: Vec<_> = apx.iter().map(|&a| (120, a)).collect();
        let (_, mut queue, ids) = fill(&specs);

        let mut expected: Vec<_> = ids.iter().zip(&apx).map(|(&id, &a)| (a, id)).collect();
        expected.sort();
        let drained: Vec<_> = drain(&mut queue).into_iter().map(|(id, _)| id).collect();
        prop_assert_eq!(drained, expected.into_iter().map(|(_, id)| id).collect::<Vec<_>>());
    }

    #[test]
    fn l2_is_highest_priority_first(priorities in prop::collection::vec(50u32..100, 1..30)) {
        let specs: Vec<_> = priorities.iter().map(|&p| (p, 0)).collect();
        let (_, mut queue, ids) = fill(&specs);

        let mut expected: Vec<_> = ids.iter().zip(&priorities).map(|(&id, &p)| (std::cmp::Reverse(p), id)).collect();
        expected.sort();
        let drained: Vec<_> = drain(&mut queue).into_iter().map(|(id, _)| id).collect();
        prop_assert_eq!(drained, expected.into_iter().map(|(_, id)| id).collect::<Vec<_>>());
    }

    #[test]
    fn l3_is_fifo(priorities in prop::collection::vec(0u32..50, 1..30)) {
        let specs: Vec<_> = priorities.iter().map(|&p| (p, 7)).collect();
        let (_, mut queue, ids) = fill(&specs);
        let drained: Vec<_> = drain(&mut queue).into_iter().map(|(id, _)| id).collect();
        prop_assert_eq!(drained, ids);
    }

    #[test]
    fn aging_boosts_once_per_threshold(priority in 0u32..150, waited in 0u64..5000) {
        let mut s = Scheduler::new(SchedConfig::default()).unwrap();
        let id = s.fork(ThreadBuilder::new("waiter").priority(priority)).unwrap();
        s.advance_ticks(waited);
        s.update_priority();
        s.update_priority();

        let expected = if waited > 1500 { (priority + 10).min(149) } else { priority };
        let thread = s.thread(id).unwrap();
        prop_assert_eq!(thread.priority().value() as u32, expected);
        prop_assert_eq!(s.stats().total_boosts, u64::from(waited > 1500));
    }

    #[test]
    fn l3_quantum_preemption(start in 0u64..10_000, ran in 0u64..300) {
        let mut s = Scheduler::new(SchedConfig::default()).unwrap();
        s.advance_ticks(start);
        let id = s.fork(ThreadBuilder::new("l3").priority(30)).unwrap();
        let next = s.find_next_to_run().unwrap();
        prop_assert_eq!(next, id);
        s.run(&mut |_: &mut Scheduler, _: ThreadId, _: ThreadId| {}, next, false);

        s.advance_ticks(ran);
        prop_assert_eq!(s.should_preempt(), ran > 100);
    }
}

#[test]
fn srtf_scenario_second_thread_first() {
    let (_, mut queue, ids) = fill(&[(120, 50), (110, 30)]);
    assert_eq!(queue.remove_front(), Some((ids[1], Level::L1)));
    assert_eq!(queue.remove_front(), Some((ids[0], Level::L1)));
}

#[test]
fn tier_two_preempted_by_any_l1_thread() {
    let mut s = Scheduler::new(SchedConfig::default()).unwrap();
    let worker = s.fork(ThreadBuilder::new("l2").priority(75)).unwrap();
    let next = s.find_next_to_run().unwrap();
    assert_eq!(next, worker);
    s.run(&mut |_: &mut Scheduler, _: ThreadId, _: ThreadId| {}, next, false);
    assert!(!s.should_preempt());

    s.fork(ThreadBuilder::new("long").priority(140).apx_burst_time(1e9)).unwrap();
    assert!(s.should_preempt());
}

/// An L3 thread starving behind an L2 thread is boosted, then runs in L2
#[test]
fn starving_thread_is_aged_into_l2() {
    let main = ThreadBuilder::new("main").priority(60);
    let mut s = Scheduler::with_main_thread(SchedConfig::default(), main).unwrap();
    let batch = s.fork(ThreadBuilder::new("batch").priority(45)).unwrap();
    let mut switches = Vec::new();
    let mut record = |_: &mut Scheduler, from: ThreadId, to: ThreadId| switches.push((from, to));

    for _ in 0..16 {
        assert!(!s.on_timer_tick());
    }
    assert_eq!(s.now(), 1600);
    assert_eq!(s.thread(batch).unwrap().priority().value(), 55);
    assert_eq!(s.ready_list().front(Level::L3), Some(batch));

    s.yield_current(&mut record);
    assert_eq!(s.current(), batch);
    assert_eq!(s.current_thread().level(), Level::L2);

    s.yield_current(&mut record);
    assert_eq!(s.current(), 0);
    assert_eq!(s.thread(batch).unwrap().state(), ThreadState::Ready);
    assert_eq!(s.ready_list().front(Level::L2), Some(batch));
    assert_eq!(s.interrupt_level(), IntStatus::IntOff);

    assert_eq!(switches, [(0, batch), (batch, 0)]);
}
