// tests/cancellation.rs
mod common;
use crate::common::builders::independent;
use crate::common::init_tracing;
use crate::common::reference::check_schedule;

use std::thread;
use std::time::{Duration, Instant};

use dagsched::search::{SearchHandle, SearchOptions, SearchTree};

/// 16 equal tasks on 3 processors: the load bound says 11 but the optimum is
/// 12, so nothing short of exhausting the tree proves optimality.
const TASKS: [u64; 16] = [2; 16];

fn hard_options() -> SearchOptions {
    SearchOptions {
        processors: 3,
        workers: 2,
        memoize: false,
        early_exit: false,
        greedy_incumbent: false,
        ..SearchOptions::default()
    }
}

#[test]
fn cancelling_from_another_thread_returns_best_so_far() {
    init_tracing();
    let graph = independent(&TASKS);
    let handle = SearchHandle::new();
    let tree = SearchTree::new(&graph, hard_options())
        .unwrap()
        .with_handle(handle.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        handle.cancel();
    });

    let started = Instant::now();
    let outcome = tree.run().unwrap();
    canceller.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert!(!outcome.optimal);
    assert!(outcome.schedule.is_complete());
    let makespan = check_schedule(&graph, 3, &outcome.schedule.assignments()).unwrap();
    assert_eq!(makespan, outcome.makespan());
    assert!(makespan >= 12);
}

#[test]
fn time_budget_stops_a_long_search() {
    init_tracing();
    let graph = independent(&TASKS);
    let options = SearchOptions {
        time_budget: Some(Duration::from_millis(150)),
        ..hard_options()
    };

    let started = Instant::now();
    let outcome = SearchTree::new(&graph, options).unwrap().run().unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert!(!outcome.optimal);
    assert!(outcome.schedule.is_complete());
    let makespan = check_schedule(&graph, 3, &outcome.schedule.assignments()).unwrap();
    assert!(makespan >= 12);
}
