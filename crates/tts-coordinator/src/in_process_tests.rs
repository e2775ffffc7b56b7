use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::thread;
use std::time::Duration;

use super::*;

#[test]
fn tickets_are_issued_in_call_order() {
    let coord = InProcessCoordinator::new();
    assert_eq!(coord.issue(), 0);
    assert_eq!(coord.issue(), 1);
    assert_eq!(coord.issue(), 2);
}

#[test]
fn single_ticket_finishes_without_blocking() {
    let coord = InProcessCoordinator::new();
    let ticket = coord.issue();
    coord.wait_turn(ticket);
    coord.finish_turn(ticket);
}

#[test]
fn later_ticket_blocks_until_earlier_finishes() {
    let coord = Arc::new(InProcessCoordinator::new());
    let first = coord.issue();
    let second = coord.issue();

    let order = Arc::new(StdMutex::new(Vec::new()));

    let coord_a = coord.clone();
    let order_a = order.clone();
    let a = thread::spawn(move || {
        coord_a.wait_turn(first);
        thread::sleep(Duration::from_millis(30));
        order_a.lock().unwrap().push(first);
        coord_a.finish_turn(first);
    });

    let coord_b = coord.clone();
    let order_b = order.clone();
    let b = thread::spawn(move || {
        coord_b.wait_turn(second);
        order_b.lock().unwrap().push(second);
        coord_b.finish_turn(second);
    });

    a.join().unwrap();
    b.join().unwrap();

    assert_eq!(*order.lock().unwrap(), vec![first, second]);
}

#[test]
fn many_threads_finish_in_strict_ticket_order() {
    let coord = Arc::new(InProcessCoordinator::new());
    let order = Arc::new(StdMutex::new(Vec::new()));
    let mut handles = Vec::new();

    let tickets: Vec<Ticket> = (0..8).map(|_| coord.issue()).collect();
    for &ticket in tickets.iter().rev() {
        let coord = coord.clone();
        let order = order.clone();
        handles.push(thread::spawn(move || {
            coord.wait_turn(ticket);
            order.lock().unwrap().push(ticket);
            coord.finish_turn(ticket);
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(*order.lock().unwrap(), tickets);
}
