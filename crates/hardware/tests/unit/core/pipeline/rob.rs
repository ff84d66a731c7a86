//! Reorder Buffer Tests.

use o3sim_core::core::pipeline::rob::Rob;
use o3sim_core::core::uop::UopId;
use pretty_assertions::assert_eq;

#[test]
fn head_is_oldest_and_tail_is_youngest() {
    let mut rob = Rob::new(4);
    for n in 1..=3 {
        rob.enqueue(UopId(n));
    }
    assert_eq!(rob.head(), Some(UopId(1)));
    assert_eq!(rob.tail(), Some(UopId(3)));
    assert_eq!(rob.iter().collect::<Vec<_>>(), vec![UopId(1), UopId(2), UopId(3)]);
}

#[test]
fn wraps_around_its_slots() {
    let mut rob = Rob::new(2);
    rob.enqueue(UopId(1));
    rob.enqueue(UopId(2));
    assert!(!rob.can_enqueue());
    assert_eq!(rob.remove_head(), UopId(1));
    rob.enqueue(UopId(3));
    assert!(rob.is_full());
    assert_eq!(rob.get(0), Some(UopId(2)));
    assert_eq!(rob.get(1), Some(UopId(3)));
    assert_eq!(rob.get(2), None);
}

#[test]
fn remove_tail_squashes_youngest_first() {
    let mut rob = Rob::new(3);
    for n in 1..=3 {
        rob.enqueue(UopId(n));
    }
    assert_eq!(rob.remove_tail(), UopId(3));
    assert_eq!(rob.remove_tail(), UopId(2));
    assert_eq!(rob.len(), 1);
    rob.enqueue(UopId(4));
    assert_eq!(rob.tail(), Some(UopId(4)));
    assert_eq!(rob.head(), Some(UopId(1)));
}

#[test]
#[should_panic(expected = "full buffer")]
fn enqueue_into_full_buffer_panics() {
    let mut rob = Rob::new(1);
    rob.enqueue(UopId(1));
    rob.enqueue(UopId(2));
}
