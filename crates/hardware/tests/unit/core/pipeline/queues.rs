//! Issue, Load and Store Queue Tests.

use o3sim_core::config::QueueKind;
use o3sim_core::core::pipeline::queues::{QueueLimit, UopQueue};
use o3sim_core::core::uop::{DecodedUop, Structure, Uop, UopId, UopKind, UopPool};
use pretty_assertions::assert_eq;

#[test]
fn private_limit_counts_only_the_thread() {
    let limit = QueueLimit::new(QueueKind::Private, 4, 2);
    assert_eq!(limit.per_thread_capacity(), 4);
    assert!(limit.has_room(3, 7));
    assert!(!limit.has_room(4, 4));
}

#[test]
fn shared_limit_counts_the_whole_core() {
    let limit = QueueLimit::new(QueueKind::Shared, 4, 2);
    assert_eq!(limit.per_thread_capacity(), 8);
    assert!(limit.has_room(6, 7));
    assert!(!limit.has_room(1, 8));
}

#[test]
fn iterates_oldest_first_regardless_of_insert_order() {
    let mut iq = UopQueue::new("iq", 4);
    for n in [7, 2, 5] {
        iq.insert(UopId(n));
    }
    assert_eq!(iq.iter().collect::<Vec<_>>(), vec![UopId(2), UopId(5), UopId(7)]);
    assert!(iq.remove(UopId(5)));
    assert!(!iq.remove(UopId(5)));
    assert!(!iq.contains(UopId(5)));
}

#[test]
fn recover_drops_speculative_entries() {
    let mut pool = UopPool::new();
    let mut lq = UopQueue::new("lq", 4);
    for n in 1..=3 {
        let mut uop = Uop::from_decoded(UopId(n), 0, 0, &DecodedUop::new(UopKind::Load, 0, 4));
        uop.specmode = n != 1;
        lq.insert(pool.insert(uop, Structure::Lq));
    }
    assert_eq!(lq.recover(&pool), vec![UopId(2), UopId(3)]);
    assert_eq!(lq.len(), 1);
}

#[test]
#[should_panic(expected = "full queue")]
fn insert_into_full_queue_panics() {
    let mut sq = UopQueue::new("sq", 1);
    sq.insert(UopId(1));
    sq.insert(UopId(2));
}
