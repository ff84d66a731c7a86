//! Return Address Stack Tests.

use o3sim_core::core::units::bru::ras::Ras;
use pretty_assertions::assert_eq;

#[test]
fn pops_in_reverse_push_order() {
    let mut ras = Ras::new(4);
    ras.push(0x1005);
    ras.push(0x2005);
    assert_eq!(ras.pop(), 0x2005);
    assert_eq!(ras.pop(), 0x1005);
    assert_eq!(ras.index(), 0);
}

#[test]
fn overflow_overwrites_oldest_entry() {
    let mut ras = Ras::new(2);
    for addr in [0x10, 0x20, 0x30] {
        ras.push(addr);
    }
    assert_eq!(ras.pop(), 0x30);
    assert_eq!(ras.pop(), 0x20);
    // The slot of 0x10 was reused by 0x30.
    assert_eq!(ras.pop(), 0x30);
}

#[test]
fn restore_rewinds_the_index_only() {
    let mut ras = Ras::new(4);
    ras.push(0xa);
    let mark = ras.index();
    ras.push(0xb);
    ras.push(0xc);
    ras.restore(mark);
    assert_eq!(ras.index(), 1);
    assert_eq!(ras.pop(), 0xa);
}
