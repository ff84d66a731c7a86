//! `mockall` mock of the memory-system interface.

use mockall::mock;
use o3sim_core::common::Cycle;
use o3sim_core::soc::{AccessId, AccessKind, MemCompletion, MemRequest, MemorySystem};

mock! {
    pub Memory {}

    impl MemorySystem for Memory {
        fn start_fetch(&mut self, core: usize, thread: usize, addr: u64, now: Cycle) -> AccessId;
        fn fetch_pending(&self, core: usize, access: AccessId, now: Cycle) -> bool;
        fn can_access(&self, core: usize, kind: AccessKind, now: Cycle) -> bool;
        fn access(&mut self, request: MemRequest, now: Cycle);
        fn completions(&mut self, core: usize, now: Cycle) -> Vec<MemCompletion>;
    }
}

/// A mock whose fetches finish immediately and that never accepts data accesses.
pub fn instant_fetch_memory() -> MockMemory {
    let mut mem = MockMemory::new();
    let _ = mem.expect_start_fetch().returning(|_, _, _, _| 0);
    let _ = mem.expect_fetch_pending().return_const(false);
    let _ = mem.expect_can_access().return_const(false);
    let _ = mem.expect_completions().returning(|_, _| Vec::new());
    mem
}
