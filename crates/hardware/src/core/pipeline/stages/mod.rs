//! Pipeline stage implementations.
//!
//! Each stage is a function over one [`Core`](crate::core::cpu::Core) and runs once
//! per cycle. [`Cpu::tick`](crate::core::Cpu::tick) calls them in reverse pipeline
//! order:
//! 1. **Commit:** Retires ROB heads in program order and runs the watchdog.
//! 2. **Writeback:** Completes executed uops and memory accesses.
//! 3. **Issue:** Sends ready uops to functional units and the memory system.
//! 4. **Dispatch:** Renames fetched uops and inserts them in the back end queues.
//! 5. **Fetch:** Fills the fetch queues from each thread's front end.

/// Commit stage implementation.
pub mod commit;

/// Dispatch stage implementation.
pub mod dispatch;

/// Fetch stage implementation.
pub mod fetch;

/// Issue stage implementation.
pub mod issue;

/// Writeback stage implementation.
pub mod writeback;

/// Commit stage entry point.
pub use commit::commit_stage;
/// Dispatch stage entry point.
pub use dispatch::{DispatchStall, dispatch_stage};
/// Fetch stage entry point.
pub use fetch::fetch_stage;
/// Issue stage entry point.
pub use issue::issue_stage;
/// Writeback stage entry point.
pub use writeback::writeback_stage;
