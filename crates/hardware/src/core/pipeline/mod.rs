//! Out-of-order pipeline structures and stages.
//!
//! This module contains the structures uops move through and the stages that
//! move them. It includes the following components:
//! 1. **Front End:** Trace feed, fetch queue and wrong-path state per thread.
//! 2. **Rename:** Register alias table and physical register file per thread.
//! 3. **Queues:** Reorder buffer, issue queue and load/store queues.
//! 4. **Event Queue:** Uops in execution, per core.
//! 5. **Stages:** Fetch, dispatch, issue, writeback and commit.
//! 6. **Recovery:** Squashing the wrong path after a misprediction.

/// In-flight execution events.
pub mod event_queue;

/// Per-thread front end state.
pub mod frontend;

/// Issue, load and store queues.
pub mod queues;

/// Misprediction recovery.
pub mod recover;

/// Register rename table and physical register file.
pub mod rename;

/// Reorder buffer.
pub mod rob;

/// Pipeline stage implementations.
pub mod stages;
