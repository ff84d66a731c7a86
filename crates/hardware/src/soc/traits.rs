//! Memory-system trait for the pipeline core.
//!
//! This module defines the `MemorySystem` trait implemented by every memory model the
//! pipeline can run against. It provides:
//! 1. **Fetch:** `start_fetch` and `fetch_pending` gate dispatch on instruction fetch.
//! 2. **Data:** `can_access` and `access` start loads and stores.
//! 3. **Completion:** `completions` reports finished data accesses, once each.

use crate::common::Cycle;
use crate::core::uop::UopId;

/// Identifier of an instruction fetch.
pub type AccessId = u64;

/// Direction of a data access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Read for a load uop.
    Load,
    /// Write for a committed store uop.
    Store,
}

/// A data access started by the issue stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRequest {
    /// Requesting core.
    pub core: usize,
    /// Requesting hardware thread.
    pub thread: usize,
    /// Uop performing the access.
    pub uop: UopId,
    /// Read or write.
    pub kind: AccessKind,
    /// Effective address.
    pub addr: u64,
}

/// A finished data access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemCompletion {
    /// Uop that performed the access.
    pub uop: UopId,
    /// Read or write.
    pub kind: AccessKind,
}

/// Trait for memory models attached to the pipeline.
///
/// All methods take the current cycle so implementations need no clock of their own.
/// Completions for uops the pipeline no longer tracks are ignored by the caller.
pub trait MemorySystem {
    /// Starts fetching the instruction at `addr` and returns an identifier for it.
    fn start_fetch(&mut self, core: usize, thread: usize, addr: u64, now: Cycle) -> AccessId;

    /// Returns true while the fetch `access` has not finished.
    fn fetch_pending(&self, core: usize, access: AccessId, now: Cycle) -> bool;

    /// Returns true if `core` may start another access of `kind` this cycle.
    fn can_access(&self, core: usize, kind: AccessKind, now: Cycle) -> bool;

    /// Starts a data access.
    fn access(&mut self, request: MemRequest, now: Cycle);

    /// Returns the data accesses of `core` that finished at or before `now`.
    fn completions(&mut self, core: usize, now: Cycle) -> Vec<MemCompletion>;
}
