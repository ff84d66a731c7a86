//! Fixed-latency memory system.
//!
//! Every instruction fetch, load and store completes a configured number of cycles
//! after it starts. An optional port count limits the data accesses a core may start
//! per cycle.

use std::collections::HashMap;

use tracing::trace;

use super::traits::{AccessId, AccessKind, MemCompletion, MemRequest, MemorySystem};
use crate::common::Cycle;
use crate::config::MemoryConfig;

/// Data accesses started by one core in one cycle.
#[derive(Clone, Copy, Debug, Default)]
struct PortUse {
    cycle: Cycle,
    used: usize,
}

/// Fixed-latency memory model.
#[derive(Clone, Debug)]
pub struct FixedLatencyMemory {
    config: MemoryConfig,
    next_fetch: AccessId,
    /// Outstanding fetches and the cycle they finish.
    fetches: HashMap<AccessId, Cycle>,
    /// Outstanding data accesses per core.
    pending: Vec<Vec<(Cycle, MemCompletion)>>,
    ports: Vec<PortUse>,
}

impl FixedLatencyMemory {
    /// Creates a memory system serving `cores` cores.
    pub fn new(config: &MemoryConfig, cores: usize) -> Self {
        Self {
            config: config.clone(),
            next_fetch: 0,
            fetches: HashMap::new(),
            pending: vec![Vec::new(); cores],
            ports: vec![PortUse::default(); cores],
        }
    }

    /// Data accesses still in flight across all cores.
    pub fn outstanding(&self) -> usize {
        self.pending.iter().map(Vec::len).sum()
    }

    const fn latency(&self, kind: AccessKind) -> Cycle {
        match kind {
            AccessKind::Load => self.config.load_latency,
            AccessKind::Store => self.config.store_latency,
        }
    }
}

impl MemorySystem for FixedLatencyMemory {
    fn start_fetch(&mut self, _core: usize, _thread: usize, _addr: u64, now: Cycle) -> AccessId {
        self.fetches.retain(|_, done| *done > now);
        self.next_fetch += 1;
        let _ = self
            .fetches
            .insert(self.next_fetch, now + self.config.fetch_latency);
        self.next_fetch
    }

    fn fetch_pending(&self, _core: usize, access: AccessId, now: Cycle) -> bool {
        self.fetches.get(&access).is_some_and(|done| *done > now)
    }

    fn can_access(&self, core: usize, _kind: AccessKind, now: Cycle) -> bool {
        match self.config.ports {
            None => true,
            Some(ports) => {
                let port = self.ports[core];
                port.cycle != now || port.used < ports
            }
        }
    }

    fn access(&mut self, request: MemRequest, now: Cycle) {
        let port = &mut self.ports[request.core];
        if port.cycle == now {
            port.used += 1;
        } else {
            *port = PortUse { cycle: now, used: 1 };
        }
        let done = now + self.latency(request.kind);
        trace!(
            target: "o3sim::memory",
            uop = %request.uop,
            kind = ?request.kind,
            addr = request.addr,
            done,
            "access"
        );
        self.pending[request.core].push((
            done,
            MemCompletion {
                uop: request.uop,
                kind: request.kind,
            },
        ));
    }

    fn completions(&mut self, core: usize, now: Cycle) -> Vec<MemCompletion> {
        let queue = &mut self.pending[core];
        let mut done: Vec<(Cycle, MemCompletion)> = Vec::new();
        queue.retain(|entry| {
            if entry.0 <= now {
                done.push(*entry);
                false
            } else {
                true
            }
        });
        done.sort_unstable_by_key(|(cycle, completion)| (*cycle, completion.uop));
        done.into_iter().map(|(_, completion)| completion).collect()
    }
}
