//! Simulator: owns the processor and its memory system side-by-side.
//!
//! Keeping the memory system outside [`Cpu`] lets each cycle lend it to the
//! pipeline stages as `&mut dyn MemorySystem` without any borrow splitting.

use std::time::Instant;

use tracing::{debug, info};

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::uop::DecodedUop;
use crate::soc::{FixedLatencyMemory, MemorySystem};
use crate::stats::SimStats;

/// Top-level simulator: processor state plus memory system.
pub struct Simulator {
    /// Processor state (cores, threads, counters).
    pub cpu: Cpu,
    memory: Box<dyn MemorySystem>,
    start_time: Instant,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("cpu", &self.cpu)
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Creates a simulator backed by a [`FixedLatencyMemory`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, SimError> {
        let memory = FixedLatencyMemory::new(&config.memory, config.general.cores);
        Self::with_memory(config, Box::new(memory))
    }

    /// Creates a simulator with a caller-supplied memory system.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the configuration is invalid.
    pub fn with_memory(config: Config, memory: Box<dyn MemorySystem>) -> Result<Self, SimError> {
        Ok(Self {
            cpu: Cpu::new(config)?,
            memory,
            start_time: Instant::now(),
        })
    }

    /// Validates `trace`, queues it on a hardware thread and maps a running
    /// context there.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoSuchThread`] for an index outside the topology and
    /// [`SimError::Trace`] for an invalid uop.
    pub fn load_trace(&mut self, core: usize, thread: usize, trace: Vec<DecodedUop>) -> Result<(), SimError> {
        for (n, uop) in trace.iter().enumerate() {
            uop.validate()
                .map_err(|e| SimError::Trace(format!("uop {n}: {e}")))?;
        }
        let len = trace.len();
        self.cpu.thread_mut(core, thread)?.frontend.load(trace);
        let context = core * self.cpu.config().general.threads + thread;
        self.cpu.map_context(core, thread, context)?;
        debug!(core, thread, uops = len, "trace loaded");
        Ok(())
    }

    /// Advances one cycle and unmaps the contexts of threads that finished.
    ///
    /// # Errors
    ///
    /// Returns the watchdog error of [`Cpu::tick`].
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.cpu.tick(self.memory.as_mut())?;
        let finished: Vec<(usize, usize)> = self
            .cpu
            .cores()
            .iter()
            .flat_map(|core| {
                core.threads
                    .iter()
                    .filter(|t| t.context.is_some() && t.is_drained())
                    .map(move |t| (core.id, t.id))
            })
            .collect();
        for (core, thread) in finished {
            let _ = self.cpu.unmap_context(core, thread)?;
            debug!(core, thread, cycle = self.cpu.cycle(), "thread finished");
        }
        Ok(())
    }

    /// Returns true once no context is mapped and no uop is in flight.
    pub fn is_finished(&self) -> bool {
        self.cpu
            .cores()
            .iter()
            .all(|core| core.uops.is_empty() && core.threads.iter().all(|t| t.context.is_none()))
    }

    /// Runs until every thread finished or `max_cycles` cycles were simulated,
    /// and returns the number of cycles run by this call.
    ///
    /// # Errors
    ///
    /// Returns the watchdog error of [`Cpu::tick`]; the simulation must not continue.
    pub fn run(&mut self, max_cycles: u64) -> Result<u64, SimError> {
        let start = self.cpu.cycle();
        info!(cycle = start, max_cycles, "simulation started");
        while !self.is_finished() && self.cpu.cycle() - start < max_cycles {
            self.tick()?;
        }
        let stats = self.stats();
        info!(
            cycles = stats.cycles,
            committed = stats.committed,
            ipc = stats.ipc(),
            finished = self.is_finished(),
            "simulation ended"
        );
        Ok(self.cpu.cycle() - start)
    }

    /// Snapshot of every counter.
    pub fn stats(&self) -> SimStats {
        SimStats::collect(&self.cpu).with_start_time(self.start_time)
    }
}
