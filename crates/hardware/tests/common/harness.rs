//! Simulator harness.

use o3sim_core::config::Config;
use o3sim_core::core::uop::DecodedUop;
use o3sim_core::core::{Cpu, Thread};
use o3sim_core::soc::MemorySystem;
use o3sim_core::stats::SimStats;
use o3sim_core::Simulator;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber honoring `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A single-core, single-thread configuration with the given widths.
pub fn narrow_config(width: usize) -> Config {
    let mut config = Config::default();
    config.pipeline.fetch_width = width;
    config.pipeline.dispatch_width = width;
    config.pipeline.issue_width = width;
    config.pipeline.commit_width = width;
    config
}

pub struct TestContext {
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        Self {
            sim: Simulator::new(config).expect("valid test configuration"),
        }
    }

    pub fn with_memory(config: Config, memory: Box<dyn MemorySystem>) -> Self {
        init_tracing();
        Self {
            sim: Simulator::with_memory(config, memory).expect("valid test configuration"),
        }
    }

    /// Queues `trace` on a hardware thread and maps a running context.
    pub fn load(mut self, core: usize, thread: usize, trace: Vec<DecodedUop>) -> Self {
        self.sim
            .load_trace(core, thread, trace)
            .expect("valid test trace");
        self
    }

    /// Convenience accessor for the CPU.
    pub fn cpu(&self) -> &Cpu {
        &self.sim.cpu
    }

    /// Mutable convenience accessor for the CPU.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.sim.cpu
    }

    pub fn thread(&self, core: usize, thread: usize) -> &Thread {
        self.sim.cpu.thread(core, thread).expect("thread exists")
    }

    /// Ticks `n` cycles, panicking on a simulation error.
    pub fn step(&mut self, n: u64) {
        for _ in 0..n {
            self.sim.tick().expect("tick");
        }
    }

    /// Runs until every thread finished and returns the cycles taken.
    pub fn run_to_completion(&mut self, max_cycles: u64) -> u64 {
        let cycles = self.sim.run(max_cycles).expect("simulation error");
        assert!(self.sim.is_finished(), "not finished after {max_cycles} cycles");
        cycles
    }

    pub fn stats(&self) -> SimStats {
        self.sim.stats()
    }
}
