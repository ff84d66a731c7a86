//! Processor, core and hardware thread ownership.
//!
//! This module defines the owned hierarchy the pipeline stages operate on:
//! 1. **Cpu:** The configuration, the cycle counter, the uop sequence counter and
//!    every core. [`Cpu::tick`] advances one cycle.
//! 2. **Core:** Resources shared by the core's threads: the functional unit pool,
//!    the event queue, the uop arena and the thread scheduling cursors.
//! 3. **Thread:** Everything private to one hardware thread: front end, ROB, issue
//!    and load/store queues, register file, branch predictor and an optional
//!    mapped context.

use tracing::trace;

use crate::common::error::{ConfigError, SimError};
use crate::common::reg::RegClass;
use crate::common::Cycle;
use crate::config::Config;
use crate::core::pipeline::frontend::Frontend;
use crate::core::pipeline::queues::{IssueQueue, LoadQueue, QueueLimit, StoreQueue, UopQueue};
use crate::core::pipeline::rename::RegisterFile;
use crate::core::pipeline::rob::Rob;
use crate::core::pipeline::stages::{commit_stage, dispatch_stage, fetch_stage, issue_stage, writeback_stage};
use crate::core::pipeline::event_queue::EventQueue;
use crate::core::units::bru::BranchPredictor;
use crate::core::units::fu::FuPool;
use crate::core::uop::UopPool;
use crate::soc::MemorySystem;
use crate::stats::{CoreStats, ThreadStats};

/// Software context mapped onto a hardware thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    /// Context identifier.
    pub id: usize,
    /// Whether the context may fetch, dispatch and commit.
    pub running: bool,
}

/// One hardware thread.
#[derive(Debug)]
pub struct Thread {
    /// Index within the core.
    pub id: usize,
    /// Mapped context, if any.
    pub context: Option<Context>,
    /// Trace feed and fetch queue.
    pub frontend: Frontend,
    /// Reorder buffer.
    pub rob: Rob,
    /// Issue queue.
    pub iq: IssueQueue,
    /// Load queue.
    pub lq: LoadQueue,
    /// Store queue.
    pub sq: StoreQueue,
    /// Rename table and physical registers.
    pub rf: RegisterFile,
    /// Branch predictor.
    pub bpred: BranchPredictor,
    /// Per-thread counters.
    pub stats: ThreadStats,
    /// Cycle of the last commit, or of the last cycle the thread was not running.
    pub last_commit_cycle: Cycle,
}

impl Thread {
    fn new(id: usize, config: &Config, limits: &QueueLimits) -> Self {
        let threads = config.general.threads;
        Self {
            id,
            context: None,
            frontend: Frontend::new(config.queues.fetch_queue_size),
            rob: Rob::new(limits.rob.per_thread_capacity()),
            iq: UopQueue::new("IQ", limits.iq.per_thread_capacity()),
            lq: UopQueue::new("LQ", limits.lq.per_thread_capacity()),
            sq: UopQueue::new("SQ", limits.sq.per_thread_capacity()),
            rf: RegisterFile::new(&config.queues, threads),
            bpred: BranchPredictor::new(&config.branch_predictor),
            stats: ThreadStats::default(),
            last_commit_cycle: 0,
        }
    }

    /// Returns true if a context is mapped and running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.context.is_some_and(|ctx| ctx.running)
    }

    /// Returns true once no uop of this thread remains anywhere in the pipeline.
    pub fn is_drained(&self) -> bool {
        self.frontend.is_drained()
            && self.rob.is_empty()
            && self.iq.is_empty()
            && self.lq.is_empty()
            && self.sq.is_empty()
    }
}

/// Capacity rules of the per-thread structures of a core.
#[derive(Clone, Copy, Debug)]
pub struct QueueLimits {
    /// Reorder buffer.
    pub rob: QueueLimit,
    /// Issue queue.
    pub iq: QueueLimit,
    /// Load queue.
    pub lq: QueueLimit,
    /// Store queue.
    pub sq: QueueLimit,
}

impl QueueLimits {
    const fn new(config: &Config) -> Self {
        let q = &config.queues;
        let threads = config.general.threads;
        Self {
            rob: QueueLimit::new(q.rob_kind, q.rob_size, threads),
            iq: QueueLimit::new(q.iq_kind, q.iq_size, threads),
            lq: QueueLimit::new(q.lsq_kind, q.lq_size, threads),
            sq: QueueLimit::new(q.lsq_kind, q.sq_size, threads),
        }
    }
}

/// One core and its hardware threads.
#[derive(Debug)]
pub struct Core {
    /// Index within the processor.
    pub id: usize,
    /// Hardware threads.
    pub threads: Vec<Thread>,
    /// Functional unit pool.
    pub fu: FuPool,
    /// Uops executing or waiting for their load data to be consumed.
    pub events: EventQueue,
    /// Arena of every in-flight uop of the core.
    pub uops: UopPool,
    /// Per-core counters.
    pub stats: CoreStats,
    /// Capacity rules of the per-thread structures.
    pub limits: QueueLimits,
    pub(crate) dispatch_current: usize,
    pub(crate) issue_current: usize,
    pub(crate) commit_current: usize,
    pub(crate) di_seq: u64,
}

impl Core {
    fn new(id: usize, config: &Config) -> Self {
        let limits = QueueLimits::new(config);
        Self {
            id,
            threads: (0..config.general.threads)
                .map(|t| Thread::new(t, config, &limits))
                .collect(),
            fu: FuPool::new(&config.functional_units),
            events: EventQueue::new(),
            uops: UopPool::new(),
            stats: CoreStats::default(),
            limits,
            dispatch_current: 0,
            issue_current: 0,
            commit_current: 0,
            di_seq: 0,
        }
    }

    /// Sums `len` over every thread of the core.
    pub fn total(&self, len: impl Fn(&Thread) -> usize) -> usize {
        self.threads.iter().map(len).sum()
    }

    /// Physical registers in use per class, summed over every thread.
    pub fn rf_in_use(&self) -> [usize; RegClass::COUNT] {
        let mut total = [0; RegClass::COUNT];
        for thread in &self.threads {
            for (sum, used) in total.iter_mut().zip(thread.rf.in_use_all()) {
                *sum += used;
            }
        }
        total
    }

    fn sample_occupancy(&mut self) {
        let occ = &mut self.stats.occupancy;
        occ.samples += 1;
        for thread in &self.threads {
            occ.fetch_queue += thread.frontend.queue_len() as u64;
            occ.rob += thread.rob.len() as u64;
            occ.iq += thread.iq.len() as u64;
            occ.lq += thread.lq.len() as u64;
            occ.sq += thread.sq.len() as u64;
        }
    }
}

/// The simulated processor.
///
/// # Examples
///
/// ```
/// use o3sim_core::config::Config;
/// use o3sim_core::core::Cpu;
/// use o3sim_core::soc::FixedLatencyMemory;
///
/// let config = Config::default();
/// let mut memory = FixedLatencyMemory::new(&config.memory, config.general.cores);
/// let mut cpu = Cpu::new(config).unwrap();
/// cpu.tick(&mut memory).unwrap();
/// assert_eq!(cpu.cycle(), 1);
/// ```
#[derive(Debug)]
pub struct Cpu {
    config: Config,
    cores: Vec<Core>,
    cycle: Cycle,
    next_uop: u64,
}

impl Cpu {
    /// Builds every core and thread from `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`Config::validate`].
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let cores = (0..config.general.cores)
            .map(|c| Core::new(c, &config))
            .collect();
        Ok(Self {
            config,
            cores,
            cycle: 0,
            next_uop: 0,
        })
    }

    /// Active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Cycles simulated so far.
    #[inline]
    pub const fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// All cores.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Mutable access to all cores.
    pub fn cores_mut(&mut self) -> &mut [Core] {
        &mut self.cores
    }

    /// Returns hardware thread `thread` of core `core`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoSuchThread`] for an index outside the topology.
    pub fn thread(&self, core: usize, thread: usize) -> Result<&Thread, SimError> {
        self.cores
            .get(core)
            .and_then(|c| c.threads.get(thread))
            .ok_or(SimError::NoSuchThread { core, thread })
    }

    /// Mutable variant of [`thread`](Self::thread).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoSuchThread`] for an index outside the topology.
    pub fn thread_mut(&mut self, core: usize, thread: usize) -> Result<&mut Thread, SimError> {
        self.cores
            .get_mut(core)
            .and_then(|c| c.threads.get_mut(thread))
            .ok_or(SimError::NoSuchThread { core, thread })
    }

    /// Maps a running context onto a hardware thread.
    ///
    /// The watchdog starts counting from the current cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoSuchThread`] for an index outside the topology.
    pub fn map_context(&mut self, core: usize, thread: usize, id: usize) -> Result<(), SimError> {
        let now = self.cycle;
        let t = self.thread_mut(core, thread)?;
        t.context = Some(Context { id, running: true });
        t.last_commit_cycle = now;
        trace!(target: "o3sim::pipeline", core, thread, context = id, "map context");
        Ok(())
    }

    /// Suspends or resumes the context of a hardware thread.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoSuchThread`] for an index outside the topology.
    pub fn set_running(&mut self, core: usize, thread: usize, running: bool) -> Result<(), SimError> {
        if let Some(ctx) = &mut self.thread_mut(core, thread)?.context {
            ctx.running = running;
        }
        Ok(())
    }

    /// Removes the context of a hardware thread and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoSuchThread`] for an index outside the topology.
    pub fn unmap_context(&mut self, core: usize, thread: usize) -> Result<Option<Context>, SimError> {
        let ctx = self.thread_mut(core, thread)?.context.take();
        trace!(target: "o3sim::pipeline", core, thread, "unmap context");
        Ok(ctx)
    }

    /// Advances every core by one cycle.
    ///
    /// Stages run in reverse pipeline order so each one sees the state the later
    /// stages left in the previous cycle: commit, writeback, issue, dispatch,
    /// fetch.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CommitStall`] when a running thread has not committed
    /// for longer than the configured threshold. The processor must not be
    /// ticked again afterwards.
    pub fn tick(&mut self, mem: &mut dyn MemorySystem) -> Result<(), SimError> {
        self.cycle += 1;
        let now = self.cycle;
        for core in &mut self.cores {
            commit_stage(core, &self.config, now)?;
            writeback_stage(core, &self.config, mem, now);
            issue_stage(core, &self.config, mem, now);
            dispatch_stage(core, &self.config, mem, now);
            fetch_stage(core, &self.config, mem, now, &mut self.next_uop);
            if self.config.pipeline.occupancy_stats {
                core.sample_occupancy();
            }
        }
        Ok(())
    }
}
