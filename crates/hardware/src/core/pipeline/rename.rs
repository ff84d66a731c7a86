//! Register Rename Table and Physical Register File.
//!
//! Each hardware thread owns one register file with a pool per register class.
//! A pool has:
//! 1. **RAT:** The current physical mapping of every logical register.
//! 2. **Status:** A busy count and a pending flag per physical register. Busy counts
//!    references from mappings; pending means the producer has not written back.
//! 3. **Free List:** Physical registers with a busy count of zero.
//!
//! Rename allocates a fresh register per output and remembers the previous mapping.
//! Commit releases the previous mapping; recovery undoes renames youngest first.

use crate::common::constants::ODEP_COUNT;
use crate::common::reg::{LogicalReg, PhysReg, RegClass};
use crate::config::{QueueKind, QueuesConfig};
use crate::core::uop::Uop;

/// Register counts of a uop, split by class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepCounts {
    /// Input registers per class.
    pub inputs: [usize; RegClass::COUNT],
    /// Output registers per class.
    pub outputs: [usize; RegClass::COUNT],
}

#[derive(Clone, Debug)]
struct RegPool {
    rat: Vec<PhysReg>,
    busy: Vec<u32>,
    pending: Vec<bool>,
    /// Stack of free registers; the lowest index is allocated first.
    free: Vec<PhysReg>,
}

impl RegPool {
    fn new(logical: usize, size: usize) -> Self {
        let mut busy = vec![0; size];
        busy[..logical].fill(1);
        Self {
            rat: (0..logical).map(|n| PhysReg(n as u16)).collect(),
            busy,
            pending: vec![false; size],
            free: (logical..size).rev().map(|n| PhysReg(n as u16)).collect(),
        }
    }

    fn release(&mut self, phys: PhysReg) {
        let busy = &mut self.busy[phys.slot()];
        assert!(*busy > 0, "release of free physical register {phys}");
        *busy -= 1;
        if *busy == 0 {
            self.pending[phys.slot()] = false;
            self.free.push(phys);
        }
    }
}

/// Per-thread physical register file.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    kind: QueueKind,
    pools: [RegPool; RegClass::COUNT],
    /// Registers a thread (Private) or the whole core (Shared) may hold per class.
    limits: [usize; RegClass::COUNT],
}

impl RegisterFile {
    /// Creates a register file with every logical register mapped to its own
    /// physical register.
    pub fn new(config: &QueuesConfig, threads: usize) -> Self {
        let kind = config.rf_kind;
        let limits = RegClass::ALL.map(|class| match kind {
            QueueKind::Private => config.rf_size(class),
            QueueKind::Shared => config.rf_size(class) * threads,
        });
        let pools = RegClass::ALL.map(|class| RegPool::new(class.logical_count(), limits[class.index()]));
        Self {
            kind,
            pools,
            limits,
        }
    }

    const fn pool(&self, class: RegClass) -> &RegPool {
        &self.pools[class.index()]
    }

    const fn pool_mut(&mut self, class: RegClass) -> &mut RegPool {
        &mut self.pools[class.index()]
    }

    /// Physical registers of `class` currently referenced by this thread.
    pub fn in_use(&self, class: RegClass) -> usize {
        let pool = self.pool(class);
        pool.busy.len() - pool.free.len()
    }

    /// Physical registers of `class` on the free list.
    pub fn free_count(&self, class: RegClass) -> usize {
        self.pool(class).free.len()
    }

    /// In-use counts of every class.
    pub fn in_use_all(&self) -> [usize; RegClass::COUNT] {
        RegClass::ALL.map(|class| self.in_use(class))
    }

    /// Current physical mapping of a logical register.
    pub fn mapping(&self, reg: LogicalReg) -> PhysReg {
        self.pool(reg.class()).rat[reg.index()]
    }

    /// Returns true if `phys` of `class` still waits for its producer.
    pub fn is_pending(&self, class: RegClass, phys: PhysReg) -> bool {
        self.pool(class).pending[phys.slot()]
    }

    /// Classifies the input and output slots of a uop by register class.
    pub fn count_deps(uop: &Uop) -> DepCounts {
        let mut counts = DepCounts::default();
        for reg in uop.idep.iter().flatten() {
            counts.inputs[reg.class().index()] += 1;
        }
        for reg in uop.odep.iter().flatten() {
            counts.outputs[reg.class().index()] += 1;
        }
        counts
    }

    /// Returns true if every output of `uop` can get a physical register.
    ///
    /// Inputs reuse existing mappings, so only outputs consume registers. With a
    /// shared register file `core_in_use` is the in-use count summed over the
    /// core's threads; with a private one it is ignored.
    pub fn can_rename(&self, uop: &Uop, core_in_use: &[usize; RegClass::COUNT]) -> bool {
        let counts = Self::count_deps(uop);
        RegClass::ALL.into_iter().all(|class| {
            let needed = counts.outputs[class.index()];
            let in_use = match self.kind {
                QueueKind::Private => self.in_use(class),
                QueueKind::Shared => core_in_use[class.index()],
            };
            in_use + needed <= self.limits[class.index()] && needed <= self.free_count(class)
        })
    }

    /// Binds inputs to their current mappings and allocates outputs.
    ///
    /// # Panics
    ///
    /// Panics if a class has no free register; dispatch must check
    /// [`can_rename`](Self::can_rename) first.
    pub fn rename(&mut self, uop: &mut Uop) {
        for (slot, reg) in uop.idep.into_iter().enumerate() {
            uop.ph_idep[slot] = reg.map(|reg| self.mapping(reg));
        }
        for slot in 0..ODEP_COUNT {
            let Some(reg) = uop.odep[slot] else {
                continue;
            };
            let pool = self.pool_mut(reg.class());
            let Some(phys) = pool.free.pop() else {
                panic!("rename of {} without a free {} register", uop.id, reg.class());
            };
            pool.busy[phys.slot()] += 1;
            pool.pending[phys.slot()] = true;
            uop.ph_oodep[slot] = Some(pool.rat[reg.index()]);
            uop.ph_odep[slot] = Some(phys);
            pool.rat[reg.index()] = phys;
        }
    }

    /// Returns true if no input of `uop` waits for a producer.
    pub fn ready(&self, uop: &Uop) -> bool {
        uop.idep
            .iter()
            .zip(&uop.ph_idep)
            .all(|(reg, phys)| match (reg, phys) {
                (Some(reg), Some(phys)) => !self.is_pending(reg.class(), *phys),
                _ => true,
            })
    }

    /// Marks the outputs of `uop` as written.
    pub fn write(&mut self, uop: &Uop) {
        for (reg, phys) in uop.odep.iter().zip(&uop.ph_odep) {
            if let (Some(reg), Some(phys)) = (reg, phys) {
                self.pool_mut(reg.class()).pending[phys.slot()] = false;
            }
        }
    }

    /// Releases the mappings `uop` replaced.
    pub fn commit(&mut self, uop: &Uop) {
        for (reg, old) in uop.odep.iter().zip(&uop.ph_oodep) {
            if let (Some(reg), Some(old)) = (reg, old) {
                self.pool_mut(reg.class()).release(*old);
            }
        }
    }

    /// Reverts the renames of a squashed uop, last output first.
    ///
    /// # Panics
    ///
    /// Panics if a logical register is no longer mapped to the register `uop`
    /// allocated, which means uops were undone out of order.
    pub fn undo(&mut self, uop: &Uop) {
        for slot in (0..ODEP_COUNT).rev() {
            let (Some(reg), Some(phys), Some(old)) =
                (uop.odep[slot], uop.ph_odep[slot], uop.ph_oodep[slot])
            else {
                continue;
            };
            let pool = self.pool_mut(reg.class());
            assert_eq!(
                pool.rat[reg.index()],
                phys,
                "undo of {} out of order for {reg}",
                uop.id
            );
            pool.release(phys);
            pool.rat[reg.index()] = old;
        }
    }
}
