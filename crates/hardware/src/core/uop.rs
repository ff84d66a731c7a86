//! Micro-operation model and per-core uop arena.
//!
//! This module defines the unit of pipeline tracking. It provides:
//! 1. **Classification:** `UopKind`, a closed set of operation kinds with memory and
//!    control queries.
//! 2. **Decoded Input:** `DecodedUop`, the record a front end supplies for each uop.
//! 3. **In-flight State:** `Uop`, the decoded record plus rename mappings, status flags,
//!    timing and the predictor snapshot.
//! 4. **Ownership:** `UopPool`, an arena keyed by `UopId`. Pipeline structures hold ids,
//!    and a uop is dropped from the arena when its residency set becomes empty.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::common::constants::{IDEP_COUNT, ODEP_COUNT};
use crate::common::error::SimError;
use crate::common::reg::{LogicalReg, PhysReg};
use crate::common::Cycle;
use crate::core::units::bru::PredictionSnapshot;
use crate::core::units::fu::FuClass;

/// Monotonically increasing uop sequence number, unique within a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UopId(pub u64);

impl fmt::Display for UopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operation kind of a uop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum UopKind {
    /// Integer arithmetic.
    Arithmetic,
    /// Bitwise logic.
    Logical,
    /// Floating-point computation.
    FloatingPoint,
    /// Memory read.
    Load,
    /// Memory write.
    Store,
    /// Conditional branch.
    Branch,
    /// Unconditional jump.
    Jump,
    /// Subroutine call.
    Call,
    /// Subroutine return.
    Return,
    /// No operation; also used for wrong-path uops.
    #[default]
    Nop,
}

impl UopKind {
    /// Returns true for loads and stores.
    #[inline]
    pub const fn is_memory(self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }

    /// Returns true for loads.
    #[inline]
    pub const fn is_load(self) -> bool {
        matches!(self, Self::Load)
    }

    /// Returns true for stores.
    #[inline]
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Store)
    }

    /// Returns true for every uop that may redirect control flow.
    #[inline]
    pub const fn is_control(self) -> bool {
        matches!(self, Self::Branch | Self::Jump | Self::Call | Self::Return)
    }

    /// Returns true for calls.
    #[inline]
    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call)
    }

    /// Returns true for returns.
    #[inline]
    pub const fn is_return(self) -> bool {
        matches!(self, Self::Return)
    }

    /// Returns true for conditional branches.
    #[inline]
    pub const fn is_conditional(self) -> bool {
        matches!(self, Self::Branch)
    }

    /// Name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Arithmetic => "Arithmetic",
            Self::Logical => "Logical",
            Self::FloatingPoint => "FloatingPoint",
            Self::Load => "Load",
            Self::Store => "Store",
            Self::Branch => "Branch",
            Self::Jump => "Jump",
            Self::Call => "Call",
            Self::Return => "Return",
            Self::Nop => "Nop",
        }
    }

    /// Number of kinds.
    pub const COUNT: usize = 10;

    /// All kinds in report order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Arithmetic,
        Self::Logical,
        Self::FloatingPoint,
        Self::Load,
        Self::Store,
        Self::Branch,
        Self::Jump,
        Self::Call,
        Self::Return,
        Self::Nop,
    ];

    /// Position in per-kind counter arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for UopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded uop as produced by the front end.
///
/// # Examples
///
/// ```
/// use o3sim_core::common::LogicalReg;
/// use o3sim_core::core::uop::{DecodedUop, UopKind};
///
/// let add = DecodedUop::new(UopKind::Arithmetic, 0x1000, 4)
///     .with_inputs([LogicalReg::Int(1), LogicalReg::Int(2)])
///     .with_outputs([LogicalReg::Int(3)]);
/// assert_eq!(add.neip, 0x1004);
/// assert!(add.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TraceRecord")]
pub struct DecodedUop {
    /// Operation kind
    pub kind: UopKind,
    /// Functional unit class; uops without one execute in a single cycle
    pub fu_class: Option<FuClass>,
    /// Address of the macro-instruction
    pub eip: u64,
    /// Size of the macro-instruction in bytes
    pub size: u32,
    /// Resolved next address
    pub neip: u64,
    /// Logical input registers
    pub inputs: Vec<LogicalReg>,
    /// Logical output registers
    pub outputs: Vec<LogicalReg>,
    /// Effective address of loads and stores
    pub mem_addr: u64,
}

/// Serialized form of a [`DecodedUop`]; an omitted `neip` falls through.
#[derive(Deserialize)]
struct TraceRecord {
    kind: UopKind,
    #[serde(default)]
    fu_class: Option<FuClass>,
    eip: u64,
    size: u32,
    #[serde(default)]
    neip: Option<u64>,
    #[serde(default)]
    inputs: Vec<LogicalReg>,
    #[serde(default)]
    outputs: Vec<LogicalReg>,
    #[serde(default)]
    mem_addr: u64,
}

impl From<TraceRecord> for DecodedUop {
    fn from(r: TraceRecord) -> Self {
        Self {
            kind: r.kind,
            fu_class: r.fu_class,
            eip: r.eip,
            size: r.size,
            neip: r.neip.unwrap_or_else(|| r.eip.wrapping_add(u64::from(r.size))),
            inputs: r.inputs,
            outputs: r.outputs,
            mem_addr: r.mem_addr,
        }
    }
}

impl DecodedUop {
    /// Creates a uop that falls through to `eip + size`.
    pub fn new(kind: UopKind, eip: u64, size: u32) -> Self {
        Self {
            kind,
            fu_class: None,
            eip,
            size,
            neip: eip.wrapping_add(u64::from(size)),
            inputs: Vec::new(),
            outputs: Vec::new(),
            mem_addr: 0,
        }
    }

    /// Sets the functional unit class.
    #[must_use]
    pub const fn with_fu(mut self, class: FuClass) -> Self {
        self.fu_class = Some(class);
        self
    }

    /// Sets the resolved next address.
    #[must_use]
    pub const fn with_target(mut self, neip: u64) -> Self {
        self.neip = neip;
        self
    }

    /// Sets the logical input registers.
    #[must_use]
    pub fn with_inputs(mut self, regs: impl IntoIterator<Item = LogicalReg>) -> Self {
        self.inputs = regs.into_iter().collect();
        self
    }

    /// Sets the logical output registers.
    #[must_use]
    pub fn with_outputs(mut self, regs: impl IntoIterator<Item = LogicalReg>) -> Self {
        self.outputs = regs.into_iter().collect();
        self
    }

    /// Sets the effective address.
    #[must_use]
    pub const fn with_mem_addr(mut self, addr: u64) -> Self {
        self.mem_addr = addr;
        self
    }

    /// Fall-through address. Wraps at the top of the address space.
    #[inline]
    pub const fn fallthrough(&self) -> u64 {
        self.eip.wrapping_add(self.size as u64)
    }

    /// Checks the dependency lists fit the uop shape.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Trace`] if there are too many inputs or outputs, a
    /// register number does not exist in its class, the size is zero or the
    /// instruction runs past the end of the address space.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.size == 0 {
            return Err(SimError::Trace(format!("uop at {:#x} has size 0", self.eip)));
        }
        if self.eip.checked_add(u64::from(self.size)).is_none() {
            return Err(SimError::Trace(format!(
                "uop at {:#x} of size {} overflows the address space",
                self.eip, self.size
            )));
        }
        if self.inputs.len() > IDEP_COUNT {
            return Err(SimError::Trace(format!(
                "uop at {:#x} has {} inputs, at most {IDEP_COUNT} allowed",
                self.eip,
                self.inputs.len()
            )));
        }
        if self.outputs.len() > ODEP_COUNT {
            return Err(SimError::Trace(format!(
                "uop at {:#x} has {} outputs, at most {ODEP_COUNT} allowed",
                self.eip,
                self.outputs.len()
            )));
        }
        if let Some(reg) = self.inputs.iter().chain(&self.outputs).find(|r| !r.is_valid()) {
            return Err(SimError::Trace(format!(
                "uop at {:#x} names nonexistent register {reg}",
                self.eip
            )));
        }
        Ok(())
    }
}

/// Pipeline structure that can hold a uop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Structure {
    /// Fetch queue.
    FetchQueue,
    /// Issue queue.
    Iq,
    /// Load queue.
    Lq,
    /// Store queue.
    Sq,
    /// Reorder buffer.
    Rob,
    /// In-flight execution events.
    EventQueue,
    /// Outstanding memory access.
    Memory,
}

impl Structure {
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of structures currently holding a uop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Residency(u8);

impl Residency {
    /// Returns true if `structure` holds the uop.
    #[inline]
    pub const fn contains(self, structure: Structure) -> bool {
        self.0 & structure.bit() != 0
    }

    /// Returns true if no structure holds the uop.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    const fn insert(&mut self, structure: Structure) {
        self.0 |= structure.bit();
    }

    #[inline]
    const fn remove(&mut self, structure: Structure) {
        self.0 &= !structure.bit();
    }
}

/// An in-flight uop.
#[derive(Clone, Debug)]
pub struct Uop {
    /// Sequence number.
    pub id: UopId,
    /// Owning core.
    pub core: usize,
    /// Owning hardware thread within the core.
    pub thread: usize,
    /// Operation kind.
    pub kind: UopKind,
    /// Functional unit class, if any.
    pub fu_class: Option<FuClass>,
    /// Address of the macro-instruction.
    pub eip: u64,
    /// Resolved next address.
    pub neip: u64,
    /// Predicted next address.
    pub pred_neip: u64,
    /// Size of the macro-instruction in bytes.
    pub size: u32,
    /// Effective address of loads and stores.
    pub mem_addr: u64,
    /// Logical inputs.
    pub idep: [Option<LogicalReg>; IDEP_COUNT],
    /// Logical outputs.
    pub odep: [Option<LogicalReg>; ODEP_COUNT],
    /// Physical registers read by the inputs.
    pub ph_idep: [Option<PhysReg>; IDEP_COUNT],
    /// Physical registers allocated to the outputs.
    pub ph_odep: [Option<PhysReg>; ODEP_COUNT],
    /// Mappings of the outputs before this uop renamed them.
    pub ph_oodep: [Option<PhysReg>; ODEP_COUNT],
    /// Fetched past a mispredicted control uop.
    pub specmode: bool,
    /// Instruction fetch access identifier.
    pub fetch_access: u64,
    /// Structures holding this uop.
    pub residency: Residency,
    /// Operands available (stores: eligible to commit).
    pub ready: bool,
    /// Sent to a functional unit or the memory system.
    pub issued: bool,
    /// Result written back.
    pub completed: bool,
    /// Dispatch order within the core.
    pub di_seq: u64,
    /// Cycle the result becomes available.
    pub when: Cycle,
    /// First cycle the uop tried to reserve a functional unit.
    pub issue_try_when: Option<Cycle>,
    /// Cycle the uop issued.
    pub issue_when: Cycle,
    /// Predictor state at lookup.
    pub prediction: PredictionSnapshot,
}

impl Uop {
    /// Creates an in-flight uop from its decoded record.
    pub fn from_decoded(id: UopId, core: usize, thread: usize, decoded: &DecodedUop) -> Self {
        let mut idep = [None; IDEP_COUNT];
        for (slot, &reg) in idep.iter_mut().zip(&decoded.inputs) {
            *slot = Some(reg);
        }
        let mut odep = [None; ODEP_COUNT];
        for (slot, &reg) in odep.iter_mut().zip(&decoded.outputs) {
            *slot = Some(reg);
        }
        Self {
            id,
            core,
            thread,
            kind: decoded.kind,
            fu_class: decoded.fu_class,
            eip: decoded.eip,
            neip: decoded.neip,
            pred_neip: decoded.neip,
            size: decoded.size,
            mem_addr: decoded.mem_addr,
            idep,
            odep,
            ph_idep: [None; IDEP_COUNT],
            ph_odep: [None; ODEP_COUNT],
            ph_oodep: [None; ODEP_COUNT],
            specmode: false,
            fetch_access: 0,
            residency: Residency::default(),
            ready: false,
            issued: false,
            completed: false,
            di_seq: 0,
            when: 0,
            issue_try_when: None,
            issue_when: 0,
            prediction: PredictionSnapshot::default(),
        }
    }

    /// Fall-through address. Wraps at the top of the address space.
    #[inline]
    pub const fn fallthrough(&self) -> u64 {
        self.eip.wrapping_add(self.size as u64)
    }

    /// Returns true for a control uop whose prediction differs from its outcome.
    #[inline]
    pub const fn is_mispredicted(&self) -> bool {
        self.kind.is_control() && self.neip != self.pred_neip
    }
}

/// Per-core arena of in-flight uops.
#[derive(Debug, Default)]
pub struct UopPool {
    uops: HashMap<UopId, Uop>,
}

impl UopPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a uop held by `structure`.
    ///
    /// # Panics
    ///
    /// Panics if a uop with the same id is already in flight.
    pub fn insert(&mut self, mut uop: Uop, structure: Structure) -> UopId {
        let id = uop.id;
        uop.residency.insert(structure);
        let previous = self.uops.insert(id, uop);
        assert!(previous.is_none(), "uop {id} allocated twice");
        id
    }

    /// Returns the uop if it is still in flight.
    pub fn get(&self, id: UopId) -> Option<&Uop> {
        self.uops.get(&id)
    }

    /// Returns the uop mutably if it is still in flight.
    pub fn get_mut(&mut self, id: UopId) -> Option<&mut Uop> {
        self.uops.get_mut(&id)
    }

    /// Returns true if the uop is still in flight.
    pub fn contains(&self, id: UopId) -> bool {
        self.uops.contains_key(&id)
    }

    /// Number of uops in flight.
    pub fn len(&self) -> usize {
        self.uops.len()
    }

    /// Returns true if no uop is in flight.
    pub fn is_empty(&self) -> bool {
        self.uops.is_empty()
    }

    /// Records that `structure` now holds the uop.
    ///
    /// # Panics
    ///
    /// Panics if the uop is not in flight.
    pub fn enter(&mut self, id: UopId, structure: Structure) {
        self[id].residency.insert(structure);
    }

    /// Records that `structure` released the uop, dropping it once nothing holds it.
    ///
    /// Returns true if the uop left the arena.
    ///
    /// # Panics
    ///
    /// Panics if the uop is not in flight or `structure` did not hold it.
    pub fn leave(&mut self, id: UopId, structure: Structure) -> bool {
        let uop = &mut self[id];
        assert!(
            uop.residency.contains(structure),
            "uop {id} is not held by {structure:?}"
        );
        uop.residency.remove(structure);
        if uop.residency.is_empty() {
            let _ = self.uops.remove(&id);
            true
        } else {
            false
        }
    }
}

impl Index<UopId> for UopPool {
    type Output = Uop;

    fn index(&self, id: UopId) -> &Uop {
        self.uops
            .get(&id)
            .unwrap_or_else(|| panic!("uop {id} is not in flight"))
    }
}

impl IndexMut<UopId> for UopPool {
    fn index_mut(&mut self, id: UopId) -> &mut Uop {
        self.uops
            .get_mut(&id)
            .unwrap_or_else(|| panic!("uop {id} is not in flight"))
    }
}
