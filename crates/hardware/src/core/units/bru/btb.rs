//! Branch Target Buffer (BTB).
//!
//! The BTB is a direct-mapped table that remembers, for each control uop seen at
//! commit, its resolved destination, its size and its kind. The kind lets the
//! predictor treat a hit as a call (push the RAS) or a return (pop the RAS) before
//! the uop itself is executed.

use crate::core::uop::UopKind;

/// An entry in the Branch Target Buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BtbEntry {
    /// Address of the control uop that wrote the entry.
    pub source: u64,
    /// Resolved next address of that uop.
    pub dest: u64,
    /// Size of the macro-instruction in bytes.
    pub size: u32,
    /// Control kind of the uop.
    pub kind: UopKind,
}

/// Branch Target Buffer structure.
#[derive(Clone, Debug)]
pub struct Btb {
    /// `sets * assoc` direct-mapped slots.
    table: Vec<Option<BtbEntry>>,
}

impl Btb {
    /// Creates an empty BTB with `sets * assoc` entries.
    ///
    /// The geometry is validated by the configuration; the associativity only
    /// scales the number of direct-mapped slots.
    pub fn new(sets: usize, assoc: usize) -> Self {
        Self {
            table: vec![None; sets * assoc],
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the BTB has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Slot used by the control uop at `pc`.
    #[inline]
    pub fn index(&self, pc: u64) -> usize {
        (pc % self.table.len() as u64) as usize
    }

    /// Returns the entry for `pc` if its slot was last written by `pc`.
    pub fn lookup(&self, pc: u64) -> Option<&BtbEntry> {
        self.table[self.index(pc)]
            .as_ref()
            .filter(|entry| entry.source == pc)
    }

    /// Overwrites the slot of `entry.source`.
    pub fn update(&mut self, entry: BtbEntry) {
        let idx = self.index(entry.source);
        self.table[idx] = Some(entry);
    }
}
