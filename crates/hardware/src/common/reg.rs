//! Logical and Physical Register Identifiers.
//!
//! This module provides the register naming used by rename. It provides:
//! 1. **Register Classes:** The four mutually exclusive classes tracked by rename.
//! 2. **Logical Registers:** Architectural register names carried by decoded uops.
//! 3. **Physical Registers:** Indices into a per-class physical register pool.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::{FLAG_LOGICAL_REGS, FP_LOGICAL_REGS, INT_LOGICAL_REGS, VECTOR_LOGICAL_REGS};

/// Register class of a logical or physical register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegClass {
    /// Integer registers.
    Int,
    /// Floating-point registers.
    Fp,
    /// Condition flags.
    Flag,
    /// Vector registers.
    Vector,
}

impl RegClass {
    /// Number of register classes.
    pub const COUNT: usize = 4;

    /// All register classes, in pool order.
    pub const ALL: [Self; Self::COUNT] = [Self::Int, Self::Fp, Self::Flag, Self::Vector];

    /// Position of this class in per-class arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Int => 0,
            Self::Fp => 1,
            Self::Flag => 2,
            Self::Vector => 3,
        }
    }

    /// Number of architectural registers of this class.
    #[inline]
    pub const fn logical_count(self) -> usize {
        match self {
            Self::Int => INT_LOGICAL_REGS,
            Self::Fp => FP_LOGICAL_REGS,
            Self::Flag => FLAG_LOGICAL_REGS,
            Self::Vector => VECTOR_LOGICAL_REGS,
        }
    }

    /// Short lowercase name used in diagnostics and configuration errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Fp => "fp",
            Self::Flag => "flag",
            Self::Vector => "vector",
        }
    }
}

impl fmt::Display for RegClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An architectural register named by a decoded uop.
///
/// Every logical register belongs to exactly one class, so classification of a
/// dependency slot is a match, not a range test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalReg {
    /// Integer register `n`.
    Int(u8),
    /// Floating-point register `n`.
    Fp(u8),
    /// Flag register `n`.
    Flag(u8),
    /// Vector register `n`.
    Vector(u8),
}

impl LogicalReg {
    /// Returns the register class.
    #[inline]
    pub const fn class(self) -> RegClass {
        match self {
            Self::Int(_) => RegClass::Int,
            Self::Fp(_) => RegClass::Fp,
            Self::Flag(_) => RegClass::Flag,
            Self::Vector(_) => RegClass::Vector,
        }
    }

    /// Returns the register number within its class.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Int(n) | Self::Fp(n) | Self::Flag(n) | Self::Vector(n) => n as usize,
        }
    }

    /// Returns true if the register number exists in its class.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.index() < self.class().logical_count()
    }
}

impl fmt::Display for LogicalReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "r{n}"),
            Self::Fp(n) => write!(f, "f{n}"),
            Self::Flag(n) => write!(f, "flag{n}"),
            Self::Vector(n) => write!(f, "v{n}"),
        }
    }
}

/// Index of a physical register inside its class pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PhysReg(pub u16);

impl PhysReg {
    /// Returns the register index as a slice position.
    #[inline]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PhysReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}
