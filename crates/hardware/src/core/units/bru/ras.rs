//! Return Address Stack (RAS).
//!
//! The RAS is a circular buffer of return addresses. Calls write at the current
//! index and advance it, returns step back and read. Overflow silently wraps and
//! overwrites the oldest entry. Only the index is checkpointed per control uop, so
//! recovery restores the top of stack but not overwritten contents.

/// Return Address Stack structure.
#[derive(Clone, Debug)]
pub struct Ras {
    /// Circular storage.
    stack: Vec<u64>,
    /// Slot the next push writes.
    idx: usize,
}

impl Ras {
    /// Creates a RAS of `size` zeroed entries.
    pub fn new(size: usize) -> Self {
        Self {
            stack: vec![0; size],
            idx: 0,
        }
    }

    /// Pushes a return address, wrapping on overflow.
    pub fn push(&mut self, addr: u64) {
        self.stack[self.idx] = addr;
        self.idx = (self.idx + 1) % self.stack.len();
    }

    /// Pops the most recent return address.
    ///
    /// An empty stack is not tracked; popping past the oldest push reads whatever
    /// the wrapped slot holds.
    pub fn pop(&mut self) -> u64 {
        self.idx = (self.idx + self.stack.len() - 1) % self.stack.len();
        self.stack[self.idx]
    }

    /// Current index.
    #[inline]
    pub const fn index(&self) -> usize {
        self.idx
    }

    /// Restores a previously recorded index.
    #[inline]
    pub const fn restore(&mut self, idx: usize) {
        self.idx = idx;
    }
}
