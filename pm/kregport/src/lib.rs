// SPDX-License-Identifier: Apache-2.0

//! Control register access contract for the power-management core.
//!
//! Every hardware touch in the PM crates goes through [`RegisterPort`]:
//! a read/modify/write view of a register block addressed by offsets
//! relative to a block-specific base, plus the busy-delay primitive the
//! bounded poll loops are built on. The production implementation is
//! [`MmioPort`]; tests use the journaling register file in [`mock`].
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "mock")]
pub mod mock;

/// Read/modify/write access to a memory-mapped register block.
///
/// Offsets are byte offsets from the block base and must be 32-bit
/// aligned. Atomicity with respect to other writers of the same
/// register is the caller's responsibility.
pub trait RegisterPort {
    /// Reads the whole register at `offs`.
    fn raw_read(&self, offs: u16) -> u32;

    /// Writes the whole register at `offs`.
    fn raw_write(&self, val: u32, offs: u16);

    /// Reads the bits selected by `mask` from the register at `offs`.
    fn read_bits(&self, mask: u32, offs: u16) -> u32 {
        self.raw_read(offs) & mask
    }

    /// Read-modify-write of the field selected by `mask`.
    ///
    /// Bits of `val` outside `mask` are ignored. Returns the value
    /// written back.
    fn rmw(&self, mask: u32, val: u32, offs: u16) -> u32 {
        let v = (self.raw_read(offs) & !mask) | (val & mask);
        self.raw_write(v, offs);
        v
    }

    /// Busy-waits for at least `us` microseconds.
    ///
    /// Strictly monotonic; there is no cooperative yield. Poll loops
    /// in the PM core rely on this to bound their CPU cost.
    fn delay_us(&self, us: u32);
}

/// [`RegisterPort`] over a directly mapped register block.
pub struct MmioPort {
    base: usize,
    delay: fn(u32),
}

impl MmioPort {
    /// Creates a port over the block mapped at `base`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `base` is a valid mapping of the
    /// register block for the port's whole lifetime and that no other
    /// code concurrently accesses the same registers outside this
    /// port. `delay` must busy-wait for at least the requested number
    /// of microseconds.
    pub const unsafe fn new(base: usize, delay: fn(u32)) -> Self {
        Self { base, delay }
    }
}

impl RegisterPort for MmioPort {
    fn raw_read(&self, offs: u16) -> u32 {
        unsafe { ((self.base + offs as usize) as *const u32).read_volatile() }
    }

    fn raw_write(&self, val: u32, offs: u16) {
        unsafe { ((self.base + offs as usize) as *mut u32).write_volatile(val) }
    }

    fn delay_us(&self, us: u32) {
        (self.delay)(us);
    }
}
