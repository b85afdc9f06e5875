// SPDX-License-Identifier: Apache-2.0

//! Software register file for host-side tests.
//!
//! Plain registers behave like RAM. A register marked with
//! [`MockPort::set_w1c_bits`] becomes a status register: writes only
//! clear the bits written as one, all other bits are unaffected.
//! Stuck bits and write triggers let tests model hardware that never
//! acknowledges, or that raises a status bit in reaction to a control
//! write.

extern crate alloc;

use alloc::vec::Vec;

use spin::Mutex;

use crate::RegisterPort;

/// Covered register space in 32-bit words (4 KiB of offsets).
const MOCK_WORDS: usize = 1024;

struct Trigger {
    src_offs: u16,
    src_mask: u32,
    dst_offs: u16,
    dst_bits: u32,
    stuck: bool,
}

struct Inner {
    regs: [u32; MOCK_WORDS],
    w1c: [u32; MOCK_WORDS],
    stuck: [u32; MOCK_WORDS],
    triggers: Vec<Trigger>,
    writes: Vec<(u16, u32)>,
    delays_us: u64,
}

/// A journaling register file implementing [`RegisterPort`].
pub struct MockPort {
    inner: Mutex<Inner>,
}

fn index(offs: u16) -> usize {
    assert_eq!(offs % 4, 0, "unaligned register offset {offs:#x}");
    let idx = offs as usize / 4;
    assert!(idx < MOCK_WORDS, "register offset {offs:#x} out of range");
    idx
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                regs: [0; MOCK_WORDS],
                w1c: [0; MOCK_WORDS],
                stuck: [0; MOCK_WORDS],
                triggers: Vec::new(),
                writes: Vec::new(),
                delays_us: 0,
            }),
        }
    }

    /// Marks `mask` bits of the register at `offs` as write-one-to-clear.
    pub fn set_w1c_bits(&self, offs: u16, mask: u32) {
        self.inner.lock().w1c[index(offs)] |= mask;
    }

    /// Forces `mask` bits of the register at `offs` to always read as set.
    pub fn set_stuck_bits(&self, offs: u16, mask: u32) {
        self.inner.lock().stuck[index(offs)] |= mask;
    }

    /// Releases previously stuck bits.
    pub fn clear_stuck_bits(&self, offs: u16, mask: u32) {
        self.inner.lock().stuck[index(offs)] &= !mask;
    }

    /// When a write to `src_offs` sets any bit of `src_mask`, raise
    /// `dst_bits` in the register at `dst_offs`. With `stuck` the
    /// raised bits also become stuck.
    pub fn set_write_trigger(
        &self,
        src_offs: u16,
        src_mask: u32,
        dst_offs: u16,
        dst_bits: u32,
        stuck: bool,
    ) {
        index(src_offs);
        index(dst_offs);
        self.inner.lock().triggers.push(Trigger {
            src_offs,
            src_mask,
            dst_offs,
            dst_bits,
            stuck,
        });
    }

    /// Sets a register directly, bypassing write semantics and the journal.
    pub fn poke(&self, offs: u16, val: u32) {
        self.inner.lock().regs[index(offs)] = val;
    }

    /// Reads a register without going through [`RegisterPort`].
    pub fn peek(&self, offs: u16) -> u32 {
        let inner = self.inner.lock();
        let idx = index(offs);
        inner.regs[idx] | inner.stuck[idx]
    }

    /// All writes issued through the port, in order.
    pub fn writes(&self) -> Vec<(u16, u32)> {
        self.inner.lock().writes.clone()
    }

    /// Values written to the register at `offs`, in order.
    pub fn writes_to(&self, offs: u16) -> Vec<u32> {
        self.inner
            .lock()
            .writes
            .iter()
            .filter(|(o, _)| *o == offs)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Total microseconds spent in `delay_us`.
    pub fn delays_us(&self) -> u64 {
        self.inner.lock().delays_us
    }
}

impl Default for MockPort {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterPort for MockPort {
    fn raw_read(&self, offs: u16) -> u32 {
        let inner = self.inner.lock();
        let idx = index(offs);
        inner.regs[idx] | inner.stuck[idx]
    }

    fn raw_write(&self, val: u32, offs: u16) {
        let mut inner = self.inner.lock();
        let idx = index(offs);
        inner.writes.push((offs, val));
        let w1c = inner.w1c[idx];
        if w1c != 0 {
            // status register: writes only clear
            inner.regs[idx] &= !(val & w1c);
        } else {
            inner.regs[idx] = val;
        }
        let mut raised: Vec<(usize, u32, bool)> = Vec::new();
        for t in &inner.triggers {
            if t.src_offs == offs && (val & t.src_mask) != 0 {
                raised.push((index(t.dst_offs), t.dst_bits, t.stuck));
            }
        }
        for (dst, bits, stuck) in raised {
            inner.regs[dst] |= bits;
            if stuck {
                inner.stuck[dst] |= bits;
            }
        }
    }

    fn delay_us(&self, us: u32) {
        self.inner.lock().delays_us += us as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_registers_behave_like_ram() {
        let port = MockPort::new();
        port.raw_write(0xdead_beef, 0x10);
        assert_eq!(port.raw_read(0x10), 0xdead_beef);
        assert_eq!(port.writes_to(0x10), [0xdead_beef]);
    }

    #[test]
    fn w1c_register_only_clears_written_ones() {
        let port = MockPort::new();
        port.set_w1c_bits(0x20, 0x0000_00ff);
        port.poke(0x20, 0x0000_00f5);
        port.raw_write(0x0000_0005, 0x20);
        assert_eq!(port.raw_read(0x20), 0x0000_00f0);
    }

    #[test]
    fn stuck_bits_survive_w1c_writes() {
        let port = MockPort::new();
        port.set_w1c_bits(0x20, 0x1);
        port.set_stuck_bits(0x20, 0x1);
        port.raw_write(0x1, 0x20);
        assert_eq!(port.raw_read(0x20) & 0x1, 0x1);
        port.clear_stuck_bits(0x20, 0x1);
        port.raw_write(0x1, 0x20);
        assert_eq!(port.raw_read(0x20) & 0x1, 0x0);
    }

    #[test]
    fn write_trigger_raises_status_bits() {
        let port = MockPort::new();
        port.set_w1c_bits(0x40, 0x2);
        port.set_write_trigger(0x30, 0x4, 0x40, 0x2, false);
        port.raw_write(0x4, 0x30);
        assert_eq!(port.raw_read(0x40) & 0x2, 0x2);
        port.raw_write(0x2, 0x40);
        assert_eq!(port.raw_read(0x40) & 0x2, 0x0);
    }

    #[test]
    fn delays_accumulate() {
        let port = MockPort::new();
        port.delay_us(1);
        port.delay_us(4);
        assert_eq!(port.delays_us(), 5);
    }
}
