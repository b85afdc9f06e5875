// SPDX-License-Identifier: Apache-2.0

//! Scratch (SAR) RAM layout.
//!
//! A small always-powered memory read by the boot firmware on wake.
//! The byte offsets below are a persisted binary contract with that
//! firmware and must not change shape without firmware coordination.

use kregport::RegisterPort;

/// Per-core power-state hint slots.
pub const SCU_OFFSET0: u16 = 0xfe4;
pub const SCU_OFFSET1: u16 = 0xfe8;

/// Per-core wake routine physical-address slots.
pub const CPU0_WAKEUP_NS_PA_ADDR_OFFSET: u16 = 0xa04;
pub const CPU1_WAKEUP_NS_PA_ADDR_OFFSET: u16 = 0xa08;

/// Power-state hints consumed by the wake firmware.
pub const SCU_PM_NORMAL: u32 = 0;
pub const SCU_PM_DORMANT: u32 = 2;
pub const SCU_PM_POWEROFF: u32 = 3;

/// Word access to the scratch RAM.
pub struct SarRam<'a> {
    port: &'a dyn RegisterPort,
}

impl<'a> SarRam<'a> {
    pub fn new(port: &'a dyn RegisterPort) -> Self {
        Self { port }
    }

    pub fn write_word(&self, offs: u16, val: u32) {
        self.port.raw_write(val, offs);
    }

    pub fn read_word(&self, offs: u16) -> u32 {
        self.port.raw_read(offs)
    }
}
