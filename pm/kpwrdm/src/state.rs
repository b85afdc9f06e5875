// SPDX-License-Identifier: Apache-2.0

//! Power states and capability masks.

use bitflags::bitflags;

/// A power-domain state, ordered deepest to shallowest by numeric
/// value: OFF < RETENTION < INACTIVE < ON.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PwrState {
    /// Power gated, context lost.
    Off = 0,
    /// Main rail off, logic held on a low-voltage retention rail.
    Retention = 1,
    /// Clocked down but powered.
    Inactive = 2,
    /// Fully powered and clocked.
    On = 3,
}

impl PwrState {
    /// Register field encoding.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Decodes a two-bit register field.
    pub fn from_raw(v: u32) -> Self {
        match v & 0x3 {
            0 => PwrState::Off,
            1 => PwrState::Retention,
            2 => PwrState::Inactive,
            _ => PwrState::On,
        }
    }
}

impl core::fmt::Display for PwrState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            PwrState::Off => "OFF",
            PwrState::Retention => "RET",
            PwrState::Inactive => "INACTIVE",
            PwrState::On => "ON",
        })
    }
}

bitflags! {
    /// Which states a domain can legally be programmed into. An empty
    /// mask marks a read-only or reserved state register that software
    /// must not write.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PwrStateMask: u8 {
        const OFF = 1 << 0;
        const RET = 1 << 1;
        const INACTIVE = 1 << 2;
        const ON = 1 << 3;
    }
}

impl PwrStateMask {
    /// Whether `state` is legal for this mask.
    pub fn allows(self, state: PwrState) -> bool {
        self.bits() & (1 << state as u8) != 0
    }

    /// The deepest achievable state for a requested minimum depth.
    ///
    /// Domains have varied capabilities; forcing one into a state it
    /// does not support destabilizes the system. Of the legal states
    /// that meet or exceed `req_min` this picks the shallowest
    /// qualifying depth, and falls back to ON when nothing qualifies.
    pub fn achievable(self, req_min: PwrState) -> PwrState {
        let candidates = self.bits() & (0xffu8 << req_min as u8);
        if candidates != 0 {
            PwrState::from_raw(candidates.trailing_zeros())
        } else {
            PwrState::On
        }
    }
}
