// SPDX-License-Identifier: Apache-2.0

//! Adaptive body-bias (ABB) regulator control.
//!
//! An ABB ldo trades transistor threshold voltage against speed by
//! applying forward or reverse body bias. Selecting an operating point
//! is a hardware handshake: program the selector, raise the change
//! request, and poll a transition-done status bit, each poll bounded
//! so a dead regulator can never wedge the caller.
//!
//! Callers must serialize operations per [`VoltageDomain`]; the
//! sequencer shares registers with no reentrancy guarantee of its own.
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate log;

mod params;
mod voltdm;

pub use params::{AbbFamily, AbbParams};
pub use voltdm::{AbbInstance, VoltageDomain};

/// Poll ceiling for the transition-done handshake, in iterations.
pub const TRANXDONE_TIMEOUT: u32 = 50;

/// ABB ldo operating point selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OperatingPoint {
    /// Nominal voltage operation, no body bias.
    Nominal = 0,
    /// Fast operation with forward body bias.
    Fast = 1,
}

impl OperatingPoint {
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Errors from ABB sequencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbError {
    /// The transition-done status bit did not clear within the poll
    /// ceiling. Terminal for the requested transition.
    TransitionTimeout,
}

impl core::fmt::Display for AbbError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AbbError::TransitionTimeout => {
                write!(f, "ABB transition-done acknowledge timed out")
            }
        }
    }
}

/// Convenience alias for ABB results.
pub type AbbResult<T> = Result<T, AbbError>;
