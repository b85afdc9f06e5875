// SPDX-License-Identifier: Apache-2.0

//! Power-domain and clock-domain state model.
//!
//! A power domain is an independently power-gateable block with a
//! settable target depth; a clock domain is the matching clock-gating
//! unit. Hardware is the source of truth for every state field: this
//! crate only stages values into, and reads them back from, the
//! domain's control and status registers through
//! [`kregport::RegisterPort`]. Nothing is cached.
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate log;

mod clkdm;
mod pwrdm;
mod state;

pub use clkdm::{ClkdmFlags, ClockDomain};
pub use pwrdm::{PowerDomain, lookup};
pub use state::{PwrState, PwrStateMask};
