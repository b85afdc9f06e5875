// SPDX-License-Identifier: Apache-2.0

//! Clock domains: transition-control programming.

use core::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use kregport::RegisterPort;

/// CLKTRCTRL: clock-domain transition control field.
const CLKTRCTRL_MASK: u32 = 0x3;

const CLKTRCTRL_SW_SLEEP: u32 = 0x1;
const CLKTRCTRL_SW_WKUP: u32 = 0x2;
const CLKTRCTRL_HW_AUTO: u32 = 0x3;

bitflags! {
    /// What transitions the domain's hardware supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClkdmFlags: u8 {
        const CAN_ENABLE_AUTO = 1 << 0;
        const CAN_FORCE_SLEEP = 1 << 1;
        const CAN_FORCE_WAKEUP = 1 << 2;
    }
}

/// A clock-gateable unit paired with a power domain.
pub struct ClockDomain<'a> {
    name: &'static str,
    port: &'a dyn RegisterPort,
    clktrctrl_offs: u16,
    flags: ClkdmFlags,
    usecount: AtomicU32,
}

impl<'a> ClockDomain<'a> {
    pub fn new(
        name: &'static str,
        port: &'a dyn RegisterPort,
        clktrctrl_offs: u16,
        flags: ClkdmFlags,
        usecount: u32,
    ) -> Self {
        Self {
            name,
            port,
            clktrctrl_offs,
            flags,
            usecount: AtomicU32::new(usecount),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn flags(&self) -> ClkdmFlags {
        self.flags
    }

    /// Active users of clocks in this domain.
    pub fn usecount(&self) -> u32 {
        self.usecount.load(Ordering::Relaxed)
    }

    /// Hands the domain to hardware-supervised idle.
    pub fn allow_idle(&self) {
        trace!("clockdomain {}: hardware-supervised idle", self.name);
        self.port
            .rmw(CLKTRCTRL_MASK, CLKTRCTRL_HW_AUTO, self.clktrctrl_offs);
    }

    /// Starts a software-forced sleep transition.
    pub fn force_sleep(&self) {
        trace!("clockdomain {}: force sleep", self.name);
        self.port
            .rmw(CLKTRCTRL_MASK, CLKTRCTRL_SW_SLEEP, self.clktrctrl_offs);
    }

    /// Starts a software-forced wakeup transition.
    pub fn force_wakeup(&self) {
        trace!("clockdomain {}: force wakeup", self.name);
        self.port
            .rmw(CLKTRCTRL_MASK, CLKTRCTRL_SW_WKUP, self.clktrctrl_offs);
    }
}
