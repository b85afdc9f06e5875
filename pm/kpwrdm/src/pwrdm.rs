// SPDX-License-Identifier: Apache-2.0

//! Power domains: staged target state and reached-state readback.

use kregport::RegisterPort;

use crate::{PwrState, PwrStateMask};

/// PWRSTCTRL: target power state for the next transition.
const POWERSTATE_MASK: u32 = 0x3;
/// PWRSTCTRL: logic retention state, 1 = retained, 0 = off.
const LOGICRETSTATE_MASK: u32 = 0x1 << 2;
const LOGICRETSTATE_SHIFT: u32 = 2;
/// PWRSTST: last state the domain actually entered. Write-one-to-clear.
const LASTPOWERSTATEENTERED_MASK: u32 = 0x3 << 24;
const LASTPOWERSTATEENTERED_SHIFT: u32 = 24;

/// An independently power-gateable block.
///
/// Owned by the platform's domain registry; the PM core holds
/// references only. All state accessors go straight to hardware.
pub struct PowerDomain<'a> {
    name: &'static str,
    port: &'a dyn RegisterPort,
    pwrstctrl_offs: u16,
    pwrstst_offs: u16,
    pwrsts: PwrStateMask,
    pwrsts_logic_ret: PwrStateMask,
}

impl<'a> PowerDomain<'a> {
    pub fn new(
        name: &'static str,
        port: &'a dyn RegisterPort,
        pwrstctrl_offs: u16,
        pwrstst_offs: u16,
        pwrsts: PwrStateMask,
        pwrsts_logic_ret: PwrStateMask,
    ) -> Self {
        Self {
            name,
            port,
            pwrstctrl_offs,
            pwrstst_offs,
            pwrsts,
            pwrsts_logic_ret,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Legal power states for this domain.
    pub fn pwrsts(&self) -> PwrStateMask {
        self.pwrsts
    }

    /// Legal logic-retention states; empty means the logic state
    /// register is read-only or reserved.
    pub fn pwrsts_logic_ret(&self) -> PwrStateMask {
        self.pwrsts_logic_ret
    }

    /// Stages the target state for the next power transition.
    pub fn set_next_pwrst(&self, state: PwrState) {
        trace!("powerdomain {}: next state {state}", self.name);
        self.port
            .rmw(POWERSTATE_MASK, state.raw(), self.pwrstctrl_offs);
    }

    /// Reads back the currently staged target state.
    pub fn read_next_pwrst(&self) -> PwrState {
        PwrState::from_raw(self.port.read_bits(POWERSTATE_MASK, self.pwrstctrl_offs))
    }

    /// The state the domain actually reached in its last transition.
    pub fn read_prev_pwrst(&self) -> PwrState {
        PwrState::from_raw(
            self.port
                .read_bits(LASTPOWERSTATEENTERED_MASK, self.pwrstst_offs)
                >> LASTPOWERSTATEENTERED_SHIFT,
        )
    }

    /// Clears the reached-state history ahead of a new transition.
    pub fn clear_all_prev_pwrst(&self) {
        self.port
            .raw_write(LASTPOWERSTATEENTERED_MASK, self.pwrstst_offs);
    }

    /// Stages the logic state to hold while the domain is in retention.
    pub fn set_logic_retst(&self, state: PwrState) {
        let bit = match state {
            PwrState::Retention => 1,
            _ => 0,
        };
        trace!("powerdomain {}: logic retention state {state}", self.name);
        self.port.rmw(
            LOGICRETSTATE_MASK,
            bit << LOGICRETSTATE_SHIFT,
            self.pwrstctrl_offs,
        );
    }

    /// Reads back the staged logic retention state.
    pub fn read_logic_retst(&self) -> PwrState {
        if self
            .port
            .read_bits(LOGICRETSTATE_MASK, self.pwrstctrl_offs)
            != 0
        {
            PwrState::Retention
        } else {
            PwrState::Off
        }
    }
}

/// Finds a domain by name in an externally owned registry slice.
pub fn lookup<'d, 'a>(
    domains: &'d [PowerDomain<'a>],
    name: &str,
) -> Option<&'d PowerDomain<'a>> {
    domains.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use kregport::mock::MockPort;

    use super::*;

    const CTRL: u16 = 0x00;
    const ST: u16 = 0x04;

    fn domain(port: &MockPort) -> PowerDomain<'_> {
        PowerDomain::new(
            "per_pwrdm",
            port,
            CTRL,
            ST,
            PwrStateMask::ON | PwrStateMask::RET | PwrStateMask::OFF,
            PwrStateMask::RET | PwrStateMask::OFF,
        )
    }

    #[test]
    fn next_state_round_trips_through_the_register() {
        let port = MockPort::new();
        let pwrdm = domain(&port);

        pwrdm.set_next_pwrst(PwrState::Retention);
        assert_eq!(port.peek(CTRL) & 0x3, 0x1);
        assert_eq!(pwrdm.read_next_pwrst(), PwrState::Retention);
    }

    #[test]
    fn logic_state_uses_its_own_field() {
        let port = MockPort::new();
        let pwrdm = domain(&port);

        pwrdm.set_next_pwrst(PwrState::On);
        pwrdm.set_logic_retst(PwrState::Retention);
        assert_eq!(pwrdm.read_logic_retst(), PwrState::Retention);
        // power-state field untouched
        assert_eq!(pwrdm.read_next_pwrst(), PwrState::On);

        pwrdm.set_logic_retst(PwrState::Off);
        assert_eq!(pwrdm.read_logic_retst(), PwrState::Off);
    }

    #[test]
    fn prev_state_reads_the_history_field() {
        let port = MockPort::new();
        port.set_w1c_bits(ST, 0x3 << 24);
        let pwrdm = domain(&port);

        port.poke(ST, (PwrState::Retention.raw()) << 24);
        assert_eq!(pwrdm.read_prev_pwrst(), PwrState::Retention);

        pwrdm.clear_all_prev_pwrst();
        assert_eq!(pwrdm.read_prev_pwrst(), PwrState::Off);
    }

    #[test]
    fn lookup_finds_domains_by_name() {
        let port = MockPort::new();
        let domains = [domain(&port)];

        assert!(lookup(&domains, "per_pwrdm").is_some());
        assert!(lookup(&domains, "mpu_pwrdm").is_none());
    }
}
