// SPDX-License-Identifier: Apache-2.0

//! Voltage domains and their attached ABB instances.

use kregport::RegisterPort;

use crate::{AbbError, AbbParams, AbbResult, OperatingPoint, TRANXDONE_TIMEOUT};

/// One ABB controller attached to a voltage domain.
pub struct AbbInstance {
    setup_offs: u16,
    ctrl_offs: u16,
    /// Interrupt-status register carrying the transition-done bit.
    irqstatus_offs: u16,
    done_st_mask: u32,
    enabled: bool,
    params: &'static AbbParams,
}

impl AbbInstance {
    pub fn new(
        setup_offs: u16,
        ctrl_offs: u16,
        irqstatus_offs: u16,
        done_st_mask: u32,
        params: &'static AbbParams,
    ) -> Self {
        Self {
            setup_offs,
            ctrl_offs,
            irqstatus_offs,
            done_st_mask,
            enabled: false,
            params,
        }
    }

    /// Whether the SR2 ldo enable bit has been set through
    /// [`VoltageDomain::abb_enable`].
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// A regulator rail. Owns at most one [`AbbInstance`]; created at
/// platform init and never destroyed.
pub struct VoltageDomain<'a> {
    name: &'static str,
    sys_clk_rate_hz: u32,
    port: &'a dyn RegisterPort,
    abb: Option<AbbInstance>,
}

fn div_round_closest(n: u32, d: u32) -> u32 {
    (n + d / 2) / d
}

/// Bounded clear-and-recheck of the transition-done status bit.
///
/// Hardware keeps the bit asserted while a transition is pending, so
/// the loop exits the moment a clear sticks. Each retry is separated
/// by a fixed 1 us delay.
fn wait_tranxdone(port: &dyn RegisterPort, abb: &AbbInstance, name: &str) -> AbbResult<()> {
    for _ in 0..TRANXDONE_TIMEOUT {
        port.raw_write(abb.done_st_mask, abb.irqstatus_offs);
        if port.read_bits(abb.done_st_mask, abb.irqstatus_offs) == 0 {
            return Ok(());
        }
        port.delay_us(1);
    }
    warn!("vdd_{name}: ABB transition-done timeout");
    Err(AbbError::TransitionTimeout)
}

impl<'a> VoltageDomain<'a> {
    pub fn new(
        name: &'static str,
        sys_clk_rate_hz: u32,
        port: &'a dyn RegisterPort,
        abb: Option<AbbInstance>,
    ) -> Self {
        Self {
            name,
            sys_clk_rate_hz,
            port,
            abb,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn abb(&self) -> Option<&AbbInstance> {
        self.abb.as_ref()
    }

    /// Selects an ABB operating point.
    ///
    /// Two-phase handshake: drain any stale transition-done status,
    /// program the selector and raise the change request, then wait
    /// for the new point to be acknowledged. If the initial drain
    /// times out, the control register is left untouched.
    pub fn abb_set_operating_point(&mut self, target: OperatingPoint) -> AbbResult<()> {
        let port = self.port;
        let name = self.name;
        let Some(abb) = self.abb.as_ref() else {
            return Ok(());
        };

        wait_tranxdone(port, abb, name)?;

        // Program the next operating point. The selector must be in
        // place before the change request: hardware latches it on the
        // rising edge of the request bit.
        port.rmw(
            abb.params.opp_sel_mask,
            target.raw() << abb.params.opp_sel_shift,
            abb.ctrl_offs,
        );

        // initiate the ldo change
        port.rmw(
            abb.params.opp_change_mask,
            abb.params.opp_change_mask,
            abb.ctrl_offs,
        );

        wait_tranxdone(port, abb, name)
    }

    /// Sets the SR2 ldo enable bit. No-op if already enabled.
    pub fn abb_enable(&mut self) {
        let port = self.port;
        let Some(abb) = self.abb.as_mut() else {
            return;
        };
        if abb.enabled {
            return;
        }
        abb.enabled = true;
        port.rmw(abb.params.sr2en_mask, abb.params.sr2en_mask, abb.setup_offs);
    }

    /// Clears the SR2 ldo enable bit. No-op if already disabled.
    pub fn abb_disable(&mut self) {
        let port = self.port;
        let Some(abb) = self.abb.as_mut() else {
            return;
        };
        if !abb.enabled {
            return;
        }
        abb.enabled = false;
        port.rmw(abb.params.sr2en_mask, 0, abb.setup_offs);
    }

    /// One-time ABB setup for forward body-bias.
    ///
    /// Returns immediately for domains without an ABB instance.
    pub fn abb_init(&mut self) {
        let port = self.port;
        let name = self.name;
        let sys_clk_rate_hz = self.sys_clk_rate_hz;
        let Some(abb) = self.abb.as_ref() else {
            return;
        };

        // SR2_WTCNT_VALUE holds the expected settling time for an ldo
        // transition, expressed against the ABB cycle rate and the
        // board's system clock:
        //
        //   SR2_WTCNT_VALUE = SettlingTime / (CycleRate / SysClkRate)
        //
        // with SettlingTime in microseconds and SysClkRate in MHz.
        // Both CycleRate and SettlingTime are scaled by 10 before
        // dividing so the integer result keeps the precision of the
        // qualified constants.
        let sys_clk_mhz = div_round_closest(sys_clk_rate_hz, 1_000_000).max(1);
        let cycle_rate = div_round_closest(abb.params.cycle_rate * 10, sys_clk_mhz).max(1);
        let sr2_wt_cnt_val = div_round_closest(abb.params.settling_time_us * 10, cycle_rate);

        port.rmw(
            abb.params.sr2_wtcnt_value_mask,
            sr2_wt_cnt_val << abb.params.sr2_wtcnt_value_shift,
            abb.setup_offs,
        );

        // allow forward body-bias
        port.rmw(
            abb.params.active_fbb_sel_mask,
            abb.params.active_fbb_sel_mask,
            abb.setup_offs,
        );

        self.abb_enable();
        debug!("vdd_{name}: ABB ready, wtcnt={sr2_wt_cnt_val}");
    }
}
