// SPDX-License-Identifier: Apache-2.0

//! Per-silicon-family ABB register layout and timing constants.
//!
//! The mask/shift layout and the ldo settling characteristics vary per
//! silicon family but are shared by all ABB instances of one family.
//! The values are hardware-qualified constants; the wait-count scaling
//! in [`crate::VoltageDomain::abb_init`] depends on them verbatim.

/// Mask/shift layout and timing shared across one silicon family.
pub struct AbbParams {
    /// Operating-point selector field in the control register.
    pub opp_sel_mask: u32,
    pub opp_sel_shift: u32,
    /// Change-request bit in the control register.
    pub opp_change_mask: u32,
    /// SR2 wait-count field in the setup register.
    pub sr2_wtcnt_value_mask: u32,
    pub sr2_wtcnt_value_shift: u32,
    /// SR2 ldo enable bit in the setup register.
    pub sr2en_mask: u32,
    /// Forward body-bias select bit in the setup register.
    pub active_fbb_sel_mask: u32,
    /// Expected ldo settling time, in microseconds.
    pub settling_time_us: u32,
    /// ABB IP cycle rate, in cycles.
    pub cycle_rate: u32,
}

static ABB_PARAMS_GEN3: AbbParams = AbbParams {
    opp_sel_mask: 0x3 << 0,
    opp_sel_shift: 0,
    opp_change_mask: 0x1 << 2,
    sr2_wtcnt_value_mask: 0xff << 8,
    sr2_wtcnt_value_shift: 8,
    sr2en_mask: 0x1 << 0,
    active_fbb_sel_mask: 0x1 << 2,
    settling_time_us: 30,
    cycle_rate: 8,
};

static ABB_PARAMS_GEN4: AbbParams = AbbParams {
    opp_sel_mask: 0x3 << 0,
    opp_sel_shift: 0,
    opp_change_mask: 0x1 << 2,
    sr2_wtcnt_value_mask: 0xff << 8,
    sr2_wtcnt_value_shift: 8,
    sr2en_mask: 0x1 << 0,
    active_fbb_sel_mask: 0x1 << 2,
    settling_time_us: 50,
    cycle_rate: 16,
};

/// Silicon families with an ABB IP, selected once at startup from the
/// chip identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbFamily {
    Gen3,
    Gen4,
}

impl AbbFamily {
    /// The family's shared layout and timing table.
    pub fn params(self) -> &'static AbbParams {
        match self {
            AbbFamily::Gen3 => &ABB_PARAMS_GEN3,
            AbbFamily::Gen4 => &ABB_PARAMS_GEN4,
        }
    }
}
