// SPDX-License-Identifier: Apache-2.0

//! System-wide suspend cycle over the managed power domains.
//!
//! One cycle walks the managed list in registration order: snapshot
//! staged states, program the deepest achievable targets, take the
//! master core down, then verify what every domain actually reached
//! and roll all staged state back to the snapshot. Verification
//! failures are recorded, never allowed to cut the rollback short.

use alloc::vec::Vec;

use kpwrdm::{PowerDomain, PwrState, PwrStateMask};
use kregport::RegisterPort;

use crate::mpuss::{CorePark, MpussCoordinator};
use crate::{PmError, PmResult};

/// Device-off control register on the device PRM instance.
const DEVICE_OFF_CTRL_OFFSET: u16 = 0x224;
const DEVICE_OFF_ENABLE_MASK: u32 = 0x1;

/// Interconnect context register; its reset-flip-flop loss bit is the
/// only way software can tell the device reached OFF.
const CONTEXT_OFFSET: u16 = 0x724;
const LOSTCONTEXT_DFF_MASK: u32 = 0x1 << 0;
const LOSTCONTEXT_RFF_MASK: u32 = 0x1 << 1;

/// Only the master core runs the suspend path; the other core is
/// taken down through hotplug first.
const MASTER_CPU: usize = 0;

/// Domains whose staged state defaults to ON at registration; the
/// rest park in retention whenever idle allows.
const ON_AT_BOOT: [&str; 4] = ["mpu_pwrdm", "core_pwrdm", "cpu0_pwrdm", "cpu1_pwrdm"];

/// Per-core domains are programmed exclusively by the CPU coordinator;
/// the general staging pass must not touch them.
const CPU_PWRDMS: [&str; 2] = ["cpu0_pwrdm", "cpu1_pwrdm"];

fn is_cpu_pwrdm(name: &str) -> bool {
    CPU_PWRDMS.contains(&name)
}

/// One managed domain: the domain reference, the target computed for
/// the current cycle, and the staged state saved across it.
struct PowerStateEntry<'a> {
    pwrdm: &'a PowerDomain<'a>,
    next_state: PwrState,
    saved_state: PwrState,
    saved_logic_state: PwrState,
}

/// Deployment-fixed suspend policy.
#[derive(Debug, Clone, Copy)]
pub struct SuspendPolicy {
    /// Allow open-switch retention: logic is dropped in retention and
    /// Device OFF becomes reachable.
    pub allow_oswr: bool,
    /// Target the system-wide OFF profile instead of retention.
    pub off_mode: bool,
}

/// Walks all managed power domains through a suspend cycle.
pub struct SuspendOrchestrator<'a, P: CorePark> {
    pwrst_list: Vec<PowerStateEntry<'a>>,
    policy: SuspendPolicy,
    mpuss: MpussCoordinator<'a, P>,
    device_port: &'a dyn RegisterPort,
}

impl<P: CorePark> core::fmt::Debug for SuspendOrchestrator<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SuspendOrchestrator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<'a, P: CorePark> SuspendOrchestrator<'a, P> {
    /// Registers every controllable domain, in slice order.
    ///
    /// Domains with an empty capability mask carry read-only state
    /// registers and stay unmanaged. Iteration order is not a
    /// hardware requirement but must stay stable across cycles so
    /// field diagnostics line up.
    pub fn new(
        domains: &'a [PowerDomain<'a>],
        mpuss: MpussCoordinator<'a, P>,
        device_port: &'a dyn RegisterPort,
        policy: SuspendPolicy,
    ) -> Self {
        let mut pwrst_list = Vec::new();
        for pwrdm in domains {
            if pwrdm.pwrsts().is_empty() {
                continue;
            }
            let requested = if ON_AT_BOOT.contains(&pwrdm.name()) {
                PwrState::On
            } else {
                PwrState::Retention
            };
            let next_state = pwrdm.pwrsts().achievable(requested);
            pwrdm.set_next_pwrst(next_state);
            pwrst_list.push(PowerStateEntry {
                pwrdm,
                next_state,
                saved_state: next_state,
                saved_logic_state: pwrdm.read_logic_retst(),
            });
        }
        Self {
            pwrst_list,
            policy,
            mpuss,
            device_port,
        }
    }

    pub fn mpuss(&self) -> &MpussCoordinator<'a, P> {
        &self.mpuss
    }

    /// Programs every managed domain for the requested profile.
    ///
    /// OFF mode targets OFF power and logic states; otherwise domains
    /// target retention, dropping logic only when open-switch
    /// retention is allowed. Logic retention is programmed before the
    /// power state for each domain. Domains whose capability mask is
    /// empty for either register are skipped for that register: those
    /// are read-only and must not be written.
    pub fn configure_suspend(&mut self, is_off_mode: bool) {
        let (state, logic_state) = if self.policy.allow_oswr {
            if is_off_mode {
                (PwrState::Off, PwrState::Off)
            } else {
                (PwrState::Retention, PwrState::Off)
            }
        } else {
            (PwrState::Retention, PwrState::Retention)
        };

        for pwrst in &mut self.pwrst_list {
            if is_cpu_pwrdm(pwrst.pwrdm.name()) {
                continue;
            }
            if !pwrst.pwrdm.pwrsts_logic_ret().is_empty() {
                let als = pwrst.pwrdm.pwrsts_logic_ret().achievable(logic_state);
                pwrst.pwrdm.set_logic_retst(als);
            }
            if !pwrst.pwrdm.pwrsts().is_empty() {
                pwrst.next_state = pwrst.pwrdm.pwrsts().achievable(state);
                pwrst.pwrdm.set_next_pwrst(pwrst.next_state);
            }
        }
    }

    /// Runs one full suspend cycle.
    ///
    /// The staged state of every managed domain is restored to its
    /// pre-cycle snapshot before this returns, whatever the verdict:
    /// a domain that came back shallower than programmed makes the
    /// cycle report [`PmError::StateNotReached`] but never stops the
    /// remaining verification or the rollback.
    pub fn suspend(&mut self) -> PmResult<()> {
        for pwrst in &mut self.pwrst_list {
            pwrst.saved_state = pwrst.pwrdm.read_next_pwrst();
            pwrst.saved_logic_state = pwrst.pwrdm.read_logic_retst();
        }

        let off_mode = self.policy.off_mode;
        self.configure_suspend(off_mode);

        for pwrst in &self.pwrst_list {
            pwrst.pwrdm.clear_all_prev_pwrst();
        }
        self.clear_prev_off_state();

        if off_mode {
            self.set_device_off(true);
        }

        let entry_result = self
            .mpuss
            .enter_lowpower(MASTER_CPU, PwrState::Off)
            .map_err(|e| {
                warn!("master core low-power entry failed: {e}");
                e
            });

        if off_mode {
            self.set_device_off(false);
        }
        if self.prev_state_off() {
            debug!("device reached OFF in the last cycle");
        }

        let mut reached = Ok(());
        for pwrst in &self.pwrst_list {
            let prev = pwrst.pwrdm.read_prev_pwrst();
            if prev > pwrst.next_state {
                info!(
                    "powerdomain {} missed target {} (reached {prev})",
                    pwrst.pwrdm.name(),
                    pwrst.next_state
                );
                reached = Err(PmError::StateNotReached);
            }
            pwrst.pwrdm.set_next_pwrst(pwrst.saved_state);
            if !pwrst.pwrdm.pwrsts_logic_ret().is_empty() {
                pwrst.pwrdm.set_logic_retst(pwrst.saved_logic_state);
            }
        }

        if reached.is_err() {
            warn!("could not enter target state for all powerdomains");
        } else {
            debug!("all powerdomains reached their target state");
        }

        entry_result.and(reached)
    }

    /// Arms or disarms the system-wide Device OFF transition. Never
    /// armed on deployments without open-switch retention.
    pub fn set_device_off(&self, enable: bool) {
        let val = u32::from(enable && self.policy.allow_oswr);
        self.device_port.raw_write(val, DEVICE_OFF_CTRL_OFFSET);
    }

    /// Whether the next transition is armed for Device OFF.
    pub fn device_next_state_off(&self) -> bool {
        self.device_port
            .read_bits(DEVICE_OFF_ENABLE_MASK, DEVICE_OFF_CTRL_OFFSET)
            != 0
    }

    /// Whether the device reached OFF in its last transition. Context
    /// loss in the interconnect's reset flip-flops is the only
    /// readable trace of it.
    pub fn prev_state_off(&self) -> bool {
        self.device_port
            .read_bits(LOSTCONTEXT_RFF_MASK, CONTEXT_OFFSET)
            != 0
    }

    /// Clears the recorded context-loss state ahead of a cycle.
    pub fn clear_prev_off_state(&self) {
        self.device_port
            .raw_write(LOSTCONTEXT_RFF_MASK | LOSTCONTEXT_DFF_MASK, CONTEXT_OFFSET);
    }

    /// Managed domain count, for diagnostics.
    pub fn managed_domains(&self) -> usize {
        self.pwrst_list.len()
    }
}
