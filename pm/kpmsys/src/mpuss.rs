// SPDX-License-Identifier: Apache-2.0

//! Multi-core low-power entry and exit.
//!
//! The processor subsystem pairs two cores with per-core power
//! domains. The cores cannot hold closed-switch retention: waking
//! from dormant needs a reset asserted by the external power
//! controller, so the only deep per-core state is OFF with a full
//! context save. The master core (cpu0) is the last one down and the
//! first one up; that ordering is enforced by the hotplug framework
//! around these primitives.

use kpwrdm::{PowerDomain, PwrState, lookup};

use crate::sar::{
    CPU0_WAKEUP_NS_PA_ADDR_OFFSET, CPU1_WAKEUP_NS_PA_ADDR_OFFSET, SCU_OFFSET0, SCU_OFFSET1,
    SCU_PM_DORMANT, SCU_PM_NORMAL, SCU_PM_POWEROFF, SarRam,
};
use crate::{PmError, PmResult, SocRev};

/// Core count is fixed by the silicon.
pub const NR_CPUS: usize = 2;

/// Parks the calling core until the next wake event.
pub trait CorePark {
    /// Suspends core `cpu`, saving full context when `save_context`
    /// is set. Returns only after wake, with firmware-level restore
    /// already done from the scratch-RAM hint and resume vector.
    fn park(&self, cpu: usize, save_context: bool);

    /// Physical id of the core this code is currently running on.
    fn current_cpu(&self) -> usize;
}

/// Per-core bookkeeping: the core's power domain and its scratch-RAM
/// hint slot. Immutable after init.
struct CpuPmInfo<'a> {
    pwrdm: &'a PowerDomain<'a>,
    scu_sar_offs: u16,
}

/// Maps a target core state to the hint the wake firmware reads.
fn scu_pwrst_hint(state: PwrState) -> u32 {
    match state {
        PwrState::Retention => SCU_PM_DORMANT,
        PwrState::Off => SCU_PM_POWEROFF,
        PwrState::On | PwrState::Inactive => SCU_PM_NORMAL,
    }
}

/// Coordinates low-power entry and exit for both cores.
pub struct MpussCoordinator<'a, P: CorePark> {
    cpus: [CpuPmInfo<'a>; NR_CPUS],
    sar: SarRam<'a>,
    park: P,
    rev: SocRev,
}

impl<P: CorePark> core::fmt::Debug for MpussCoordinator<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MpussCoordinator")
            .field("rev", &self.rev)
            .finish_non_exhaustive()
    }
}

impl<'a, P: CorePark> MpussCoordinator<'a, P> {
    /// Resolves both cores' power domains, resets their state to ON,
    /// and programs the fixed wake routine address into scratch RAM.
    ///
    /// Fails bring-up on the first stepping or when either core's
    /// domain is missing.
    pub fn init(
        domains: &'a [PowerDomain<'a>],
        sar: SarRam<'a>,
        park: P,
        rev: SocRev,
        resume_vector_pa: u32,
    ) -> PmResult<Self> {
        if !rev.supports_lowpower() {
            warn!("MPUSS low power not supported on this stepping");
            return Err(PmError::UnsupportedSilicon);
        }

        let cpu0 = lookup(domains, "cpu0_pwrdm")
            .ok_or(PmError::DomainNotFound("cpu0_pwrdm"))?;
        let cpu1 = lookup(domains, "cpu1_pwrdm")
            .ok_or(PmError::DomainNotFound("cpu1_pwrdm"))?;

        let cpus = [
            CpuPmInfo {
                pwrdm: cpu0,
                scu_sar_offs: SCU_OFFSET0,
            },
            CpuPmInfo {
                pwrdm: cpu1,
                scu_sar_offs: SCU_OFFSET1,
            },
        ];

        for info in &cpus {
            info.pwrdm.clear_all_prev_pwrst();
            info.pwrdm.set_next_pwrst(PwrState::On);
        }

        // The wake routine address never changes, so both slots are
        // programmed here rather than per entry.
        sar.write_word(CPU0_WAKEUP_NS_PA_ADDR_OFFSET, resume_vector_pa);
        sar.write_word(CPU1_WAKEUP_NS_PA_ADDR_OFFSET, resume_vector_pa);

        Ok(Self {
            cpus,
            sar,
            park,
            rev,
        })
    }

    /// Takes core `cpu` into `target` and returns after wake.
    ///
    /// ON and INACTIVE need no context save; OFF saves everything.
    /// RETENTION is rejected: core logic would be lost and L1 would
    /// need cleaning, which makes it OFF in everything but name.
    ///
    /// Out-of-range cores and unsupported steppings are a successful
    /// no-op; doing nothing is safer than touching a core this
    /// silicon cannot bring back.
    pub fn enter_lowpower(&self, cpu: usize, target: PwrState) -> PmResult<()> {
        if cpu >= NR_CPUS || !self.rev.supports_lowpower() {
            return Ok(());
        }

        let save_context = match target {
            PwrState::On | PwrState::Inactive => false,
            PwrState::Off => true,
            PwrState::Retention => {
                warn!("cpu{cpu}: retention is not a reachable core state");
                return Err(PmError::InvalidCpuState);
            }
        };

        let info = &self.cpus[cpu];
        info.pwrdm.clear_all_prev_pwrst();
        info.pwrdm.set_next_pwrst(target);
        self.sar.write_word(info.scu_sar_offs, scu_pwrst_hint(target));

        self.park.park(cpu, save_context);

        // Execution resumes on whichever core woke, not necessarily
        // the one that slept. Force that core's staged state back to
        // ON so a plain WFI outside this path cannot re-enter the
        // programmed low-power state.
        let wakeup_cpu = self.park.current_cpu();
        if let Some(info) = self.cpus.get(wakeup_cpu) {
            info.pwrdm.set_next_pwrst(PwrState::On);
        }

        Ok(())
    }

    /// The reached state of core `cpu`'s power domain.
    pub fn read_cpu_prev_pwrst(&self, cpu: usize) -> Option<PwrState> {
        self.cpus.get(cpu).map(|info| info.pwrdm.read_prev_pwrst())
    }
}
