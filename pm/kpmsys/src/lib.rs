// SPDX-License-Identifier: Apache-2.0

//! System suspend orchestration for the application processor.
//!
//! Ties together the three PM state machines: power/clock-domain
//! programming across a suspend cycle ([`suspend`]), multi-core
//! low-power entry and exit ([`mpuss`]), and the privileged-call
//! marshalling used at the shared-resource boundary ([`secure`]).
//!
//! The orchestrator and the CPU coordinator run with interrupts and
//! fast interrupts disabled across the actual low-power entry; the
//! surrounding OS framework guarantees suspend cycles never overlap.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate log;

pub mod gic;
pub mod mpuss;
pub mod sar;
pub mod secure;
pub mod suspend;

use core::sync::atomic::{AtomicBool, Ordering};

use kabb::AbbError;
use kpwrdm::{ClkdmFlags, ClockDomain, PowerDomain};
use kregport::RegisterPort;

pub use mpuss::{CorePark, MpussCoordinator, NR_CPUS};
pub use sar::SarRam;
pub use secure::SecureDispatcher;
pub use suspend::{SuspendOrchestrator, SuspendPolicy};

/// Errors from power-management bring-up and suspend cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmError {
    /// A required power domain is missing from the registry. Fatal
    /// during bring-up.
    DomainNotFound(&'static str),
    /// The silicon stepping cannot safely run low-power transitions.
    UnsupportedSilicon,
    /// A core was asked for a power state cores cannot reach.
    InvalidCpuState,
    /// A regulator handshake timed out.
    TransitionTimeout,
    /// A domain came back shallower than the state programmed for it.
    StateNotReached,
}

impl core::fmt::Display for PmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PmError::DomainNotFound(name) => write!(f, "power domain {name} not found"),
            PmError::UnsupportedSilicon => write!(f, "silicon revision unsupported"),
            PmError::InvalidCpuState => write!(f, "invalid CPU power state"),
            PmError::TransitionTimeout => write!(f, "regulator transition timed out"),
            PmError::StateNotReached => write!(f, "target power state not reached"),
        }
    }
}

impl From<AbbError> for PmError {
    fn from(e: AbbError) -> Self {
        match e {
            AbbError::TransitionTimeout => PmError::TransitionTimeout,
        }
    }
}

/// Convenience alias for PM results.
pub type PmResult<T> = Result<T, PmError>;

/// Silicon revision, identified once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocRev {
    /// First stepping; low-power transitions are a known-bad path.
    Es1,
    /// Second and later steppings.
    Es2,
}

impl SocRev {
    pub fn supports_lowpower(self) -> bool {
        !matches!(self, SocRev::Es1)
    }
}

/// Deployment-fixed configuration for [`init`].
pub struct PmConfig {
    pub rev: SocRev,
    pub policy: SuspendPolicy,
    /// Physical address of the wake routine, programmed once into the
    /// scratch RAM slots of both cores.
    pub resume_vector_pa: u32,
}

static PM_READY: AtomicBool = AtomicBool::new(false);

/// Whether power management finished bring-up successfully.
pub fn pm_ready() -> bool {
    PM_READY.load(Ordering::SeqCst)
}

/// Clock-domain idle policy pass.
///
/// Hands every domain that supports it to hardware-supervised idle;
/// force-sleeps unused domains that can only be slept by software.
pub fn clkdms_setup(clkdms: &[ClockDomain<'_>]) {
    for clkdm in clkdms {
        if clkdm.flags().contains(ClkdmFlags::CAN_ENABLE_AUTO) {
            clkdm.allow_idle();
        } else if clkdm.flags().contains(ClkdmFlags::CAN_FORCE_SLEEP) && clkdm.usecount() == 0 {
            clkdm.force_sleep();
        }
    }
}

/// Brings up the power-management subsystem.
///
/// Registers all controllable power domains with the orchestrator,
/// runs the clock-domain idle pass, and initializes the multi-core
/// coordinator. Any failure here leaves the subsystem not ready; the
/// platform must not offer suspend in that case.
pub fn init<'a, P: CorePark>(
    domains: &'a [PowerDomain<'a>],
    clkdms: &[ClockDomain<'_>],
    sar: SarRam<'a>,
    device_port: &'a dyn RegisterPort,
    park: P,
    config: PmConfig,
) -> PmResult<SuspendOrchestrator<'a, P>> {
    if !config.rev.supports_lowpower() {
        warn!("power management not supported on this silicon stepping");
        return Err(PmError::UnsupportedSilicon);
    }

    clkdms_setup(clkdms);

    let mpuss = MpussCoordinator::init(domains, sar, park, config.rev, config.resume_vector_pa)
        .inspect_err(|e| error!("MPUSS bring-up failed: {e}"))?;

    let orchestrator = SuspendOrchestrator::new(domains, mpuss, device_port, config.policy);

    PM_READY.store(true, Ordering::SeqCst);
    info!("power management ready");
    Ok(orchestrator)
}
