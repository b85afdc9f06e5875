// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures: a fake PRM register block and a core-park stub.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use kpmsys::CorePark;
use kpwrdm::{PowerDomain, PwrStateMask};
use kregport::mock::MockPort;

pub const MPU_CTRL: u16 = 0x100;
pub const MPU_ST: u16 = 0x104;
pub const CORE_CTRL: u16 = 0x110;
pub const CORE_ST: u16 = 0x114;
pub const PER_CTRL: u16 = 0x120;
pub const PER_ST: u16 = 0x124;
pub const CPU0_CTRL: u16 = 0x140;
pub const CPU0_ST: u16 = 0x144;
pub const CPU1_CTRL: u16 = 0x150;
pub const CPU1_ST: u16 = 0x154;

/// Device-off control and interconnect context registers, matching
/// the offsets the orchestrator programs.
pub const DEVICE_OFF_CTRL: u16 = 0x224;
pub const CONTEXT_REG: u16 = 0x724;

const LASTPOWERSTATE_FIELD: u32 = 0x3 << 24;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A PRM register block with status semantics on every PWRSTST
/// history field and the context-loss register.
pub fn prm_port() -> MockPort {
    let port = MockPort::new();
    for st in [MPU_ST, CORE_ST, PER_ST, CPU0_ST, CPU1_ST] {
        port.set_w1c_bits(st, LASTPOWERSTATE_FIELD);
    }
    port.set_w1c_bits(CONTEXT_REG, 0x3);
    port
}

/// The standard managed-domain registry used across the tests:
/// mpu (no logic retention control), core, l4per, and both cores.
pub fn build_domains(port: &MockPort) -> Vec<PowerDomain<'_>> {
    vec![
        PowerDomain::new(
            "mpu_pwrdm",
            port,
            MPU_CTRL,
            MPU_ST,
            PwrStateMask::ON | PwrStateMask::INACTIVE | PwrStateMask::RET | PwrStateMask::OFF,
            PwrStateMask::empty(),
        ),
        PowerDomain::new(
            "core_pwrdm",
            port,
            CORE_CTRL,
            CORE_ST,
            PwrStateMask::ON | PwrStateMask::RET | PwrStateMask::OFF,
            PwrStateMask::RET | PwrStateMask::OFF,
        ),
        PowerDomain::new(
            "l4per_pwrdm",
            port,
            PER_CTRL,
            PER_ST,
            PwrStateMask::ON | PwrStateMask::RET | PwrStateMask::OFF,
            PwrStateMask::RET,
        ),
        PowerDomain::new(
            "cpu0_pwrdm",
            port,
            CPU0_CTRL,
            CPU0_ST,
            PwrStateMask::ON | PwrStateMask::OFF,
            PwrStateMask::empty(),
        ),
        PowerDomain::new(
            "cpu1_pwrdm",
            port,
            CPU1_CTRL,
            CPU1_ST,
            PwrStateMask::ON | PwrStateMask::OFF,
            PwrStateMask::empty(),
        ),
    ]
}

/// Records park requests and lets a test run hardware side effects
/// while the core is "asleep". Passed to the coordinator by
/// reference so the test keeps access to the journal.
pub struct FakePark<'a> {
    pub parks: RefCell<Vec<(usize, bool)>>,
    pub wake_cpu: Cell<usize>,
    pub on_park: RefCell<Option<Box<dyn FnMut() + 'a>>>,
}

impl<'a> FakePark<'a> {
    pub fn new() -> Self {
        Self {
            parks: RefCell::new(Vec::new()),
            wake_cpu: Cell::new(0),
            on_park: RefCell::new(None),
        }
    }

    pub fn with_on_park(f: impl FnMut() + 'a) -> Self {
        let park = Self::new();
        *park.on_park.borrow_mut() = Some(Box::new(f));
        park
    }
}

impl CorePark for &FakePark<'_> {
    fn park(&self, cpu: usize, save_context: bool) {
        self.parks.borrow_mut().push((cpu, save_context));
        if let Some(f) = self.on_park.borrow_mut().as_mut() {
            f();
        }
    }

    fn current_cpu(&self) -> usize {
        self.wake_cpu.get()
    }
}
