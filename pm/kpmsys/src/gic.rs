// SPDX-License-Identifier: Apache-2.0

//! GIC cpu/distributor interface gating at the shared-resource boundary.
//!
//! The interrupt controller is shared by both cores: it is switched
//! off only once the last core is down, and must be back on before
//! any core resumes normal execution. The hotplug/idle framework owns
//! that ordering; these are the primitives it composes.

use kregport::RegisterPort;

const GIC_CPU_CTRL: u16 = 0x00;
const GIC_CPU_PRIMASK: u16 = 0x04;
const GIC_DIST_CTRL: u16 = 0x00;

/// Lowest priority mask: lets every interrupt through.
const PRIMASK_OPEN: u32 = 0xf0;

/// The per-core and distributor interfaces of the interrupt controller.
pub struct GicIface<'a> {
    cpu: &'a dyn RegisterPort,
    dist: &'a dyn RegisterPort,
}

impl<'a> GicIface<'a> {
    pub fn new(cpu: &'a dyn RegisterPort, dist: &'a dyn RegisterPort) -> Self {
        Self { cpu, dist }
    }

    pub fn cpu_enable(&self) {
        self.cpu.raw_write(PRIMASK_OPEN, GIC_CPU_PRIMASK);
        self.cpu.raw_write(1, GIC_CPU_CTRL);
    }

    pub fn cpu_disable(&self) {
        self.cpu.raw_write(0, GIC_CPU_CTRL);
    }

    pub fn dist_enable(&self) {
        self.dist.raw_write(1, GIC_DIST_CTRL);
    }

    pub fn dist_disable(&self) {
        self.dist.raw_write(0, GIC_DIST_CTRL);
    }
}

#[cfg(test)]
mod tests {
    use kregport::mock::MockPort;

    use super::*;

    #[test]
    fn cpu_enable_opens_the_priority_mask_first() {
        let cpu = MockPort::new();
        let dist = MockPort::new();
        let gic = GicIface::new(&cpu, &dist);

        gic.cpu_enable();
        assert_eq!(cpu.writes(), [(GIC_CPU_PRIMASK, 0xf0), (GIC_CPU_CTRL, 1)]);

        gic.cpu_disable();
        assert_eq!(cpu.peek(GIC_CPU_CTRL), 0);
    }

    #[test]
    fn distributor_gating_is_a_single_bit() {
        let cpu = MockPort::new();
        let dist = MockPort::new();
        let gic = GicIface::new(&cpu, &dist);

        gic.dist_enable();
        assert_eq!(dist.peek(GIC_DIST_CTRL), 1);
        gic.dist_disable();
        assert_eq!(dist.peek(GIC_DIST_CTRL), 0);
    }
}
