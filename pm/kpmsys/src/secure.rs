// SPDX-License-Identifier: Apache-2.0

//! Privileged-call marshalling for low-power transitions.
//!
//! The secure monitor reads its arguments from physical memory,
//! bypassing cache coherency with the calling core, so every dispatch
//! flushes the data cache and cleans the argument buffer's physical
//! range before trapping. When a secure clock domain is wired in, it
//! is force-woken for exactly the duration of the call.

use kpwrdm::ClockDomain;

/// Secure low-power context save/restore call indices.
pub const HAL_SAVESECURERAM_INDEX: u32 = 0x1a;
pub const HAL_SAVEHW_INDEX: u32 = 0x1b;
pub const HAL_SAVEALL_INDEX: u32 = 0x1c;
pub const HAL_SAVEGIC_INDEX: u32 = 0x1d;
pub const PPA_SERVICE_NS_SMP: u32 = 0x25;

/// Criticality / interrupt-masking hints passed alongside the index.
pub const FLAG_START_CRITICAL: u32 = 0x4;
pub const FLAG_IRQFIQ_MASK: u32 = 0x3;
pub const FLAG_IRQ_ENABLE: u32 = 0x2;
pub const FLAG_FIQ_ENABLE: u32 = 0x1;
pub const NO_FLAG: u32 = 0x0;

/// Single-argument monitor services for the outer cache controller.
const L2_DEBUG_FN: u32 = 0x100;
const L2_CONTROL_FN: u32 = 0x102;
const L2_AUXCTRL_FN: u32 = 0x109;

/// Trap into the secure monitor.
pub trait MonitorCall {
    /// Single-argument service call.
    fn smc1(&self, func: u32, arg: u32);

    /// Dispatcher entry: call index, flag word, physical address of
    /// the 5-word argument buffer. Returns the raw status word.
    fn smc2(&self, idx: u32, flag: u32, args_pa: u32) -> u32;
}

/// Cache maintenance around the call boundary.
pub trait CacheMaintenance {
    /// Full data-cache flush.
    fn flush_all(&self);

    /// Clean the outer cache for a physical range.
    fn outer_clean_range(&self, pa_start: u32, pa_end: u32);

    /// Physical address of a kernel virtual address.
    fn virt_to_phys(&self, va: usize) -> u32;
}

/// Marshals parameters into the fixed 5-word privileged-call buffer.
pub struct SecureDispatcher<'a> {
    monitor: &'a dyn MonitorCall,
    cache: &'a dyn CacheMaintenance,
    /// Secure clock domain that must be running for the call to
    /// succeed; `None` on deployments where hardware keeps it awake.
    sec_clkdm: Option<&'a ClockDomain<'a>>,
}

impl<'a> SecureDispatcher<'a> {
    pub fn new(
        monitor: &'a dyn MonitorCall,
        cache: &'a dyn CacheMaintenance,
        sec_clkdm: Option<&'a ClockDomain<'a>>,
    ) -> Self {
        Self {
            monitor,
            cache,
            sec_clkdm,
        }
    }

    /// Dispatches a privileged low-power service routine.
    ///
    /// Word 0 of the buffer carries the number of valid arguments,
    /// words 1-4 the arguments themselves. The returned status word is
    /// not interpreted here; that is the caller's responsibility.
    pub fn dispatch(
        &self,
        idx: u32,
        flag: u32,
        nargs: u32,
        arg1: u32,
        arg2: u32,
        arg3: u32,
        arg4: u32,
    ) -> u32 {
        let param: [u32; 5] = [nargs, arg1, arg2, arg3, arg4];

        let pa = self.cache.virt_to_phys(param.as_ptr() as usize);
        self.cache.flush_all();
        self.cache
            .outer_clean_range(pa, pa + core::mem::size_of_val(&param) as u32);

        if let Some(clkdm) = self.sec_clkdm {
            clkdm.force_wakeup();
        }
        let ret = self.monitor.smc2(idx, flag, pa);
        if let Some(clkdm) = self.sec_clkdm {
            clkdm.allow_idle();
        }

        trace!("secure dispatch {idx:#x} -> {ret:#x}");
        ret
    }

    /// Enables or disables the outer L2 cache controller.
    pub fn l2_enable(&self, enable: bool) {
        self.monitor.smc1(L2_CONTROL_FN, enable as u32);
    }

    /// Programs the outer cache controller's debug register.
    pub fn l2_set_debug(&self, val: u32) {
        self.monitor.smc1(L2_DEBUG_FN, val);
    }

    /// Programs the outer cache controller's auxiliary control register.
    pub fn l2_set_aux_ctrl(&self, val: u32) {
        self.monitor.smc1(L2_AUXCTRL_FN, val);
    }
}
