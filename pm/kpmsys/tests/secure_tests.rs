// SPDX-License-Identifier: Apache-2.0

//! Secure dispatcher marshalling tests.

mod test_helpers;

use std::cell::{Cell, RefCell};

use kpmsys::SecureDispatcher;
use kpmsys::secure::{
    CacheMaintenance, FLAG_IRQFIQ_MASK, HAL_SAVEALL_INDEX, HAL_SAVESECURERAM_INDEX, MonitorCall,
    NO_FLAG,
};
use kpwrdm::{ClkdmFlags, ClockDomain};
use kregport::mock::MockPort;
use test_helpers::init_logger;

const FAKE_PA: u32 = 0x9f00_0000;
const CLKTRCTRL: u16 = 0x0;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    FlushAll,
    CleanRange(u32, u32),
    Smc1(u32, u32),
    Smc2 {
        idx: u32,
        flag: u32,
        pa: u32,
        args: [u32; 5],
    },
}

/// Plays the secure monitor and the cache layer at once, journalling
/// every call. The argument buffer is read back through the virtual
/// address captured by the address translation, the way the real
/// monitor reads it through the physical alias.
struct FakeSecure<'a> {
    events: RefCell<Vec<Event>>,
    last_va: Cell<usize>,
    ret: Cell<u32>,
    clk: Option<(&'a MockPort, u16)>,
    clk_at_trap: Cell<u32>,
}

impl<'a> FakeSecure<'a> {
    fn new(clk: Option<(&'a MockPort, u16)>) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            last_va: Cell::new(0),
            ret: Cell::new(0),
            clk,
            clk_at_trap: Cell::new(u32::MAX),
        }
    }
}

impl MonitorCall for FakeSecure<'_> {
    fn smc1(&self, func: u32, arg: u32) {
        self.events.borrow_mut().push(Event::Smc1(func, arg));
    }

    fn smc2(&self, idx: u32, flag: u32, args_pa: u32) -> u32 {
        let args = unsafe { core::ptr::read(self.last_va.get() as *const [u32; 5]) };
        if let Some((port, offs)) = self.clk {
            self.clk_at_trap.set(port.peek(offs) & 0x3);
        }
        self.events.borrow_mut().push(Event::Smc2 {
            idx,
            flag,
            pa: args_pa,
            args,
        });
        self.ret.get()
    }
}

impl CacheMaintenance for FakeSecure<'_> {
    fn flush_all(&self) {
        self.events.borrow_mut().push(Event::FlushAll);
    }

    fn outer_clean_range(&self, pa_start: u32, pa_end: u32) {
        self.events
            .borrow_mut()
            .push(Event::CleanRange(pa_start, pa_end));
    }

    fn virt_to_phys(&self, va: usize) -> u32 {
        self.last_va.set(va);
        FAKE_PA
    }
}

#[test]
fn dispatch_marshals_and_cleans_before_the_trap() {
    init_logger();
    let sec = FakeSecure::new(None);
    let disp = SecureDispatcher::new(&sec, &sec, None);

    disp.dispatch(HAL_SAVEALL_INDEX, FLAG_IRQFIQ_MASK, 4, 0x10, 0x20, 0x30, 0x40);

    let events = sec.events.borrow();
    assert_eq!(
        *events,
        [
            Event::FlushAll,
            Event::CleanRange(FAKE_PA, FAKE_PA + 20),
            Event::Smc2 {
                idx: HAL_SAVEALL_INDEX,
                flag: FLAG_IRQFIQ_MASK,
                pa: FAKE_PA,
                args: [4, 0x10, 0x20, 0x30, 0x40],
            },
        ]
    );
}

#[test]
fn unused_argument_slots_are_still_zeroed() {
    init_logger();
    let sec = FakeSecure::new(None);
    let disp = SecureDispatcher::new(&sec, &sec, None);

    disp.dispatch(HAL_SAVESECURERAM_INDEX, NO_FLAG, 1, 0xdead, 0, 0, 0);

    let events = sec.events.borrow();
    match events.last() {
        Some(Event::Smc2 { args, .. }) => assert_eq!(*args, [1, 0xdead, 0, 0, 0]),
        other => panic!("no trap recorded: {other:?}"),
    }
}

#[test]
fn secure_clkdm_is_awake_only_for_the_call() {
    init_logger();
    let port = MockPort::new();
    let clkdm = ClockDomain::new("l4_secure", &port, CLKTRCTRL, ClkdmFlags::all(), 0);
    let sec = FakeSecure::new(Some((&port, CLKTRCTRL)));
    let disp = SecureDispatcher::new(&sec, &sec, Some(&clkdm));

    disp.dispatch(HAL_SAVEALL_INDEX, FLAG_IRQFIQ_MASK, 1, 1, 0, 0, 0);

    // force-wakeup while trapped, handed back to hardware idle after
    assert_eq!(sec.clk_at_trap.get(), 0x2);
    assert_eq!(port.peek(CLKTRCTRL) & 0x3, 0x3);
}

#[test]
fn status_word_comes_back_verbatim() {
    init_logger();
    let sec = FakeSecure::new(None);
    sec.ret.set(0xfff0_0081);
    let disp = SecureDispatcher::new(&sec, &sec, None);

    let ret = disp.dispatch(HAL_SAVEALL_INDEX, NO_FLAG, 0, 0, 0, 0, 0);
    assert_eq!(ret, 0xfff0_0081);
}

#[test]
fn l2_services_use_single_argument_calls() {
    init_logger();
    let sec = FakeSecure::new(None);
    let disp = SecureDispatcher::new(&sec, &sec, None);

    disp.l2_enable(true);
    disp.l2_enable(false);
    disp.l2_set_debug(0x5);
    disp.l2_set_aux_ctrl(0x7e47_0001);

    let events = sec.events.borrow();
    assert_eq!(
        *events,
        [
            Event::Smc1(0x102, 1),
            Event::Smc1(0x102, 0),
            Event::Smc1(0x100, 0x5),
            Event::Smc1(0x109, 0x7e47_0001),
        ]
    );
}
