//! Private timer (one per CPU, same base address on every CPU)

use core::{marker::PhantomData, ops::Deref};

use volatile_register::RW;

pub const BASE_ADDRESS: usize = crate::PERIPHBASE + 0x600;

/// PPI raised by the private timer
pub const INTERRUPT: u16 = 29;

/// Timer enable
pub const CONTROL_ENABLE: u32 = 1 << 0;
/// Reload from the load register when the counter reaches zero
pub const CONTROL_AUTO_RELOAD: u32 = 1 << 1;
/// Raise `INTERRUPT` when the counter reaches zero
pub const CONTROL_IRQ_ENABLE: u32 = 1 << 2;

#[repr(C)]
pub struct Registers {
    /// 0x00 - Private Timer Load Register
    pub load: RW<u32>,
    /// 0x04 - Private Timer Counter Register
    pub counter: RW<u32>,
    /// 0x08 - Private Timer Control Register
    pub control: RW<u32>,
    /// 0x0C - Private Timer Interrupt Status Register
    pub isr: RW<u32>,
}

pub struct PTIMER {
    _0: PhantomData<*const ()>,
}

impl PTIMER {
    pub unsafe fn steal() -> Self {
        PTIMER { _0: PhantomData }
    }

    /// Starts a periodic countdown of `cycles` prescaled clock cycles
    pub fn start_periodic(&mut self, cycles: u32) {
        unsafe {
            self.control.write(0);
            self.isr.write(1);
            self.load.write(cycles.saturating_sub(1));
            self.control
                .write(CONTROL_ENABLE | CONTROL_AUTO_RELOAD | CONTROL_IRQ_ENABLE);
        }
    }

    pub fn stop(&mut self) {
        unsafe { self.control.write(0) }
    }

    /// Clears the event flag (write-one-to-clear)
    pub fn clear_event(&mut self) {
        unsafe { self.isr.write(1) }
    }
}

impl Deref for PTIMER {
    type Target = Registers;

    fn deref(&self) -> &Registers {
        unsafe { &*(BASE_ADDRESS as *const Registers) }
    }
}
