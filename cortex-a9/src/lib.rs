//! Low level access to Cortex-A9 MPCore processors

#![cfg_attr(not(test), no_std)]

#[cfg(target_arch = "arm")]
use core::arch::asm;

pub mod asm;
pub mod cache;
pub mod gic;
pub mod l2c;
pub mod ptimer;
pub mod register;

/// Base address of the MPCore private memory region (SCU, GIC, private timers)
pub const PERIPHBASE: usize = 0xFFFF_C000;

// NOTE(unsafe) can break a critical section
pub unsafe fn enable_irq() {
    match () {
        #[cfg(target_arch = "arm")]
        () => asm!("cpsie i", options(nomem, nostack, preserves_flags)),

        #[cfg(not(target_arch = "arm"))]
        () => unimplemented!(),
    }
}

pub fn disable_irq() {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe { asm!("cpsid i", options(nomem, nostack, preserves_flags)) },

        #[cfg(not(target_arch = "arm"))]
        () => unimplemented!(),
    }
}

/// Runs `f` with IRQs masked, restoring the previous IRQ state afterwards
pub fn free<R>(f: impl FnOnce() -> R) -> R {
    let masked = register::cpsr::read().i();

    disable_irq();
    let r = f();

    if !masked {
        // NOTE(unsafe) IRQs were enabled when we entered
        unsafe { enable_irq() }
    }

    r
}
