//! Runtime for the Arria 10 HPS images
//!
//! Provides the exception vector table, the reset handlers of both images (`_start` for core 0,
//! `_start_core1` for core 1), IRQ dispatch, the private timer tick source, a DCC `log` sink and
//! the real implementations of the `amp::hal` traits.

#![cfg_attr(not(test), no_std)]

use core::sync::atomic::{self, Ordering};

pub use a10_rt_macros::{entry, exception};
use log::error;

pub mod interrupt;
pub mod logger;
pub mod soc;
#[cfg(target_arch = "arm")]
mod startup;
pub mod timer;

#[allow(non_camel_case_types)]
pub enum Exception {
    DefaultHandler,

    Undefined,
    SVC,
    PrefetchAbort,
    DataAbort,
    // IRQ,
    FIQ,
}

#[no_mangle]
unsafe extern "C" fn DefaultHandler() -> ! {
    error!(
        "unhandled exception ({:?} mode)",
        cortex_a9::register::cpsr::read().mode()
    );

    park()
}

// a debugger breakpoint ends up here; wait for the debugger to halt the core
#[no_mangle]
unsafe extern "C" fn DefaultPrefetchAbort() -> ! {
    park()
}

fn park() -> ! {
    loop {
        // NOTE(compiler_fence) prevents LLVM from turning this infinite loop into an abort
        // instruction
        atomic::compiler_fence(Ordering::SeqCst);
        cortex_a9::asm::wfe();
    }
}
