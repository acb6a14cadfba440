//! Barriers and miscellaneous instructions
//!
//! On non-ARM hosts the barriers degrade to a sequentially consistent fence so that code built on
//! top of them can be unit tested.

#[cfg(target_arch = "arm")]
use core::arch::asm;
#[cfg(not(target_arch = "arm"))]
use core::sync::atomic::{self, Ordering};

/// Data Memory Barrier (full system)
#[inline(always)]
pub fn dmb() {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe { asm!("dmb sy", options(nostack, preserves_flags)) },

        #[cfg(not(target_arch = "arm"))]
        () => atomic::fence(Ordering::SeqCst),
    }
}

/// Data Synchronization Barrier (full system)
#[inline(always)]
pub fn dsb() {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe { asm!("dsb sy", options(nostack, preserves_flags)) },

        #[cfg(not(target_arch = "arm"))]
        () => atomic::fence(Ordering::SeqCst),
    }
}

/// Instruction Synchronization Barrier
#[inline(always)]
pub fn isb() {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe { asm!("isb", options(nostack, preserves_flags)) },

        #[cfg(not(target_arch = "arm"))]
        () => atomic::compiler_fence(Ordering::SeqCst),
    }
}

/// `dsb` followed by `isb`
#[inline(always)]
pub fn dsb_isb() {
    dsb();
    isb();
}

#[inline(always)]
pub fn nop() {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe { asm!("nop", options(nomem, nostack, preserves_flags)) },

        #[cfg(not(target_arch = "arm"))]
        () => core::hint::spin_loop(),
    }
}

/// Wait For Event
#[inline(always)]
pub fn wfe() {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe { asm!("wfe", options(nomem, nostack, preserves_flags)) },

        #[cfg(not(target_arch = "arm"))]
        () => core::hint::spin_loop(),
    }
}
