//! L1 cache maintenance

#[cfg(target_arch = "arm")]
use core::arch::asm;

use crate::asm;

/// Size of an L1 (and L2C-310) cache line, in bytes
pub const LINE_SIZE: usize = 32;

/// Rounds `addr` down to the start of its cache line
pub const fn align_down(addr: usize) -> usize {
    addr & !(LINE_SIZE - 1)
}

/// Rounds `addr` up to the next cache line boundary
pub const fn align_up(addr: usize) -> usize {
    (addr + (LINE_SIZE - 1)) & !(LINE_SIZE - 1)
}

/// Invalidates the whole instruction cache and the branch predictor
pub fn invalidate_icache() {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe {
            asm!(
                "mcr p15, 0, {0}, c7, c5, 0", // ICIALLU
                "mcr p15, 0, {0}, c7, c5, 6", // BPIALL
                in(reg) 0,
                options(nostack, preserves_flags),
            )
        },

        #[cfg(not(target_arch = "arm"))]
        () => unimplemented!(),
    }

    asm::dsb_isb();
}

/// Cleans the data cache line that holds `mva` to the point of coherency
pub fn clean_dcache_line(mva: usize) {
    match () {
        #[cfg(target_arch = "arm")]
        () => unsafe {
            asm!(
                "mcr p15, 0, {0}, c7, c10, 1", // DCCMVAC
                in(reg) mva,
                options(nostack, preserves_flags),
            )
        },

        #[cfg(not(target_arch = "arm"))]
        () => {
            let _ = mva;
            unimplemented!()
        }
    }
}

/// Cleans every data cache line that overlaps `start..start + len`
pub fn clean_dcache_range(start: usize, len: usize) {
    let mut line = align_down(start);
    let end = align_up(start + len);

    while line < end {
        clean_dcache_line(line);
        line += LINE_SIZE;
    }

    asm::dsb();
}
