//! L2C-310 (PL310) level 2 cache controller

use core::{marker::PhantomData, ops::Deref};

use volatile_register::{RO, RW};

use crate::cache::{align_down, align_up, LINE_SIZE};

pub const BASE_ADDRESS: usize = 0xFFFF_F000;

#[repr(C)]
pub struct Registers {
    /// 0x000 - Cache ID
    pub cache_id: RO<u32>,
    /// 0x004 - Cache Type
    pub cache_type: RO<u32>,
    /// 0x008..=0x0FC - Reserved
    _reserved0: [u32; 62],
    /// 0x100 - Control
    pub control: RW<u32>,
    /// 0x104..=0x72C - Reserved (auxiliary control, latencies, event counters, interrupts)
    _reserved1: [u32; 395],
    /// 0x730 - Cache Sync
    pub cache_sync: RW<u32>,
    /// 0x734..=0x76C - Reserved
    _reserved2: [u32; 15],
    /// 0x770 - Invalidate Line by PA
    pub inv_pa: RW<u32>,
    /// 0x774..=0x7AC - Reserved
    _reserved3: [u32; 15],
    /// 0x7B0 - Clean Line by PA
    pub clean_pa: RW<u32>,
    /// 0x7B4..=0x7EC - Reserved
    _reserved4: [u32; 15],
    /// 0x7F0 - Clean and Invalidate Line by PA
    pub clean_inv_pa: RW<u32>,
    /// 0x7F4..=0xBFC - Reserved
    _reserved5: [u32; 259],
    /// 0xC00 - Address Filtering Start
    pub addr_filtering_start: RW<u32>,
    /// 0xC04 - Address Filtering End
    pub addr_filtering_end: RW<u32>,
}

pub struct L2C {
    _0: PhantomData<*const ()>,
}

impl L2C {
    pub unsafe fn steal() -> Self {
        L2C { _0: PhantomData }
    }

    pub fn is_enabled(&self) -> bool {
        self.control.read() & 1 != 0
    }

    /// Cleans every L2 line that overlaps `start..start + len` (physical addresses)
    pub fn clean_range(&mut self, start: usize, len: usize) {
        if !self.is_enabled() {
            return;
        }

        let mut line = align_down(start);
        let end = align_up(start + len);
        while line < end {
            unsafe { self.clean_pa.write(line as u32) }
            line += LINE_SIZE;
        }

        self.sync();
    }

    /// Drains the controller's buffers
    pub fn sync(&mut self) {
        unsafe { self.cache_sync.write(0) }
        while self.cache_sync.read() & 1 != 0 {}
    }
}

impl Deref for L2C {
    type Target = Registers;

    fn deref(&self) -> &Registers {
        unsafe { &*(BASE_ADDRESS as *const Registers) }
    }
}

#[cfg(test)]
mod tests {
    use core::mem::offset_of;

    use super::Registers;

    #[test]
    fn offsets() {
        assert_eq!(offset_of!(Registers, control), 0x100);
        assert_eq!(offset_of!(Registers, cache_sync), 0x730);
        assert_eq!(offset_of!(Registers, inv_pa), 0x770);
        assert_eq!(offset_of!(Registers, clean_pa), 0x7B0);
        assert_eq!(offset_of!(Registers, clean_inv_pa), 0x7F0);
        assert_eq!(offset_of!(Registers, addr_filtering_start), 0xC00);
        assert_eq!(offset_of!(Registers, addr_filtering_end), 0xC04);
    }
}
