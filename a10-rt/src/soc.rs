//! `amp::hal` implementations for the Arria 10 HPS

use core::{cmp, marker::PhantomData, ops::Deref, ptr};

use amp::{
    hal::{Cache, Mmio, Storage},
    StorageError,
};
use cortex_a9::{asm, cache, l2c::L2C};
use volatile_register::RW;

/// Direct physical memory access
///
/// Goes through `ldr` / `str` so that address 0 (the CPU1 trampoline) is a valid target.
pub struct Physical;

impl Mmio for Physical {
    fn read32(&self, addr: u32) -> u32 {
        match () {
            #[cfg(target_arch = "arm")]
            () => unsafe {
                let value: u32;
                core::arch::asm!(
                    "ldr {0}, [{1}]",
                    out(reg) value,
                    in(reg) addr,
                    options(nostack, preserves_flags, readonly),
                );
                value
            },

            #[cfg(not(target_arch = "arm"))]
            () => {
                let _ = addr;
                unimplemented!()
            }
        }
    }

    fn write32(&mut self, addr: u32, value: u32) {
        match () {
            #[cfg(target_arch = "arm")]
            () => unsafe {
                core::arch::asm!(
                    "str {0}, [{1}]",
                    in(reg) value,
                    in(reg) addr,
                    options(nostack, preserves_flags),
                )
            },

            #[cfg(not(target_arch = "arm"))]
            () => {
                let _ = (addr, value);
                unimplemented!()
            }
        }
    }
}

/// L1 data / instruction caches plus the L2C-310
pub struct Caches;

impl Cache for Caches {
    fn clean(&mut self, start: u32, len: u32) {
        cache::clean_dcache_range(start as usize, len as usize);

        // NOTE(unsafe) cleaning has no effect on the data itself
        let mut l2c = unsafe { L2C::steal() };
        if l2c.is_enabled() {
            l2c.clean_range(start as usize, len as usize);
        }
    }

    fn invalidate_icache(&mut self) {
        cache::invalidate_icache()
    }

    fn dsb(&mut self) {
        asm::dsb()
    }

    fn isb(&mut self) {
        asm::isb()
    }
}

/// QSPI flash controller registers (the subset used for direct access reads)
#[repr(C)]
pub struct Registers {
    /// 0x00 - QSPI Configuration Register
    pub cfg: RW<u32>,
    _reserved0: [u32; 8],
    /// 0x24 - Remap Address Register
    pub remapaddr: RW<u32>,
}

pub const QSPI_BASE_ADDRESS: usize = 0xFF80_9000;

/// Memory-mapped window of the direct access controller
pub const QSPI_DATA_ADDRESS: usize = 0xFFA0_0000;

const WINDOW_SIZE: usize = 1 << 20;

/// Size of the flash device
pub const FLASH_SIZE: u32 = 0x0800_0000;

const CFG_ENABLE: u32 = 1 << 0;
const CFG_ENAHBREMAP: u32 = 1 << 16;

/// QSPI flash, read through the controller's direct access window
///
/// The controller (and the flash device) are expected to be configured by the boot loader.
pub struct QspiFlash {
    _0: PhantomData<*const ()>,
}

impl QspiFlash {
    pub unsafe fn steal() -> Self {
        QspiFlash { _0: PhantomData }
    }
}

impl Deref for QspiFlash {
    type Target = Registers;

    fn deref(&self) -> &Registers {
        unsafe { &*(QSPI_BASE_ADDRESS as *const Registers) }
    }
}

/// Splits `offset..offset + len` at window boundaries into `(remap, window_offset, len)` chunks
fn windows(offset: u32, len: usize) -> impl Iterator<Item = (u32, usize, usize)> {
    let mut pos = offset as usize;
    let end = pos + len;

    core::iter::from_fn(move || {
        if pos >= end {
            return None;
        }

        let base = pos & !(WINDOW_SIZE - 1);
        let n = cmp::min(end, base + WINDOW_SIZE) - pos;
        let chunk = (base as u32, pos - base, n);
        pos += n;

        Some(chunk)
    })
}

fn check_range(offset: u32, len: usize) -> Result<(), StorageError> {
    match (offset as usize).checked_add(len) {
        Some(end) if end <= FLASH_SIZE as usize => Ok(()),
        _ => Err(StorageError::OutOfRange { offset, len }),
    }
}

impl Storage for QspiFlash {
    fn read(&mut self, dst: &mut [u8], offset: u32) -> Result<(), StorageError> {
        check_range(offset, dst.len())?;

        if self.cfg.read() & CFG_ENABLE == 0 {
            return Err(StorageError::NotReady);
        }

        unsafe { self.cfg.modify(|r| r | CFG_ENAHBREMAP) }

        let mut done = 0;
        for (remap, start, n) in windows(offset, dst.len()) {
            unsafe { self.remapaddr.write(remap) }
            asm::dsb_isb();

            for (i, byte) in dst[done..done + n].iter_mut().enumerate() {
                *byte = unsafe { ptr::read_volatile((QSPI_DATA_ADDRESS + start + i) as *const u8) };
            }
            done += n;
        }

        unsafe {
            self.remapaddr.write(0);
            self.cfg.modify(|r| r & !CFG_ENAHBREMAP);
        }

        Ok(())
    }
}
