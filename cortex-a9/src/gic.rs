//! Generic Interrupt Controller (PL390 / MPCore GICv1)

use core::{
    fmt,
    marker::PhantomData,
    ops::Deref,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::asm;

pub mod icc;
pub mod icd;

/// Interrupt IDs at or above this value are spurious
pub const SPURIOUS: u16 = 1020;

/// First Shared Peripheral Interrupt ID
pub const SPI_BASE: u16 = 32;

/// GIC Distributor registers
///
/// **IMPORTANT**: *Shared* between CPUs
pub struct ICD {
    // Make !Send and !Sync
    _0: PhantomData<*const ()>,
}

impl ICD {
    pub fn take() -> Option<Self> {
        // NOTE this flag lives in each image's own memory; only core 0 takes the distributor
        static TAKEN: AtomicBool = AtomicBool::new(false);

        if TAKEN
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            None
        } else {
            Some(ICD { _0: PhantomData })
        }
    }

    pub unsafe fn steal() -> Self {
        ICD { _0: PhantomData }
    }

    pub fn enable(&mut self) {
        unsafe { self.ICDDCR.write(1) }
    }

    pub fn unmask(n: u16) {
        unsafe {
            Self::steal().ICDISER[usize::from(n) / 32].write(1 << (n % 32));
        }
    }

    pub fn mask(n: u16) {
        unsafe {
            Self::steal().ICDICER[usize::from(n) / 32].write(1 << (n % 32));
        }
    }

    pub fn unpend(n: u16) {
        unsafe {
            Self::steal().ICDICPR[usize::from(n) / 32].write(1 << (n % 32));
        }
    }

    pub unsafe fn set_priority(n: u16, priority: u8) {
        Self::steal().ICDIPR[usize::from(n)].write(priority)
    }

    /// Routes SPI `n` to the CPUs in the `cpus` bitmask; SGI and PPI targets are fixed
    pub unsafe fn set_targets(n: u16, cpus: u8) {
        if n >= SPI_BASE {
            Self::steal().ICDIPTR_rw[usize::from(n - SPI_BASE)].write(cpus)
        }
    }

    pub unsafe fn set_edge_triggered(n: u16, edge: bool) {
        Self::steal().ICDICFR[usize::from(n) / 16].modify(|bits| icdicfr(bits, n, edge))
    }
}

/// Updates the two configuration bits of interrupt `n` within its `ICDICFR` word
pub fn icdicfr(bits: u32, n: u16, edge: bool) -> u32 {
    let shift = u32::from(n % 16) * 2;
    let bits = bits & !(0b11 << shift);

    if edge {
        bits | (0b10 << shift)
    } else {
        bits
    }
}

unsafe impl Send for ICD {}

impl Deref for ICD {
    type Target = icd::Registers;

    fn deref(&self) -> &icd::Registers {
        unsafe { &*(icd::BASE_ADDRESS as *const icd::Registers) }
    }
}

/// GIC CPU Interface registers
///
/// **IMPORTANT** One instance per CPU; all instances have the same base address
pub struct ICC {
    _0: PhantomData<*const ()>,
}

impl ICC {
    pub unsafe fn steal() -> Self {
        ICC { _0: PhantomData }
    }

    pub fn enable(&mut self) {
        unsafe { self.ICCICR.write(1) }
    }

    pub fn get_icciar() -> ICCIAR {
        unsafe {
            ICCIAR {
                bits: Self::steal().ICCIAR.read(),
            }
        }
    }

    /// Signals the end of the interrupt acknowledged as `icciar`
    pub fn set_icceoir(icciar: ICCIAR) {
        asm::dsb();
        unsafe { Self::steal().ICCEOIR.write(icciar.bits) }
        asm::isb();
    }

    pub unsafe fn set_iccpmr(threshold: u8) {
        asm::dmb();
        Self::steal().ICCPMR.write(u32::from(threshold));
    }

    pub unsafe fn set_iccbpr(point: u8) {
        Self::steal().ICCBPR.write(u32::from(point & 0b111));
    }
}

#[derive(Clone, Copy)]
pub struct ICCIAR {
    bits: u32,
}

impl fmt::Debug for ICCIAR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ICCIAR")
            .field("cpuid", &self.cpuid())
            .field("ackintid", &self.ackintid())
            .finish()
    }
}

impl ICCIAR {
    pub fn from_bits(bits: u32) -> Self {
        ICCIAR { bits }
    }

    pub fn ackintid(&self) -> u16 {
        (self.bits & ((1 << 10) - 1)) as u16
    }

    /// Source CPU of an SGI
    pub fn cpuid(&self) -> u8 {
        ((self.bits >> 10) & 0b111) as u8
    }

    pub fn is_spurious(&self) -> bool {
        self.ackintid() >= SPURIOUS
    }
}

unsafe impl Send for ICC {}

impl Deref for ICC {
    type Target = icc::Registers;

    fn deref(&self) -> &icc::Registers {
        unsafe { &*(icc::BASE_ADDRESS as *const icc::Registers) }
    }
}

#[cfg(test)]
mod tests {
    use core::mem::offset_of;

    use super::{icc, icd, ICCIAR};

    #[test]
    fn offsets() {
        assert_eq!(icd::BASE_ADDRESS, 0xFFFF_D000);
        assert_eq!(offset_of!(icd::Registers, ICDDCR), 0x000);
        assert_eq!(offset_of!(icd::Registers, ICDICTR), 0x004);
        assert_eq!(offset_of!(icd::Registers, ICDIIDR), 0x008);
        assert_eq!(offset_of!(icd::Registers, ICDISR), 0x080);
        assert_eq!(offset_of!(icd::Registers, ICDISER), 0x100);
        assert_eq!(offset_of!(icd::Registers, ICDICER), 0x180);
        assert_eq!(offset_of!(icd::Registers, ICDISPR), 0x200);
        assert_eq!(offset_of!(icd::Registers, ICDICPR), 0x280);
        assert_eq!(offset_of!(icd::Registers, ICDABR), 0x300);
        assert_eq!(offset_of!(icd::Registers, ICDIPR), 0x400);
        assert_eq!(offset_of!(icd::Registers, ICDIPTR_ro), 0x800);
        assert_eq!(offset_of!(icd::Registers, ICDIPTR_rw), 0x820);
        assert_eq!(offset_of!(icd::Registers, ICDICFR), 0xC00);
        assert_eq!(offset_of!(icd::Registers, ICDIDR), 0xD00);
        assert_eq!(offset_of!(icd::Registers, ICDSGIR), 0xF00);
        assert_eq!(offset_of!(icd::Registers, ICDIR), 0xFD0);
        assert_eq!(core::mem::size_of::<icd::Registers>(), 0x1000);

        assert_eq!(icc::BASE_ADDRESS, 0xFFFF_C100);
        assert_eq!(offset_of!(icc::Registers, ICCICR), 0x00);
        assert_eq!(offset_of!(icc::Registers, ICCPMR), 0x04);
        assert_eq!(offset_of!(icc::Registers, ICCBPR), 0x08);
        assert_eq!(offset_of!(icc::Registers, ICCIAR), 0x0C);
        assert_eq!(offset_of!(icc::Registers, ICCEOIR), 0x10);
        assert_eq!(offset_of!(icc::Registers, ICCRPR), 0x14);
        assert_eq!(offset_of!(icc::Registers, ICCHPIR), 0x18);
        assert_eq!(offset_of!(icc::Registers, ICCABPR), 0x1C);
        assert_eq!(offset_of!(icc::Registers, ICCIIDR), 0xFC);
    }

    #[test]
    fn trigger_config() {
        // PPI 29 (private timer) lives in ICDICFR1, bits 27:26
        assert_eq!(super::icdicfr(0, 29, true), 0b10 << 26);
        assert_eq!(super::icdicfr(0xFFFF_FFFF, 29, false), !(0b11 << 26));
        // other interrupts in the same word are untouched
        assert_eq!(super::icdicfr(0b11, 17, true), 0b11 | (0b10 << 2));
    }

    #[test]
    fn icciar() {
        let iar = ICCIAR::from_bits((1 << 10) | 29);
        assert_eq!(iar.ackintid(), 29);
        assert_eq!(iar.cpuid(), 1);
        assert!(!iar.is_spurious());
        assert!(ICCIAR::from_bits(1023).is_spurious());
    }
}
