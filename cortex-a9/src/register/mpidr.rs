//! Multiprocessor Affinity Register

#[cfg(target_arch = "arm")]
use core::arch::asm;

#[derive(Clone, Copy, Debug)]
pub struct Mpidr {
    bits: u32,
}

impl Mpidr {
    pub fn from_bits(bits: u32) -> Self {
        Mpidr { bits }
    }

    /// CPU number within the cluster
    pub fn cpu_id(&self) -> u8 {
        (self.bits & 0b11) as u8
    }
}

#[cfg(target_arch = "arm")]
pub fn read() -> Mpidr {
    let bits: u32;
    unsafe {
        asm!(
            "mrc p15, 0, {}, c0, c0, 5",
            out(reg) bits,
            options(nomem, nostack, preserves_flags),
        )
    }
    Mpidr { bits }
}

#[cfg(not(target_arch = "arm"))]
pub fn read() -> Mpidr {
    unimplemented!();
}

#[cfg(test)]
mod tests {
    #[test]
    fn cpu_id() {
        assert_eq!(super::Mpidr::from_bits(0x8000_0000).cpu_id(), 0);
        assert_eq!(super::Mpidr::from_bits(0x8000_0001).cpu_id(), 1);
    }
}
