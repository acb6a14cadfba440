#[cfg(target_arch = "arm")]
use core::arch::asm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    User,
    Fiq,
    Irq,
    Supervisor,
    Abort,
    Undefined,
    System,
    Unknown,
}

#[derive(Clone, Copy)]
pub struct Cpsr {
    bits: u32,
}

impl Cpsr {
    pub fn from_bits(bits: u32) -> Self {
        Cpsr { bits }
    }

    /// Is the I bit set?
    pub fn i(&self) -> bool {
        self.bits & (1 << 7) != 0
    }

    /// Is the F bit set?
    pub fn f(&self) -> bool {
        self.bits & (1 << 6) != 0
    }

    /// Returns the content of the M bits
    pub fn mode(&self) -> Mode {
        match self.bits & 0b11111 {
            0b10000 => Mode::User,
            0b10001 => Mode::Fiq,
            0b10010 => Mode::Irq,
            0b10011 => Mode::Supervisor,
            0b10111 => Mode::Abort,
            0b11011 => Mode::Undefined,
            0b11111 => Mode::System,
            _ => Mode::Unknown,
        }
    }
}

#[cfg(target_arch = "arm")]
pub fn read() -> Cpsr {
    let bits: u32;
    unsafe { asm!("mrs {}, CPSR", out(reg) bits, options(nomem, nostack, preserves_flags)) }
    Cpsr { bits }
}

#[cfg(not(target_arch = "arm"))]
pub fn read() -> Cpsr {
    unimplemented!();
}
