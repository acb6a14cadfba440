//! Debug Status and Control Register (internal view)

#[cfg(target_arch = "arm")]
use core::arch::asm;

#[derive(Clone, Copy, Debug)]
pub struct Dbgdscr {
    bits: u32,
}

impl Dbgdscr {
    pub fn from_bits(bits: u32) -> Self {
        Dbgdscr { bits }
    }

    /// Is the processor halted in Debug state?
    pub fn halted(&self) -> bool {
        self.bits & (1 << 0) != 0
    }

    /// Is halting debug-mode enabled? (set by an external debugger)
    pub fn hdbgen(&self) -> bool {
        self.bits & (1 << 14) != 0
    }

    /// Is a debugger connected, either in halting debug-mode or holding this core halted?
    ///
    /// NOTE HDBGen stays set while the core runs, so it does not mean halted; see `halted`
    pub fn debugger_connected(&self) -> bool {
        self.halted() || self.hdbgen()
    }
}

#[cfg(target_arch = "arm")]
pub fn read() -> Dbgdscr {
    let bits: u32;
    unsafe {
        asm!(
            "mrc p14, 0, {}, c0, c1, 0",
            out(reg) bits,
            options(nomem, nostack, preserves_flags),
        )
    }
    Dbgdscr { bits }
}

#[cfg(not(target_arch = "arm"))]
pub fn read() -> Dbgdscr {
    unimplemented!();
}

#[cfg(test)]
mod tests {
    use super::Dbgdscr;

    #[test]
    fn halted_is_bit_0_only() {
        assert!(!Dbgdscr::from_bits(0).halted());
        assert!(Dbgdscr::from_bits(1 << 0).halted());
        // halting debug-mode enabled on a running core
        assert!(!Dbgdscr::from_bits(1 << 14).halted());
        assert!(Dbgdscr::from_bits(1 << 14).hdbgen());
    }

    #[test]
    fn debugger_connected() {
        assert!(!Dbgdscr::from_bits(0).debugger_connected());
        assert!(Dbgdscr::from_bits(1 << 0).debugger_connected());
        assert!(Dbgdscr::from_bits(1 << 14).debugger_connected());
        // monitor mode alone is not an external debugger
        assert!(!Dbgdscr::from_bits(1 << 15).debugger_connected());
    }
}
