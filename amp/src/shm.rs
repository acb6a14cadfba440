//! Shared Control Block
//!
//! A small record at [`config::SHM_BASE`] that both images map non-cacheable. Every field has a
//! single writer per boot cycle; visibility between the cores relies on that mapping plus the
//! barriers issued by the accessors below, not on atomic instructions.

use cortex_a9::asm;
use volatile_register::RW;

use crate::{config, handshake::Mailbox};

/// Register layout of the Shared Control Block
#[repr(C)]
pub struct Registers {
    /// [`config::SHM_MAGIC`] once core 0 has initialized the block. Written by core 0
    pub magic: RW<u32>,
    /// Written by core 0
    pub core0_ready: RW<u32>,
    /// Written by core 1
    pub core1_ready: RW<u32>,
    /// Main loop iterations of core 1. Written by core 1
    pub trig_count: RW<u32>,
    /// Mirror of core 1's tick counter. Written by core 1
    pub core1_timer: RW<u32>,
    /// Reserved for a cross-core log ring
    pub log_head: RW<u32>,
    /// Reserved for a cross-core log ring
    pub log_tail: RW<u32>,
}

/// Handle to the Shared Control Block
#[derive(Clone, Copy)]
pub struct ControlBlock<'a> {
    regs: &'a Registers,
}

impl ControlBlock<'static> {
    /// Handle to the block at its fixed address
    ///
    /// # Safety
    ///
    /// `SHM_BASE` must be mapped (non-cacheable) and callers must respect the single writer rule
    /// of each field
    pub unsafe fn steal() -> Self {
        ControlBlock {
            regs: &*(config::SHM_BASE as *const Registers),
        }
    }
}

impl<'a> ControlBlock<'a> {
    pub fn new(regs: &'a Registers) -> Self {
        ControlBlock { regs }
    }

    fn load(&self, reg: &RW<u32>) -> u32 {
        let value = reg.read();
        asm::dmb();
        value
    }

    fn store(&self, reg: &RW<u32>, value: u32) {
        asm::dmb();
        // NOTE(unsafe) the caller is this field's single writer
        unsafe { reg.write(value) }
        asm::dmb();
    }

    pub fn magic(&self) -> u32 {
        self.load(&self.regs.magic)
    }

    /// Increments the main loop counter (core 1 only)
    pub fn bump_trig_count(&self) -> u32 {
        let count = self.load(&self.regs.trig_count).wrapping_add(1);
        self.store(&self.regs.trig_count, count);
        count
    }

    pub fn trig_count(&self) -> u32 {
        self.load(&self.regs.trig_count)
    }

    /// Mirrors core 1's tick counter (core 1 only)
    pub fn set_core1_timer(&self, ticks: u32) {
        self.store(&self.regs.core1_timer, ticks)
    }

    pub fn core1_timer(&self) -> u32 {
        self.load(&self.regs.core1_timer)
    }

    /// `(head, tail)` of the reserved log ring
    pub fn log_indices(&self) -> (u32, u32) {
        (self.load(&self.regs.log_head), self.load(&self.regs.log_tail))
    }
}

impl Mailbox for ControlBlock<'_> {
    fn initialize(&self) {
        let r = self.regs;
        self.store(&r.core0_ready, 0);
        self.store(&r.core1_ready, 0);
        self.store(&r.trig_count, 0);
        self.store(&r.core1_timer, 0);
        self.store(&r.log_head, 0);
        self.store(&r.log_tail, 0);
        // NOTE(ordering) `magic` goes last; the other fields are only trusted once it is seen
        self.store(&r.magic, config::SHM_MAGIC);
    }

    fn is_initialized(&self) -> bool {
        self.magic() == config::SHM_MAGIC
    }

    fn core0_ready(&self) -> bool {
        self.load(&self.regs.core0_ready) != 0
    }

    fn set_core0_ready(&self) {
        self.store(&self.regs.core0_ready, 1)
    }

    fn core1_ready(&self) -> bool {
        self.load(&self.regs.core1_ready) != 0
    }

    fn set_core1_ready(&self) {
        self.store(&self.regs.core1_ready, 1)
    }
}

#[cfg(test)]
mod tests {
    use core::mem::{self, offset_of};

    use super::{ControlBlock, Registers};
    use crate::{config, handshake::Mailbox};

    fn dirty() -> Registers {
        let regs: Registers = unsafe { mem::zeroed() };
        for reg in [
            &regs.magic,
            &regs.core0_ready,
            &regs.core1_ready,
            &regs.trig_count,
            &regs.core1_timer,
            &regs.log_head,
            &regs.log_tail,
        ] {
            unsafe { reg.write(0xDEAD_BEEF) }
        }
        regs
    }

    #[test]
    fn layout() {
        assert_eq!(offset_of!(Registers, magic), 0x00);
        assert_eq!(offset_of!(Registers, core0_ready), 0x04);
        assert_eq!(offset_of!(Registers, core1_ready), 0x08);
        assert_eq!(offset_of!(Registers, trig_count), 0x0C);
        assert_eq!(offset_of!(Registers, core1_timer), 0x10);
        assert_eq!(offset_of!(Registers, log_head), 0x14);
        assert_eq!(offset_of!(Registers, log_tail), 0x18);
    }

    #[test]
    fn initialize() {
        let regs = dirty();
        let shm = ControlBlock::new(&regs);

        assert!(!shm.is_initialized());

        shm.initialize();

        assert!(shm.is_initialized());
        assert_eq!(regs.magic.read(), config::SHM_MAGIC);
        assert!(!shm.core0_ready());
        assert!(!shm.core1_ready());
        assert_eq!(shm.trig_count(), 0);
        assert_eq!(shm.core1_timer(), 0);
        assert_eq!(shm.log_indices(), (0, 0));
    }

    #[test]
    fn flags() {
        let regs: Registers = unsafe { mem::zeroed() };
        let shm = ControlBlock::new(&regs);
        shm.initialize();

        shm.set_core0_ready();
        assert!(shm.core0_ready());
        assert!(!shm.core1_ready());

        shm.set_core1_ready();
        assert!(shm.core1_ready());
        assert_eq!(regs.core0_ready.read(), 1);
        assert_eq!(regs.core1_ready.read(), 1);
    }

    #[test]
    fn counters() {
        let regs: Registers = unsafe { mem::zeroed() };
        let shm = ControlBlock::new(&regs);

        assert_eq!(shm.bump_trig_count(), 1);
        assert_eq!(shm.bump_trig_count(), 2);
        assert_eq!(shm.trig_count(), 2);

        unsafe { regs.trig_count.write(u32::MAX) }
        assert_eq!(shm.bump_trig_count(), 0);

        shm.set_core1_timer(1234);
        assert_eq!(shm.core1_timer(), 1234);
    }
}
