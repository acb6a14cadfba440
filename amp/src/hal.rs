//! Hardware collaborators
//!
//! `a10-rt` provides the real implementations; tests use in-memory fakes.

use crate::StorageError;

/// Word access to fixed physical addresses
pub trait Mmio {
    fn read32(&self, addr: u32) -> u32;

    fn write32(&mut self, addr: u32, value: u32);

    fn modify32(&mut self, addr: u32, f: impl FnOnce(u32) -> u32) {
        let value = self.read32(addr);
        self.write32(addr, f(value));
    }
}

/// Cache maintenance and barriers
pub trait Cache {
    /// Cleans (writes back) every data cache level over `start..start + len`
    fn clean(&mut self, start: u32, len: u32);

    fn invalidate_icache(&mut self);

    fn dsb(&mut self);

    fn isb(&mut self);

    fn dsb_isb(&mut self) {
        self.dsb();
        self.isb();
    }
}

/// Persistent storage holding the secondary core's image
pub trait Storage {
    /// Fills `dst` with the bytes stored at `offset..offset + dst.len()`
    fn read(&mut self, dst: &mut [u8], offset: u32) -> Result<(), StorageError>;
}

impl<M> Mmio for &'_ mut M
where
    M: Mmio,
{
    fn read32(&self, addr: u32) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&mut self, addr: u32, value: u32) {
        (**self).write32(addr, value)
    }
}

impl<C> Cache for &'_ mut C
where
    C: Cache,
{
    fn clean(&mut self, start: u32, len: u32) {
        (**self).clean(start, len)
    }

    fn invalidate_icache(&mut self) {
        (**self).invalidate_icache()
    }

    fn dsb(&mut self) {
        (**self).dsb()
    }

    fn isb(&mut self) {
        (**self).isb()
    }
}

impl<S> Storage for &'_ mut S
where
    S: Storage,
{
    fn read(&mut self, dst: &mut [u8], offset: u32) -> Result<(), StorageError> {
        (**self).read(dst, offset)
    }
}
