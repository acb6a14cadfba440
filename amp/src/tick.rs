//! Per-core tick counter
//!
//! Advanced by the core's private timer interrupt only; read by the scheduler from thread mode.
//! Wraps around at `u32::MAX`.

use core::sync::atomic::{AtomicU32, Ordering};

/// Source of the current tick
pub trait Clock {
    fn now(&self) -> u32;
}

impl<C> Clock for &'_ C
where
    C: Clock + ?Sized,
{
    fn now(&self) -> u32 {
        (**self).now()
    }
}

pub struct Ticks {
    count: AtomicU32,
}

impl Ticks {
    pub const fn new() -> Self {
        Ticks {
            count: AtomicU32::new(0),
        }
    }

    /// Advances the counter by one tick and returns the new value
    ///
    /// Must only be called from this core's timer interrupt handler
    pub fn advance(&self) -> u32 {
        // NOTE(ordering) single writer; ARMv7 word loads and stores are single-copy atomic, no
        // read-modify-write instruction is needed
        let next = self.count.load(Ordering::Relaxed).wrapping_add(1);
        self.count.store(next, Ordering::Relaxed);
        next
    }
}

impl Clock for Ticks {
    fn now(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for Ticks {
    fn default() -> Self {
        Ticks::new()
    }
}
