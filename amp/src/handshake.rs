//! Two-phase handshake between the cores
//!
//! 1. core 0 initializes the Shared Control Block (`magic` last) and, once core 1 has been
//!    released, sets `core0_ready`
//! 2. core 1 waits for both, then sets `core1_ready` once it reaches its steady state
//!
//! Core 0 never blocks on core 1; it only polls [`secondary_ready`].

use cortex_a9::asm;
use log::warn;

use crate::config;

/// Handshake view of the Shared Control Block
pub trait Mailbox {
    /// Zeroes every field and then publishes the magic value (core 0)
    fn initialize(&self);

    fn is_initialized(&self) -> bool;

    fn core0_ready(&self) -> bool;

    fn set_core0_ready(&self);

    fn core1_ready(&self) -> bool;

    fn set_core1_ready(&self);
}

/// Blocks core 1 until core 0 has initialized the block and published `core0_ready`
///
/// Returns the number of polls it took. Waits forever if core 0 never gets there; a single
/// warning is logged after [`config::HANDSHAKE_WARN_POLLS`] polls.
pub fn wait_for_primary<M>(mailbox: &M) -> u32
where
    M: Mailbox + ?Sized,
{
    let mut polls = 0;

    // NOTE(ordering) nothing else in the block is meaningful until `magic` is seen
    while !mailbox.is_initialized() {
        polls = poll(polls);
    }

    while !mailbox.core0_ready() {
        polls = poll(polls);
    }

    polls
}

fn poll(polls: u32) -> u32 {
    let polls = polls.wrapping_add(1);
    if polls == config::HANDSHAKE_WARN_POLLS {
        warn!("still waiting for core0 after {} polls", polls);
    }
    asm::nop();
    polls
}

/// Signals core 0 that core 1 reached its steady state
pub fn announce<M>(mailbox: &M)
where
    M: Mailbox + ?Sized,
{
    mailbox.set_core1_ready()
}

/// Non-blocking check, from core 0, for core 1's announcement
pub fn secondary_ready<M>(mailbox: &M) -> bool
where
    M: Mailbox + ?Sized,
{
    mailbox.core1_ready()
}
