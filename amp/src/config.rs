//! Build-time configuration

/// Start of core 1's private SDRAM window; its image is loaded and linked here
pub const CORE1_DDR_BASE: u32 = 0x2000_0000;

/// End (exclusive) of core 1's private SDRAM window
pub const CORE1_DDR_END: u32 = 0x3F00_0000;

/// Bytes copied from flash into core 1's window
pub const CORE1_IMAGE_SIZE: u32 = 0x0002_0000;

/// Flash offset of core 1's image
pub const CORE1_FLASH_OFFSET: u32 = 0x00B0_0000;

/// Shared Control Block, mapped non-cacheable by both cores (right above core 1's window)
pub const SHM_BASE: usize = CORE1_DDR_END as usize;

/// `magic` value meaning "the Shared Control Block has been initialized by core 0"
pub const SHM_MAGIC: u32 = 0x5348_4D42; // "SHMB"

/// Task slots per core
pub const SCHED_CAPACITY: usize = 15;

/// Largest accepted scheduling delay, in ticks
pub const MAX_DELAY: u32 = 0x8000_0000;

/// Period of the per-core tick, in milliseconds
pub const TICK_PERIOD_MS: u32 = 1;

/// Polls after which core 1 reports (once) that it is still waiting for core 0
pub const HANDSHAKE_WARN_POLLS: u32 = 1 << 24;
