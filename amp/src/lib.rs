//! Dual-core (AMP) bring-up substrate for the Arria 10 HPS
//!
//! Core 0 loads and releases core 1 ([`boot`]), core 1 picks its startup path from hardware state
//! alone ([`startup`]), both meet through the Shared Control Block ([`shm`], [`handshake`]) and
//! then run their own cooperative [`sched`]uler driven by a private tick counter ([`tick`]).
//!
//! Hardware access goes through the traits in [`hal`] so everything in here runs on the host.

#![cfg_attr(not(test), no_std)]

pub mod boot;
pub mod config;
mod error;
pub mod hal;
pub mod handshake;
pub mod map;
pub mod sched;
pub mod shm;
pub mod startup;
pub mod tick;

pub use crate::error::{BootError, StorageError};
